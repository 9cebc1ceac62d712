use reqwest::{
    header::{HeaderValue, CONTENT_TYPE},
    Client,
};
use serde::Serialize;
use tokio::time::sleep;
use url::Url;

use super::Notification;
use crate::{
    error::Result,
    fetch::{retry_delay, MAX_ATTEMPTS, REQUEST_TIMEOUT},
};

const MENTION: &str = "@everyone";

/// A Discord style webhook.
#[derive(Debug)]
pub struct Webhook {
    client: Client,
    url: Url,
    mention: bool,
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    title: &'a str,
    url: &'a str,
    color: u32,
    description: &'a str,
}

#[derive(Debug, Serialize, Default)]
struct Message<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    embeds: Vec<Embed<'a>>,
}

impl<'a> Message<'a> {
    fn embed(notification: &'a Notification) -> Self {
        Self {
            content: None,
            embeds: vec![Embed {
                title: &notification.title,
                url: notification.title_url.as_str(),
                color: notification.color,
                description: &notification.description,
            }],
        }
    }

    fn text(content: &'a str) -> Self {
        Self {
            content: Some(content),
            ..Self::default()
        }
    }
}

impl Webhook {
    pub fn new(url: Url, mention: bool) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url,
            mention,
        })
    }

    async fn post_once(&self, body: &str) -> Result<()> {
        self.client
            .post(self.url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body.to_owned())
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Posts `message`, retrying rate limits, server errors and timeouts.
    async fn post(&self, message: &Message<'_>) -> Result<()> {
        let body = serde_json::to_string(message)?;
        let mut attempt = 1;
        loop {
            match self.post_once(&body).await {
                Err(e) if e.is_transient() && attempt < MAX_ATTEMPTS => {
                    let delay = retry_delay(attempt);
                    log::warn!("Webhook post failed ({e}), retrying in {delay:?}");
                    sleep(delay).await;
                    attempt += 1;
                }
                res => return res,
            }
        }
    }

    /// Posts the embed, then the mention if enabled. Only a failed embed is
    /// an error.
    pub async fn send(&self, notification: &Notification) -> Result<()> {
        self.post(&Message::embed(notification)).await?;
        if self.mention {
            if let Err(e) = self.post(&Message::text(MENTION)).await {
                log::warn!("Could not send the {MENTION} message: {e}");
            }
        }
        Ok(())
    }
}
