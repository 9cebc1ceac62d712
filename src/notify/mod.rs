mod webhook;

pub use webhook::Webhook;

use std::future::Future;

use url::Url;

use crate::{config::Config, error::Result, parse::Assignment};

/// Embed color of every announcement.
pub const COLOR: u32 = 0x00E3FF;

/// An announcement of new assignments in one course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub title_url: Url,
    pub color: u32,
    pub description: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, title_url: Url, new_assignments: &[Assignment]) -> Self {
        let description = new_assignments
            .iter()
            .map(|assignment| match assignment.classify_grade() {
                Some(class) => format!("> {}: **{}**", assignment.name(), class.label()),
                None => format!("> {}", assignment.name()),
            })
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            title: title.into(),
            title_url,
            color: COLOR,
            description,
        }
    }
}

/// Delivers notifications somewhere. Delivery may repeat on retries; nothing
/// is deduplicated.
pub trait Notify {
    fn notify(&self, notification: &Notification) -> impl Future<Output = Result<()>>;
}

#[derive(Debug)]
#[non_exhaustive]
pub enum Sink {
    Webhook(Webhook),
    Log,
}

impl Sink {
    pub fn from_config(config: &Config) -> Result<Self> {
        match &config.webhook_url {
            Some(url) => Webhook::new(url.clone(), config.mention).map(Self::Webhook),
            None => {
                log::warn!("GENESIS_WEBHOOK not set, new assignments will only be logged.");
                Ok(Self::Log)
            }
        }
    }
}

impl Notify for Sink {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        match self {
            Self::Webhook(webhook) => webhook.send(notification).await,
            Self::Log => {
                log::info!(
                    "{} ({})\n{}",
                    notification.title,
                    notification.title_url,
                    notification.description
                );
                Ok(())
            }
        }
    }
}
