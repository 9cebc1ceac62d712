mod cookie_store;

pub use cookie_store::{SessionCookieStore, SESSION_COOKIE};

use std::sync::Arc;

use reqwest::Client;
use tracing::{instrument, Level};
use url::Url;

use crate::{
    config::Credentials,
    error::{Error, Result},
    fetch::portal_url,
    parse,
};

/// Logs into the portal and keeps track of the session it hands out.
#[derive(Debug)]
pub struct SessionManager {
    credentials: Credentials,
    login_url: Url,
    cookies: Arc<SessionCookieStore>,
}

impl SessionManager {
    pub fn new(credentials: Credentials, base_url: &Url) -> Result<Self> {
        let login_url = portal_url(
            base_url,
            &[credentials.organization.as_str(), "sis", "j_security_check"],
        )?;
        let cookies = Arc::new(SessionCookieStore::with_observer(|_| {
            log::info!("Portal issued a new {SESSION_COOKIE}");
        }));
        Ok(Self {
            credentials,
            login_url,
            cookies,
        })
    }

    /// The store to install into the http client so every response's
    /// cookies pass through this session.
    pub fn cookie_store(&self) -> Arc<SessionCookieStore> {
        Arc::clone(&self.cookies)
    }

    pub fn session_id(&self) -> Option<String> {
        self.cookies.session_id()
    }

    /// Forgets the session; later requests go out without cookies.
    pub fn close(&self) {
        self.cookies.close();
    }

    /// Posts the login form. The session cookie is picked up by the cookie
    /// store; a response that still shows the login form is an auth error.
    #[instrument(skip(self, client), fields(
        organization = %self.credentials.organization,
    ), level = Level::DEBUG)]
    pub async fn authenticate(&self, client: &Client) -> Result<()> {
        let form = [
            ("idTokenString", ""),
            ("j_username", self.credentials.username.as_str()),
            ("j_password", self.credentials.password.as_str()),
        ];
        log::debug!("Logging in at {}", self.login_url);
        let response = client
            .post(self.login_url.clone())
            .form(&form)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;

        if parse::is_login_page(&body) {
            return Err(Error::Auth(
                "portal answered the login with its login form".to_owned(),
            ));
        }
        if self.session_id().is_none() {
            return Err(Error::Auth(format!("portal did not set {SESSION_COOKIE}")));
        }
        log::info!("Logged in as {}", self.credentials.username);
        Ok(())
    }
}
