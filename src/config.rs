use std::{collections::HashSet, env};

use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://parents.c1.genesisedu.net";

/// Login details for one student account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub organization: String,
    pub student_id: String,
}

// keep the password out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("organization", &self.organization)
            .field("student_id", &self.student_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub base_url: Url,
    pub webhook_url: Option<Url>,
    /// Course names to track. Empty tracks every course.
    pub watched_courses: HashSet<String>,
    /// Follow every webhook embed with an `@everyone` message.
    pub mention: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &'static str| optional(key).ok_or(Error::ConfigMissing(key));

        let credentials = Credentials {
            username: required("GENESIS_USERNAME")?,
            password: required("GENESIS_PASSWORD")?,
            organization: required("GENESIS_ORGANIZATION")?,
            student_id: required("GENESIS_STUDENT_ID")?,
        };

        let base_url = optional("GENESIS_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let base_url = parse_url("GENESIS_BASE_URL", &base_url)?;
        let webhook_url = optional("GENESIS_WEBHOOK")
            .map(|url| parse_url("GENESIS_WEBHOOK", &url))
            .transpose()?;

        let watched_courses = optional("GENESIS_WATCHED_COURSES")
            .map(|names| {
                names
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        let mention = match optional("GENESIS_MENTION").as_deref() {
            None => false,
            Some("1" | "true" | "yes") => true,
            Some("0" | "false" | "no") => false,
            Some(other) => {
                return Err(Error::ConfigInvalid(format!(
                    "GENESIS_MENTION should be true or false, got {other:?}"
                )))
            }
        };

        Ok(Self {
            credentials,
            base_url,
            webhook_url,
            watched_courses,
            mention,
        })
    }
}

fn parse_url(key: &str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| Error::ConfigInvalid(format!("{key} is not a valid url: {e}")))
}
