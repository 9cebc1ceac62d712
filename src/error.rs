use crate::parse;
use std::fmt::{self, Display, Formatter};

#[derive(Debug)]
pub enum Error {
    ConfigMissing(&'static str),
    ConfigInvalid(String),
    Auth(String),
    Request(reqwest::Error),
    Parse(parse::Error),
    Json(serde_json::Error),
    Timeout,
}

impl Error {
    /// Failures worth retrying after a backoff.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Timeout)
    }

    /// The portal answered with its login form instead of data.
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

impl From<parse::Error> for Error {
    fn from(e: parse::Error) -> Self {
        Error::Parse(e)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout
        } else {
            Error::Request(e)
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigMissing(key) => write!(f, "Config error: {key} is not set"),
            Error::ConfigInvalid(msg) => write!(f, "Config error: {msg}"),
            Error::Auth(msg) => write!(f, "Authentication error: {msg}"),
            Error::Request(e) => write!(f, "Request error: {}", e),
            Error::Parse(e) => write!(f, "Parse error: {}", e),
            Error::Json(e) => write!(f, "Json error: {}", e),
            Error::Timeout => write!(f, "Request timed out"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
