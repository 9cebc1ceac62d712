use std::fmt::{self, Display, Formatter};

/// Ways a portal page can fail to yield what the layout promises.
#[derive(Debug)]
pub enum Error {
    /// An element the layout always carries is absent.
    MissingElement(String),
    /// An element is present but holds no usable text.
    EmptyText(String),
    /// A selector assembled at runtime was rejected.
    BadSelector(String),
}

impl Error {
    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingElement(what.into())
    }

    pub fn empty(what: impl Into<String>) -> Self {
        Self::EmptyText(what.into())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingElement(what) => write!(f, "missing element: {what}"),
            Self::EmptyText(what) => write!(f, "no text in {what}"),
            Self::BadSelector(msg) => write!(f, "bad selector: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
