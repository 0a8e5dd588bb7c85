use firestore::errors::FirestoreError;

use std::fmt::{self, Display, Formatter};

#[derive(Debug)]
pub enum Error {
    Request(reqwest::Error),
    Database(FirestoreError),
    Json(serde_json::Error),
    Io(std::io::Error),
    Url(url::ParseError),
    /// A scraped link that does not point at the menu host.
    Link(String),
    Config(String),
}

impl Error {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e)
    }
}

impl From<FirestoreError> for Error {
    fn from(e: FirestoreError) -> Self {
        Self::Database(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Self::Url(e)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(e) => write!(f, "Request error: {e}"),
            Self::Database(e) => write!(f, "Database error: {e}"),
            Self::Json(e) => write!(f, "Json error: {e}"),
            Self::Io(e) => write!(f, "Io error: {e}"),
            Self::Url(e) => write!(f, "Url error: {e}"),
            Self::Link(href) => write!(f, "Link leaves the menu host: {href}"),
            Self::Config(msg) => write!(f, "Config error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
