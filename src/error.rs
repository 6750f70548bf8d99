use std::collections::BTreeMap;
use std::fmt;

use crate::http::FailureKind;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The server answered with a non-success status.
    #[error("API error: {0}")]
    Api(ApiError),
    /// No response was received (connection refused, DNS, timeout).
    #[error("No response from server: {0}")]
    Network(#[source] reqwest::Error),
    /// The request could not be built, or the response body could not be decoded.
    #[error("Request error: {0}")]
    Request(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// A `{success, message, data}` envelope reported `success: false`; holds the server message.
    #[error("Envelope error: {0}")]
    Envelope(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The classified API failure, if this error came from a non-success response.
    #[must_use]
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }

    /// Failure kind of an API error, `None` for transport and local errors.
    #[must_use]
    pub fn kind(&self) -> Option<FailureKind> {
        self.api().map(|e| e.kind)
    }
}

/// A non-success HTTP response after classification.
///
/// `message` and `field_errors` come from the server payload
/// `{ message: string, errors?: { [field]: string | string[] } }`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ApiError {
    pub kind: FailureKind,
    pub status: u16,
    /// Request path as passed by the caller (no base URL).
    pub path: String,
    pub message: Option<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ApiError {
    #[must_use]
    pub fn new(kind: FailureKind, status: u16, path: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            path: path.into(),
            message: None,
            field_errors: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    #[must_use]
    pub fn with_field_errors(mut self, errors: BTreeMap<String, Vec<String>>) -> Self {
        self.field_errors = errors;
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) on {}", self.kind, self.status, self.path)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}
