use std::collections::{BTreeMap, BTreeSet};

use derive_more::Display;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::ApiError;

/// How a non-success response is handled by [`ApiClient`](super::ApiClient).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[non_exhaustive]
pub enum FailureKind {
    /// 401 from an authentication endpoint: wrong credentials.
    #[display("credentials rejected")]
    CredentialsRejected,
    /// 401 anywhere else: the session is no longer valid.
    #[display("session expired")]
    SessionExpired,
    #[display("forbidden")]
    Forbidden,
    #[display("not found")]
    NotFound,
    /// 422 with a message and optionally a field-keyed error map.
    #[display("validation failed")]
    Validation,
    /// Any 5xx.
    #[display("server error")]
    Server,
    /// Any other non-success status.
    #[display("rejected")]
    Rejected,
}

/// Explicit allow-list of authentication endpoint paths.
///
/// A 401 from one of these paths means "wrong credentials" rather than
/// "session expired". Matching is exact on the path; query strings and
/// trailing slashes are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEndpoints {
    paths: BTreeSet<String>,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self::new([
            "/auth/login",
            "/auth/register",
            "/auth/forgot-password",
            "/auth/reset-password",
        ])
    }
}

impl AuthEndpoints {
    #[must_use]
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            paths: paths
                .into_iter()
                .map(|p| normalize(p.as_ref()).to_owned())
                .collect(),
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl AsRef<str>) -> Self {
        self.paths.insert(normalize(path.as_ref()).to_owned());
        self
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(normalize(path))
    }
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// Maps a failed response to its [`FailureKind`].
#[must_use]
pub fn classify(status: StatusCode, path: &str, auth_endpoints: &AuthEndpoints) -> FailureKind {
    match status {
        StatusCode::UNAUTHORIZED if auth_endpoints.contains(path) => FailureKind::CredentialsRejected,
        StatusCode::UNAUTHORIZED => FailureKind::SessionExpired,
        StatusCode::FORBIDDEN => FailureKind::Forbidden,
        StatusCode::NOT_FOUND => FailureKind::NotFound,
        StatusCode::UNPROCESSABLE_ENTITY => FailureKind::Validation,
        s if s.is_server_error() => FailureKind::Server,
        _ => FailureKind::Rejected,
    }
}

/// Server error payload: `{ message: string, errors?: { [field]: string | string[] } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<BTreeMap<String, FieldMessages>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldMessages {
    One(String),
    Many(Vec<String>),
}

impl FieldMessages {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(message) => vec![message],
            Self::Many(messages) => messages,
        }
    }
}

impl ErrorBody {
    /// Lenient parse: bodies that are not the expected JSON yield an empty payload.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }

    #[must_use]
    pub fn into_api_error(self, kind: FailureKind, status: u16, path: &str) -> ApiError {
        let field_errors = self
            .errors
            .unwrap_or_default()
            .into_iter()
            .map(|(field, messages)| (field, messages.into_vec()))
            .filter(|(_, messages)| !messages.is_empty())
            .collect();

        ApiError::new(kind, status, path)
            .with_message(self.message.filter(|m| !m.trim().is_empty()))
            .with_field_errors(field_errors)
    }
}
