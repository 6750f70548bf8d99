use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::classify::{AuthEndpoints, ErrorBody, FailureKind, classify};
use super::notify::{
    Navigator, Notification, Notifier, TracingNavigator, TracingNotifier, messages,
};
use crate::config::ClientConfig;
use crate::error::{ApiError, Error};
use crate::session::SessionStore;

/// The single HTTP entry point to the ERP REST API.
///
/// Every call reads the bearer token from the [`SessionStore`] and attaches
/// it. Every failure is classified once, turned into notifications (and, for
/// an expired session, a logout plus a redirect to the login route), then
/// returned to the caller. Nothing is retried.
///
/// Cloning is cheap; clones share the connection pool, session and sinks.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionStore,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    auth_endpoints: Arc<AuthEndpoints>,
    login_route: Arc<str>,
}

impl ApiClient {
    /// Create a client for `config.base_url()` bound to `session`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url().clone(),
            session,
            notifier: Arc::new(TracingNotifier),
            navigator: Arc::new(TracingNavigator),
            auth_endpoints: Arc::new(config.auth_endpoints().clone()),
            login_route: Arc::from(config.login_route()),
        })
    }

    /// Replace the notification sink (defaults to `tracing` output).
    #[must_use]
    pub fn with_notifier(mut self, notifier: impl Notifier) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Replace the login redirect sink (defaults to `tracing` output).
    #[must_use]
    pub fn with_navigator(mut self, navigator: impl Navigator) -> Self {
        self.navigator = Arc::new(navigator);
        self
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Session store this client reads tokens from.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Base URL every path is joined onto.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// # Errors
    ///
    /// See [`ApiClient`]: [`Error::Api`], [`Error::Network`] or [`Error::Request`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request::<T, (), ()>(Method::GET, path, None, None).await
    }

    /// `GET` with `query` serialized as the query string.
    ///
    /// # Errors
    ///
    /// See [`ApiClient`].
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, Error>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.request::<T, Q, ()>(Method::GET, path, Some(query), None)
            .await
    }

    /// # Errors
    ///
    /// See [`ApiClient`].
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request::<T, (), B>(Method::POST, path, None, Some(body))
            .await
    }

    /// # Errors
    ///
    /// See [`ApiClient`].
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request::<T, (), B>(Method::PUT, path, None, Some(body))
            .await
    }

    /// # Errors
    ///
    /// See [`ApiClient`].
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request::<T, (), B>(Method::PATCH, path, None, Some(body))
            .await
    }

    /// # Errors
    ///
    /// See [`ApiClient`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request::<T, (), ()>(Method::DELETE, path, None, None)
            .await
    }

    async fn request<T, Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint_url(path).map_err(|e| self.fail_locally(e))?;

        let mut builder = self.http.request(method.clone(), url);
        if let Some(query) = query {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token.as_str());
        }

        tracing::debug!(%method, path, "Request sent");

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) if e.is_builder() => {
                return Err(self.fail_locally(Error::Request(e.to_string())));
            }
            Err(e) => return Err(self.fail_network(&method, path, e)),
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.fail_network(&method, path, e)),
        };

        if !status.is_success() {
            let kind = classify(status, path, &self.auth_endpoints);
            let error = ErrorBody::parse(&bytes).into_api_error(kind, status.as_u16(), path);
            tracing::warn!(%method, path, status = status.as_u16(), kind = %kind, "Request failed");
            self.react(&error);
            return Err(Error::Api(error));
        }

        tracing::debug!(%method, path, status = status.as_u16(), "Request succeeded");
        decode(&bytes).map_err(|e| {
            self.fail_locally(Error::Request(format!("invalid response body from {path}: {e}")))
        })
    }

    /// Joins `path` onto the base URL, keeping any base path prefix (`/api`).
    fn endpoint_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}"))
            .map_err(|e| Error::Request(format!("invalid request path '{path}': {e}")))
    }

    /// Side effects for a classified failure. Runs exactly once per failed call.
    fn react(&self, error: &ApiError) {
        let server_message = error.message.as_deref();
        match error.kind {
            FailureKind::SessionExpired => {
                self.session.logout();
                self.notifier
                    .notify(Notification::warning(messages::SESSION_EXPIRED));
                self.navigator.to_login(&self.login_route);
            }
            FailureKind::CredentialsRejected => self.notifier.notify(Notification::error(
                server_message.unwrap_or(messages::INVALID_CREDENTIALS),
            )),
            FailureKind::Forbidden => self.notifier.notify(Notification::error(messages::FORBIDDEN)),
            FailureKind::NotFound => self.notifier.notify(Notification::error(messages::NOT_FOUND)),
            FailureKind::Validation if !error.field_errors.is_empty() => {
                for (field, field_messages) in &error.field_errors {
                    for message in field_messages {
                        self.notifier
                            .notify(Notification::error(message.clone()).with_field(field.clone()));
                    }
                }
            }
            FailureKind::Validation => self.notifier.notify(Notification::error(
                server_message.unwrap_or(messages::VALIDATION_FAILED),
            )),
            FailureKind::Server => self
                .notifier
                .notify(Notification::error(messages::SERVER_ERROR)),
            FailureKind::Rejected => self.notifier.notify(Notification::error(
                server_message.unwrap_or(messages::REQUEST_FAILED),
            )),
        }
    }

    /// Notifies a failure found in a successful response body, after the
    /// transport layer already accepted it.
    pub(crate) fn reject_body(&self, path: &str, error: Error) -> Error {
        tracing::warn!(path, error = %error, "Response body rejected");
        let message = match &error {
            Error::Envelope(message) => message.as_str(),
            _ => messages::REQUEST_FAILED,
        };
        self.notifier.notify(Notification::error(message));
        error
    }

    fn fail_network(&self, method: &Method, path: &str, e: reqwest::Error) -> Error {
        tracing::warn!(%method, path, error = %e, "No response from server");
        self.notifier.notify(Notification::error(messages::NO_RESPONSE));
        Error::Network(e)
    }

    fn fail_locally(&self, e: Error) -> Error {
        tracing::warn!(error = %e, "Request could not be processed");
        self.notifier
            .notify(Notification::error(messages::REQUEST_FAILED));
        e
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// An empty success body (204, or 200 without content) decodes as JSON `null`.
fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_json::Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_slice(bytes)
    }
}
