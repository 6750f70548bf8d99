use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::error::Error;
use crate::http::AuthEndpoints;

/// Shortest lifetime of a remembered session.
pub const MIN_TTL_DAYS: i64 = 1;
/// Longest lifetime of a remembered session (ten years).
pub const MAX_TTL_DAYS: i64 = 3650;

/// Session persistence settings shared by the session store and the login prefill cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub(crate) storage_key: String,
    pub(crate) prefill_key: String,
    pub(crate) storage_dir: PathBuf,
    pub(crate) ttl_days: i64,
    pub(crate) secure_cookies: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            storage_key: "auth-storage".into(),
            prefill_key: "remember-me".into(),
            storage_dir: default_storage_dir(),
            ttl_days: 30,
            secure_cookies: true,
        }
    }
}

impl SessionSettings {
    /// Override the key of the persisted session record.
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Override the key of the login prefill record.
    #[must_use]
    pub fn with_prefill_key(mut self, key: impl Into<String>) -> Self {
        self.prefill_key = key.into();
        self
    }

    /// Directory holding the durable (remember-me) cookie files.
    #[must_use]
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    /// Lifetime of a remembered session, clamped to
    /// [`MIN_TTL_DAYS`]..=[`MAX_TTL_DAYS`].
    #[must_use]
    pub fn with_ttl_days(mut self, days: i64) -> Self {
        self.ttl_days = days.clamp(MIN_TTL_DAYS, MAX_TTL_DAYS);
        self
    }

    /// Set the `Secure` flag on durable cookies. Disable only for local development.
    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    /// Key of the persisted session record.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Key of the login prefill record.
    #[must_use]
    pub fn prefill_key(&self) -> &str {
        &self.prefill_key
    }

    /// Directory of the durable cookie files.
    #[must_use]
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Lifetime of a remembered session in days.
    #[must_use]
    pub fn ttl_days(&self) -> i64 {
        self.ttl_days
    }

    /// Whether durable cookies carry the `Secure` flag.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }
}

fn default_storage_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("erp-client")
}

/// ERP API client configuration.
///
/// The base URL is required and is a constructor parameter. Everything else
/// has a default and a `with_*` override.
///
/// ```rust,ignore
/// use erp_client::ClientConfig;
///
/// let config = ClientConfig::new("https://erp.example.com/api".parse()?)
///     .with_timeout(std::time::Duration::from_secs(10))
///     .with_login_route("/entrar");
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ClientConfig {
    pub(crate) base_url: Url,
    pub(crate) timeout: Duration,
    pub(crate) user_agent: String,
    pub(crate) login_route: String,
    pub(crate) auth_endpoints: AuthEndpoints,
    pub(crate) session: SessionSettings,
}

impl ClientConfig {
    /// Client for `base_url` with a 30 second timeout and the `/login` route.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(30),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).into(),
            login_route: "/login".into(),
            auth_endpoints: AuthEndpoints::default(),
            session: SessionSettings::default(),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `ERP_API_URL`: base URL of the REST API
    ///
    /// # Optional env vars
    /// - `ERP_TIMEOUT_SECS`: request timeout in seconds (default 30)
    /// - `ERP_LOGIN_ROUTE`: route the UI navigates to when the session expires
    /// - `ERP_SESSION_DIR`: directory for the durable session cookie
    /// - `ERP_SESSION_TTL_DAYS`: lifetime of a remembered session (default 30)
    /// - `DEV_AUTH`: `"1"` or `"true"` disables the `Secure` cookie flag
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `ERP_API_URL` is missing or any value fails to parse.
    pub fn from_env() -> Result<Self, Error> {
        let base_url_str = std::env::var("ERP_API_URL")
            .map_err(|_| Error::Config("ERP_API_URL is required".into()))?;
        let base_url: Url = base_url_str
            .parse()
            .map_err(|e| Error::Config(format!("ERP_API_URL: {e}")))?;

        let mut config = Self::new(base_url);

        if let Ok(secs) = std::env::var("ERP_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("ERP_TIMEOUT_SECS: {e}")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Ok(route) = std::env::var("ERP_LOGIN_ROUTE") {
            config = config.with_login_route(route);
        }

        let mut session = SessionSettings::default();
        if let Ok(dir) = std::env::var("ERP_SESSION_DIR") {
            session = session.with_storage_dir(dir);
        }
        if let Ok(days) = std::env::var("ERP_SESSION_TTL_DAYS") {
            session = session.with_ttl_days(parse_ttl_days(&days)?);
        }

        let dev_auth = matches!(
            std::env::var("DEV_AUTH").as_deref(),
            Ok("1") | Ok("true"),
        );

        Ok(config.with_session(session.with_secure_cookies(!dev_auth)))
    }

    /// Override the request timeout (default 30 seconds).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the route the UI is sent to when the session expires.
    #[must_use]
    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    /// Override the allow-list of authentication endpoints.
    #[must_use]
    pub fn with_auth_endpoints(mut self, endpoints: AuthEndpoints) -> Self {
        self.auth_endpoints = endpoints;
        self
    }

    /// Override the session persistence settings.
    #[must_use]
    pub fn with_session(mut self, session: SessionSettings) -> Self {
        self.session = session;
        self
    }

    /// Base URL every request path is joined onto.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `User-Agent` header sent with every request.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Route the UI is sent to when the session expires.
    #[must_use]
    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    /// Paths where a 401 means "wrong credentials".
    #[must_use]
    pub fn auth_endpoints(&self) -> &AuthEndpoints {
        &self.auth_endpoints
    }

    /// Session persistence settings.
    #[must_use]
    pub fn session(&self) -> &SessionSettings {
        &self.session
    }
}

/// Parses `ERP_SESSION_TTL_DAYS`, rejecting values outside
/// [`MIN_TTL_DAYS`]..=[`MAX_TTL_DAYS`].
fn parse_ttl_days(raw: &str) -> Result<i64, Error> {
    let days: i64 = raw
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("ERP_SESSION_TTL_DAYS: {e}")))?;
    if !(MIN_TTL_DAYS..=MAX_TTL_DAYS).contains(&days) {
        return Err(Error::Config(format!(
            "ERP_SESSION_TTL_DAYS must be between {MIN_TTL_DAYS} and {MAX_TTL_DAYS}, got {days}"
        )));
    }
    Ok(days)
}
