use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::Error;
use crate::http::{ApiClient, FailureKind};
use crate::session::{LoginPrefill, RememberedLogin};
use crate::types::{AccessToken, User, UserPatch};

const LOGIN: &str = "/auth/login";
const REGISTER: &str = "/auth/register";
const LOGOUT: &str = "/auth/logout";
const FORGOT_PASSWORD: &str = "/auth/forgot-password";
const RESET_PASSWORD: &str = "/auth/reset-password";
const PROFILE: &str = "/auth/profile";
const VALIDATE: &str = "/auth/validate";

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// `expiresIn` as sent by the server: seconds or a duration string such as `"7d"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ExpiresIn {
    Seconds(u64),
    Text(String),
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct LoginResponse {
    pub user: User,
    pub token: AccessToken,
    #[serde(default, rename = "expiresIn")]
    pub expires_in: Option<ExpiresIn>,
}

/// Authentication endpoints, wired to the session store and the login prefill cache.
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
    prefill: LoginPrefill,
}

impl AuthService {
    #[must_use]
    pub fn new(client: ApiClient, prefill: LoginPrefill) -> Self {
        Self { client, prefill }
    }

    #[must_use]
    pub fn prefill(&self) -> &LoginPrefill {
        &self.prefill
    }

    /// Authenticate and start a session.
    ///
    /// With `remember_me` the session is persisted durably and the login form
    /// prefill is saved; otherwise the session lasts for this process and any
    /// saved prefill is cleared.
    ///
    /// # Errors
    ///
    /// Any [`ApiClient`] error. Wrong credentials are
    /// [`FailureKind::CredentialsRejected`] and leave the session untouched.
    pub async fn login(
        &self,
        credentials: &Credentials,
        remember_me: bool,
    ) -> Result<LoginResponse, Error> {
        let response: LoginResponse = self.client.post(LOGIN, credentials).await?;

        self.client
            .session()
            .login(response.user.clone(), response.token.clone(), remember_me);

        if remember_me {
            self.prefill.save(&RememberedLogin {
                email: credentials.email.clone(),
                password: credentials.password.clone(),
                remember_me: true,
            });
        } else {
            self.prefill.clear();
        }

        tracing::info!(user_id = %response.user.id, remember_me, "Login successful");
        Ok(response)
    }

    /// # Errors
    ///
    /// Any [`ApiClient`] error.
    pub async fn register<P: Serialize + ?Sized>(&self, payload: &P) -> Result<Value, Error> {
        self.client.post(REGISTER, payload).await
    }

    /// End the session on the server, then locally.
    ///
    /// The local session is cleared even if the server call fails.
    ///
    /// # Errors
    ///
    /// The server call's error, returned after the local logout.
    pub async fn logout(&self) -> Result<(), Error> {
        let session = self.client.session();
        if session.token().is_none() {
            session.logout();
            return Ok(());
        }

        let result = self.client.post::<Value, _>(LOGOUT, &json!({})).await;
        session.logout();
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Server logout failed");
        }
        result.map(drop)
    }

    /// # Errors
    ///
    /// Any [`ApiClient`] error.
    pub async fn forgot_password(&self, email: &str) -> Result<Value, Error> {
        self.client
            .post(FORGOT_PASSWORD, &json!({ "email": email }))
            .await
    }

    /// # Errors
    ///
    /// Any [`ApiClient`] error.
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<Value, Error> {
        self.client
            .post(RESET_PASSWORD, &json!({ "token": token, "password": password }))
            .await
    }

    /// # Errors
    ///
    /// Any [`ApiClient`] error.
    pub async fn profile(&self) -> Result<User, Error> {
        self.client.get(PROFILE).await
    }

    /// Save profile edits and merge them into the session user.
    ///
    /// # Errors
    ///
    /// Any [`ApiClient`] error; the session is only updated on success.
    pub async fn update_profile(&self, patch: &UserPatch) -> Result<User, Error> {
        let user: User = self.client.put(PROFILE, patch).await?;
        self.client.session().update_user(patch.clone());
        Ok(user)
    }

    /// Ask the server whether the current token is still valid.
    ///
    /// `Ok(false)` when the server answers 401; by then the client has
    /// already logged out and redirected.
    ///
    /// # Errors
    ///
    /// Any other [`ApiClient`] error.
    pub async fn validate(&self) -> Result<bool, Error> {
        match self.client.get::<Value>(VALIDATE).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == Some(FailureKind::SessionExpired) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
