//! Persisted session store.
//!
//! One [`SessionStore`] owns the "who is logged in, with which token" state
//! for the whole application. Every clone is a handle to the same state, so
//! the HTTP client, services and UI all observe the same session.
//!
//! ```rust,ignore
//! use erp_client::session::SessionStore;
//!
//! let session = SessionStore::open(config.session());
//! session.login(user, token, /* remember_me */ true);
//! assert!(session.is_authenticated());
//! session.logout();
//! ```

mod cookies;
mod persisted;
mod remember;
mod storage;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::watch;

pub use cookies::CookieStorage;
pub use remember::{LoginPrefill, RememberedLogin};
pub use storage::{SessionStorage, StorageMedium};

use crate::config::SessionSettings;
use crate::types::{AccessToken, User, UserPatch};

/// Authentication state at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<AccessToken>,
    pub refresh_token: Option<String>,
    /// Persistence mode chosen at the last write.
    pub remember_me: bool,
}

impl Session {
    /// Derived: a user and a token are both present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }
}

struct Media {
    durable: Arc<dyn StorageMedium>,
    scoped: Arc<dyn StorageMedium>,
    key: String,
}

struct Inner {
    state: watch::Sender<Session>,
    media: Media,
}

/// Shared handle to the application session.
///
/// Mutations replace the state atomically and persist it according to
/// `remember_me`: the durable medium when `true`, the session-scoped medium
/// when `false`. The other medium's copy is always removed. Storage failures
/// are logged and never surface to the caller.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Store backed by a [`CookieStorage`] in the configured directory and a
    /// fresh in-memory [`SessionStorage`], hydrated from whatever they hold.
    #[must_use]
    pub fn open(settings: &SessionSettings) -> Self {
        let durable = CookieStorage::new(settings.storage_dir())
            .with_ttl_days(settings.ttl_days())
            .with_secure(settings.secure_cookies());
        Self::hydrate(
            Arc::new(durable),
            Arc::new(SessionStorage::new()),
            settings.storage_key(),
        )
    }

    /// Build a store over explicit media and restore any persisted session.
    ///
    /// The durable medium is read first, then the session-scoped one. Records
    /// that cannot be read or decoded are removed and treated as "no session".
    #[must_use]
    pub fn hydrate(
        durable: Arc<dyn StorageMedium>,
        scoped: Arc<dyn StorageMedium>,
        key: impl Into<String>,
    ) -> Self {
        let media = Media {
            durable,
            scoped,
            key: key.into(),
        };

        let session = restore(&*media.durable, &media.key, "durable")
            .or_else(|| restore(&*media.scoped, &media.key, "session"))
            .unwrap_or_default();

        if let Some(user) = &session.user {
            tracing::debug!(user_id = %user.id, remember_me = session.remember_me, "Session restored");
        }

        let (state, _) = watch::channel(session);
        Self {
            inner: Arc::new(Inner { state, media }),
        }
    }

    /// Replace the session with an authenticated one.
    pub fn login(&self, user: User, token: AccessToken, remember_me: bool) {
        self.login_with_refresh(user, token, None, remember_me);
    }

    /// [`login`](Self::login) for back-ends that also issue a refresh token.
    pub fn login_with_refresh(
        &self,
        user: User,
        token: AccessToken,
        refresh_token: Option<String>,
        remember_me: bool,
    ) {
        let media = &self.inner.media;
        self.inner.state.send_modify(|session| {
            *session = Session {
                user: Some(user),
                token: Some(token),
                refresh_token,
                remember_me,
            };
            persist(media, session);
        });
    }

    /// Reset the session and delete it from both media. Safe to call repeatedly.
    pub fn logout(&self) {
        let media = &self.inner.media;
        self.inner.state.send_modify(|session| {
            *session = Session::default();
            remove(&*media.durable, &media.key, "durable");
            remove(&*media.scoped, &media.key, "session");
        });
    }

    /// Merge `patch` into the current user. No-op when nobody is logged in.
    pub fn update_user(&self, patch: UserPatch) {
        let media = &self.inner.media;
        self.inner
            .state
            .send_if_modified(|session| match session.user.as_mut() {
                Some(user) => {
                    user.apply(patch);
                    persist(media, session);
                    true
                }
                None => false,
            });
    }

    /// Current bearer token without subscribing to changes.
    #[must_use]
    pub fn token(&self) -> Option<AccessToken> {
        self.inner.state.borrow().token.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every session change, for reactive callers.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("key", &self.inner.media.key)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

fn persist(media: &Media, session: &Session) {
    let encoded = match persisted::encode(session) {
        Ok(encoded) => encoded,
        Err(e) => {
            tracing::warn!(error = %e, "Session serialization failed");
            return;
        }
    };

    let (target, stale) = if session.remember_me {
        ((&*media.durable, "durable"), (&*media.scoped, "session"))
    } else {
        ((&*media.scoped, "session"), (&*media.durable, "durable"))
    };

    if let Err(e) = target.0.write(&media.key, &encoded) {
        tracing::warn!(error = %e, medium = target.1, "Session write failed");
    }
    remove(stale.0, &media.key, stale.1);
}

fn remove(medium: &dyn StorageMedium, key: &str, label: &'static str) {
    if let Err(e) = medium.remove(key) {
        tracing::warn!(error = %e, medium = label, "Session removal failed");
    }
}

fn restore(medium: &dyn StorageMedium, key: &str, label: &'static str) -> Option<Session> {
    let raw = match medium.read(key) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(error = %e, medium = label, "Unreadable persisted session");
            return None;
        }
    };

    let session = match persisted::decode(&raw) {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, medium = label, "Discarding malformed persisted session");
            remove(medium, key, label);
            return None;
        }
    };

    if !session.is_authenticated() {
        return None;
    }

    let expired = session.token.as_ref().is_some_and(|token| {
        crate::token::is_expired_at(token.as_str(), OffsetDateTime::now_utc())
    });
    if expired {
        tracing::info!(medium = label, "Discarding persisted session with expired token");
        remove(medium, key, label);
        return None;
    }

    Some(session)
}
