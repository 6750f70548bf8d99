use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::cookies::CookieStorage;
use super::storage::StorageMedium;
use crate::config::SessionSettings;

/// Login form prefill data saved when "remember me" is ticked.
///
/// Convenience cache only: it never authenticates anyone and has no
/// bearing on the [`SessionStore`](super::SessionStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RememberedLogin {
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Read/write access to the [`RememberedLogin`] record under its own key.
#[derive(Clone)]
pub struct LoginPrefill {
    medium: Arc<dyn StorageMedium>,
    key: String,
}

impl LoginPrefill {
    #[must_use]
    pub fn new(medium: Arc<dyn StorageMedium>, key: impl Into<String>) -> Self {
        Self {
            medium,
            key: key.into(),
        }
    }

    /// Prefill cache in the durable cookie directory of `settings`.
    #[must_use]
    pub fn open(settings: &SessionSettings) -> Self {
        let medium = CookieStorage::new(settings.storage_dir())
            .with_ttl_days(settings.ttl_days())
            .with_secure(settings.secure_cookies());
        Self::new(Arc::new(medium), settings.prefill_key())
    }

    pub fn save(&self, login: &RememberedLogin) {
        let encoded = match serde_json::to_string(login) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(error = %e, "Login prefill serialization failed");
                return;
            }
        };
        if let Err(e) = self.medium.write(&self.key, &encoded) {
            tracing::warn!(error = %e, "Login prefill write failed");
        }
    }

    /// The saved prefill, `None` if absent or unreadable.
    #[must_use]
    pub fn load(&self) -> Option<RememberedLogin> {
        let raw = match self.medium.read(&self.key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "Login prefill read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(login) => Some(login),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding malformed login prefill");
                self.clear();
                None
            }
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.medium.remove(&self.key) {
            tracing::warn!(error = %e, "Login prefill removal failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStorage;

    fn prefill() -> (Arc<SessionStorage>, LoginPrefill) {
        let medium = Arc::new(SessionStorage::new());
        let prefill = LoginPrefill::new(medium.clone(), "remember-me");
        (medium, prefill)
    }

    #[test]
    fn save_load_clear() {
        let (_medium, prefill) = prefill();
        assert!(prefill.load().is_none());

        let login = RememberedLogin {
            email: "ana@example.com".into(),
            password: "s3cret".into(),
            remember_me: true,
        };
        prefill.save(&login);
        assert_eq!(prefill.load(), Some(login));

        prefill.clear();
        assert!(prefill.load().is_none());
    }

    #[test]
    fn layout_uses_camel_case() {
        let (medium, prefill) = prefill();
        prefill.save(&RememberedLogin {
            email: "a@b.co".into(),
            password: String::new(),
            remember_me: true,
        });

        let raw = medium.read("remember-me").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["rememberMe"], true);
        assert_eq!(value["email"], "a@b.co");
    }

    #[test]
    fn malformed_prefill_is_discarded() {
        let (medium, prefill) = prefill();
        medium.write("remember-me", "{{{").unwrap();

        assert!(prefill.load().is_none());
        assert_eq!(medium.read("remember-me").unwrap(), None);
    }
}
