use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::error::Error;

/// A key/value medium a session can be persisted to.
///
/// Two media back every [`SessionStore`](super::SessionStore): a durable one
/// that survives restarts ([`CookieStorage`](super::CookieStorage)) and a
/// session-scoped one that dies with the process ([`SessionStorage`]).
pub trait StorageMedium: Send + Sync + 'static {
    /// Read the value stored under `key`, `None` if absent or expired.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the medium exists but cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the medium rejects the write.
    fn write(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Delete `key`. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the medium rejects the removal.
    fn remove(&self, key: &str) -> Result<(), Error>;
}

/// Process-lifetime storage, the equivalent of browser `sessionStorage`.
#[derive(Debug, Default)]
pub struct SessionStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl SessionStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry, as when the browsing session ends.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl StorageMedium for SessionStorage {
    fn read(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), Error> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
