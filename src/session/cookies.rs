use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use cookie::{Cookie, SameSite};
use time::{Duration, OffsetDateTime};

use super::storage::StorageMedium;
use crate::config::{MAX_TTL_DAYS, MIN_TTL_DAYS};
use crate::error::Error;

/// Durable, expiring storage: one cookie file per key.
///
/// Each file holds a single `Set-Cookie` line (`SameSite=Strict`, `Secure`,
/// `Max-Age`/`Expires` set from the TTL). Values are URL-encoded so that the
/// serialized session survives cookie syntax. An expired cookie is deleted
/// the next time it is read.
#[derive(Debug, Clone)]
pub struct CookieStorage {
    dir: PathBuf,
    ttl: Duration,
    secure: bool,
}

impl CookieStorage {
    /// Cookie jar rooted at `dir` with a 30 day TTL and the `Secure` flag set.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ttl: Duration::days(30),
            secure: true,
        }
    }

    /// Cookie lifetime, clamped to [`MIN_TTL_DAYS`]..=[`MAX_TTL_DAYS`].
    #[must_use]
    pub fn with_ttl_days(mut self, days: i64) -> Self {
        self.ttl = Duration::days(days.clamp(MIN_TTL_DAYS, MAX_TTL_DAYS));
        self
    }

    /// Set or clear the `Secure` attribute.
    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.cookie", urlencoding::encode(key)))
    }

    fn build(&self, key: &str, value: &str) -> Cookie<'static> {
        let mut cookie = Cookie::build((key.to_owned(), urlencoding::encode(value).into_owned()))
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .path("/")
            .max_age(self.ttl)
            .build();
        if let Some(expires) = OffsetDateTime::now_utc().checked_add(self.ttl) {
            cookie.set_expires(expires);
        }
        cookie
    }
}

impl StorageMedium for CookieStorage {
    fn read(&self, key: &str) -> Result<Option<String>, Error> {
        let raw = match fs::read_to_string(self.path(key)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Storage(format!("read cookie '{key}': {e}"))),
        };

        let cookie = Cookie::parse(raw.trim().to_owned())
            .map_err(|e| Error::Storage(format!("parse cookie '{key}': {e}")))?;

        if cookie
            .expires_datetime()
            .is_some_and(|expires| expires <= OffsetDateTime::now_utc())
        {
            tracing::debug!(key, "durable cookie expired");
            self.remove(key)?;
            return Ok(None);
        }

        let value = urlencoding::decode(cookie.value())
            .map_err(|e| Error::Storage(format!("decode cookie '{key}': {e}")))?;
        Ok(Some(value.into_owned()))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), Error> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| Error::Storage(format!("create {}: {e}", self.dir.display())))?;
        fs::write(self.path(key), self.build(key, value).to_string())
            .map_err(|e| Error::Storage(format!("write cookie '{key}': {e}")))
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!("remove cookie '{key}': {e}"))),
        }
    }
}
