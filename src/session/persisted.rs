//! Serialized session layout:
//! `{"state":{"user","token","refreshToken","isAuthenticated","rememberMe"},"version":0}`.

use serde::{Deserialize, Serialize};

use super::Session;
use crate::error::Error;
use crate::types::{AccessToken, User};

pub(super) const VERSION: u32 = 0;

#[derive(Serialize, Deserialize)]
struct Persisted {
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedState {
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    token: Option<AccessToken>,
    #[serde(default)]
    refresh_token: Option<String>,
    // Written for readers of the raw record; recomputed on load.
    #[serde(default)]
    is_authenticated: bool,
    #[serde(default)]
    remember_me: bool,
}

pub(super) fn encode(session: &Session) -> Result<String, Error> {
    let persisted = Persisted {
        state: PersistedState {
            user: session.user.clone(),
            token: session.token.clone(),
            refresh_token: session.refresh_token.clone(),
            is_authenticated: session.is_authenticated(),
            remember_me: session.remember_me,
        },
        version: VERSION,
    };
    Ok(serde_json::to_string(&persisted)?)
}

pub(super) fn decode(raw: &str) -> Result<Session, Error> {
    let persisted: Persisted = serde_json::from_str(raw)?;
    if persisted.version > VERSION {
        return Err(Error::Storage(format!(
            "unsupported session version {}",
            persisted.version
        )));
    }
    let state = persisted.state;
    Ok(Session {
        user: state.user,
        token: state.token,
        refresh_token: state.refresh_token,
        remember_me: state.remember_me,
    })
}
