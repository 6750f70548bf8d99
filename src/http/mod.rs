//! Authenticated HTTP client wrapper.
//!
//! All feature services reach the API through [`ApiClient`], which owns
//! bearer-token attachment and the uniform reaction to failures:
//!
//! | Response | Reaction |
//! |---|---|
//! | 401 on an [`AuthEndpoints`] path | server message shown, session untouched |
//! | 401 elsewhere | logout, "session expired" toast, redirect to login |
//! | 403 / 404 | generic toast |
//! | 422 | one toast per field message, else the top-level message |
//! | 5xx | generic "server error" toast |
//! | no response | "check your connection" toast |
//!
//! The error is always returned to the caller after the reaction.

mod classify;
mod client;
mod notify;

pub use classify::{AuthEndpoints, ErrorBody, FailureKind, FieldMessages, classify};
pub use client::ApiClient;
pub use notify::{
    Level, Navigator, Notification, Notifier, ToastQueue, TracingNavigator, TracingNotifier,
    messages,
};
