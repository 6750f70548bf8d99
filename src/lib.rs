#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod http;
#[cfg(feature = "services")]
pub mod services;
pub mod session;
pub mod token;
pub mod types;
#[cfg(feature = "validation")]
pub mod validation;

// Re-exports for convenient access
pub use config::{ClientConfig, SessionSettings};
pub use error::{ApiError, Error};
pub use http::{ApiClient, FailureKind, Navigator, Notification, Notifier};
#[cfg(feature = "services")]
pub use services::{AuthService, EntityKind, ErpApi, ListParams, Page, Record, ResourceService};
pub use session::{Session, SessionStore};
pub use types::{AccessToken, CompanyId, Id, User, UserPatch};
