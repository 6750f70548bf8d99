//! Per-entity REST services.
//!
//! Every entity exposes the same five operations (`list`, `get_by_id`,
//! `create`, `update`, `delete`) through a [`ResourceService`], so one
//! generic service plus the [`EntityKind`] table covers all of them.

mod auth;
pub mod envelope;
mod entities;
mod page;
mod resource;

pub use auth::{AuthService, Credentials, ExpiresIn, LoginResponse};
pub use entities::{EntityKind, ErpApi, Record};
pub use envelope::Shape;
pub use page::{ListParams, Page};
pub use resource::{Endpoint, ResourceService};
