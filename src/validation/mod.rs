//! Data-driven form validation.
//!
//! A [`Schema`] is a table of fields and [`Rule`]s evaluated by one generic
//! validator; per-entity tables live in [`schema_for`].

mod rules;
mod schema;
#[cfg(feature = "services")]
mod tables;

pub use rules::Rule;
pub use schema::{FieldSpec, Schema, ValidationErrors};
#[cfg(feature = "services")]
pub use tables::schema_for;
