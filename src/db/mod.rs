//! Database module: models, schema and queries for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: the pooled [`Storage`] handle
//! - one module per table group, each extending [`Storage`]

pub mod households;
pub mod interactions;
pub mod models;
pub mod neighborhoods;
pub mod profiles;
pub mod properties;
pub mod schema;
pub mod searches;
pub mod sqlite;

pub use interactions::{ActivityRow, InteractionSummary};
pub use models::{
    DbHousehold, DbInteraction, DbNeighborhood, DbProfile, DbProperty, DbSavedSearch, DbVibes,
    HouseholdMember, MemberInteraction, PropertySummary,
};
pub use neighborhoods::NewNeighborhood;
pub use properties::{PropertyInput, VibesInput};
pub use schema::SQLITE_INIT;
pub use searches::SavedSearchPatch;
pub use sqlite::{SqlitePool, Storage};
