//! Database layer - connection pool, schema lifecycle, and repositories
//!
//! - One transaction per admin operation (`Store::session_scope`)
//! - Rely on DB constraints for uniqueness, handle conflicts in the insert
//! - Schema changes are additive only (`CREATE ... IF NOT EXISTS`)

pub mod pool;
pub mod repos;
pub mod schema;

pub use pool::{create_pool, Store};
pub use repos::*;
pub use schema::{SchemaOutcome, DECLARED_TABLES};
