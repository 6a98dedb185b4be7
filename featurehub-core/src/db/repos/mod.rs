//! Repositories over a transaction's connection
//!
//! Each repository borrows the `PgConnection` handed out by
//! `Store::session_scope`, so everything it does commits or rolls back
//! together.

pub mod features;
pub mod problems;

pub use features::FeatureRepo;
pub use problems::ProblemRepo;
