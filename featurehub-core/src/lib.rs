//! featurehub-core: schema, problem registry, and feature reports for the
//! featurehub store.

pub mod admin;
pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use admin::Admin;
pub use config::{DatabaseConfig, FeaturehubConfig};
pub use db::{SchemaOutcome, Store};
pub use error::{AdminError, Result};
pub use models::{
    FeatureReport, FeatureRow, NewProblem, Problem, ProblemContext, ProblemOutcome, ProblemType,
};
