//! Command implementations for the featurehub CLI

pub mod features;
pub mod problems;
pub mod setup;

pub use features::run_features;
pub use problems::{run_bulk_create, run_create_problem, run_list_problems, run_show_problem};
pub use setup::run_setup;

use anyhow::{Context, Result};
use clap::ValueEnum;
use featurehub_core::{Admin, DatabaseConfig};

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (for piping to jq)
    Json,
}

async fn open_admin(config: &DatabaseConfig) -> Result<Admin> {
    Admin::open(config)
        .await
        .with_context(|| format!("failed to open database '{}'", config.name))
}
