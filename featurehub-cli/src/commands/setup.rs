//! `featurehub setup` - create the database and its tables

use anyhow::Result;
use clap::Parser;
use featurehub_core::db::schema;
use featurehub_core::{DatabaseConfig, SchemaOutcome};

use crate::ui;

#[derive(Parser, Debug)]
pub struct SetupArgs {
    /// Drop the database first if it already exists (destroys all data and ends other sessions)
    #[arg(long)]
    pub drop: bool,
}

pub async fn run_setup(args: SetupArgs, config: &DatabaseConfig) -> Result<()> {
    let pb = ui::spinner(format!("Initializing database {}...", config.name));

    match schema::initialize(config, args.drop).await {
        Ok(outcome) => {
            ui::finish_success(pb, outcome_message(outcome, &config.name));
            Ok(())
        }
        Err(err) => {
            ui::finish_error(pb, format!("Database {} setup failed", config.name));
            Err(err.into())
        }
    }
}

fn outcome_message(outcome: SchemaOutcome, name: &str) -> String {
    match outcome {
        SchemaOutcome::Created => format!("Database {} created successfully", name),
        SchemaOutcome::Recreated => format!("Database {} dropped and re-created", name),
        SchemaOutcome::Existing => {
            format!("Database {} already exists; missing tables created", name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_database() {
        for outcome in [
            SchemaOutcome::Created,
            SchemaOutcome::Recreated,
            SchemaOutcome::Existing,
        ] {
            assert!(outcome_message(outcome, "contest").contains("contest"));
        }
        assert!(outcome_message(SchemaOutcome::Existing, "x").contains("already exists"));
    }
}
