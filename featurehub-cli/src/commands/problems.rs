//! Problem commands: create-problem, bulk-create-problems, problems, problem

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use featurehub_core::{DatabaseConfig, Problem, ProblemOutcome};
use tracing::warn;

use super::{open_admin, OutputFormat};

#[derive(Parser, Debug)]
pub struct CreateProblemArgs {
    /// YAML file holding exactly one problem document
    #[arg(long, short, value_name = "PATH")]
    pub file: PathBuf,
}

#[derive(Parser, Debug)]
pub struct BulkCreateArgs {
    /// YAML file holding `---` delimited problem documents
    #[arg(long, short, value_name = "PATH")]
    pub file: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ShowProblemArgs {
    /// Problem name
    pub name: String,

    /// Output format
    #[arg(long, short, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

pub async fn run_create_problem(args: CreateProblemArgs, config: &DatabaseConfig) -> Result<()> {
    let admin = open_admin(config).await?;
    let outcome = admin
        .create_problem_yml(&args.file)
        .await
        .with_context(|| format!("failed to create problem from {}", args.file.display()));
    admin.store().close().await;

    println!("{}", describe(&outcome?));
    Ok(())
}

pub async fn run_bulk_create(args: BulkCreateArgs, config: &DatabaseConfig) -> Result<()> {
    let admin = open_admin(config).await?;
    let outcomes = admin
        .bulk_create_problem_yml(&args.file)
        .await
        .with_context(|| format!("failed to create problems from {}", args.file.display()));
    admin.store().close().await;
    let outcomes = outcomes?;

    for outcome in &outcomes {
        println!("{}", describe(outcome));
    }
    let created = outcomes.iter().filter(|o| o.is_created()).count();
    println!(
        "{} document(s) processed, {} problem(s) created",
        outcomes.len(),
        created
    );
    Ok(())
}

pub async fn run_list_problems(config: &DatabaseConfig) -> Result<()> {
    let admin = open_admin(config).await?;
    let names = admin.get_problems().await;
    admin.store().close().await;

    let names = names.context("failed to list problems")?;
    if names.is_empty() {
        println!("No problems found");
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

pub async fn run_show_problem(args: ShowProblemArgs, config: &DatabaseConfig) -> Result<()> {
    let admin = open_admin(config).await?;
    let problem = admin.get_problem(&args.name).await;
    admin.store().close().await;

    let Some(problem) = problem.context("failed to read problem")? else {
        warn!("Problem {} does not exist!", args.name);
        warn!("You might want to create it with `featurehub create-problem`");
        return Ok(());
    };

    match args.format {
        OutputFormat::Human => print!("{}", render_problem(&problem)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&problem)?),
    }
    Ok(())
}

fn describe(outcome: &ProblemOutcome) -> String {
    match outcome {
        ProblemOutcome::Created(ctx) => {
            format!("Problem {} successfully created (id {})", ctx.name, ctx.id)
        }
        ProblemOutcome::AlreadyExists(ctx) => {
            format!("Problem {} already exists (id {})", ctx.name, ctx.id)
        }
    }
}

fn render_problem(problem: &Problem) -> String {
    let details = serde_json::Value::Object(problem.problem_type_details.clone());
    let mut out = String::new();
    let mut field = |label: &str, value: &dyn std::fmt::Display| {
        out.push_str(&format!("{:<32}{}\n", label, value));
    };

    field("name", &problem.name);
    field("id", &problem.id);
    field("problem_type", &problem.problem_type);
    field("problem_type_details", &details);
    field("data_dir_train", &problem.data_dir_train);
    field("data_dir_test", &problem.data_dir_test);
    field("entities_table_name", &problem.entities_table_name);
    field("entities_featurized_table_name", &problem.entities_featurized_table_name);
    field("target_table_name", &problem.target_table_name);
    field("created_at", &problem.created_at.format("%Y-%m-%d %H:%M:%S"));
    out.push_str("tables:\n");
    for (file, table) in problem.files.iter().zip(&problem.table_names) {
        out.push_str(&format!("  {:<30}{}\n", table, file));
    }
    out
}
