//! `featurehub features` - feature report for one problem

use anyhow::{Context, Result};
use clap::Parser;
use featurehub_core::{DatabaseConfig, FeatureReport};

use super::{open_admin, OutputFormat};

#[derive(Parser, Debug)]
pub struct FeaturesArgs {
    /// Problem whose features to report
    #[arg(long, short, env = "FEATUREHUB_PROBLEM")]
    pub problem: String,

    /// Only features contributed by this user
    #[arg(long, short)]
    pub user: Option<String>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

pub async fn run_features(args: FeaturesArgs, config: &DatabaseConfig) -> Result<()> {
    let admin = open_admin(config).await?;

    let report = match admin.resolve_problem(&args.problem).await {
        Ok(Some(ctx)) => admin.get_features(&ctx, args.user.as_deref()).await,
        // not-found was already logged with a hint
        Ok(None) => Ok(None),
        Err(err) => Err(err),
    };
    admin.store().close().await;

    let report = report.context("failed to query features")?;
    print!("{}", render(report.as_ref(), args.format)?);
    Ok(())
}

fn render(report: Option<&FeatureReport>, format: OutputFormat) -> Result<String> {
    Ok(match (report, format) {
        (None, OutputFormat::Human) => "No features found\n".to_string(),
        (Some(report), OutputFormat::Human) => report.to_string(),
        (report, OutputFormat::Json) => format!("{}\n", serde_json::to_string_pretty(&report)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_distinct_from_empty_table() {
        assert_eq!(
            render(None, OutputFormat::Human).unwrap(),
            "No features found\n"
        );
        assert_eq!(render(None, OutputFormat::Json).unwrap(), "null\n");
    }
}
