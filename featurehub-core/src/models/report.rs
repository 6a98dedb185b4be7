//! Feature report: features pivoted against their metrics.
//!
//! Metrics are stored one row per (feature, metric name). The report turns
//! them into one row per feature with one column per metric name.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use tracing::warn;

/// Columns every report row carries, ahead of the metric columns.
pub const FIXED_COLUMNS: [&str; 4] = ["user", "description", "md5", "created_at"];

/// A feature joined with its owner's name
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct FeatureRecord {
    pub id: i32,
    pub user_name: String,
    pub description: String,
    pub md5: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct MetricRecord {
    pub feature_id: i32,
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub user: String,
    pub description: String,
    pub md5: String,
    pub created_at: DateTime<Utc>,
    pub metrics: BTreeMap<String, f64>,
}

impl FeatureRow {
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    /// Text for one column; `None` for a metric this feature lacks.
    pub fn cell(&self, column: &str) -> Option<String> {
        match column {
            "user" => Some(self.user.clone()),
            "description" => Some(self.description.clone()),
            "md5" => Some(self.md5.clone()),
            "created_at" => Some(self.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            metric => self.metric(metric).map(|v| v.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureReport {
    pub columns: Vec<String>,
    pub rows: Vec<FeatureRow>,
}

impl FeatureReport {
    /// Pivot features and their metrics into a report.
    ///
    /// Rows follow `features` order. Metric columns appear in order of first
    /// occurrence. A metric named like a fixed column gets no column of its own. When one feature has two metrics with the same name, the
    /// later one in `metrics` wins. Returns `None` when there are no features.
    pub fn pivot(features: Vec<FeatureRecord>, metrics: Vec<MetricRecord>) -> Option<Self> {
        if features.is_empty() {
            return None;
        }

        let mut by_feature: HashMap<i32, Vec<MetricRecord>> = HashMap::new();
        for metric in metrics {
            by_feature.entry(metric.feature_id).or_default().push(metric);
        }

        let mut columns: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
        let mut rows = Vec::with_capacity(features.len());

        for feature in features {
            let mut values = BTreeMap::new();
            for metric in by_feature.remove(&feature.id).unwrap_or_default() {
                if FIXED_COLUMNS.contains(&metric.name.as_str()) {
                    warn!(
                        feature_id = feature.id,
                        metric = %metric.name,
                        "metric name collides with a fixed column; kept in JSON output only"
                    );
                } else if !columns.contains(&metric.name) {
                    columns.push(metric.name.clone());
                }
                if let Some(previous) = values.insert(metric.name.clone(), metric.value) {
                    warn!(
                        feature_id = feature.id,
                        metric = %metric.name,
                        previous,
                        kept = metric.value,
                        "duplicate metric name; keeping the latest value"
                    );
                }
            }

            rows.push(FeatureRow {
                user: feature.user_name,
                description: feature.description,
                md5: feature.md5,
                created_at: feature.created_at,
                metrics: values,
            });
        }

        Some(Self { columns, rows })
    }

    pub fn metric_columns(&self) -> &[String] {
        &self.columns[FIXED_COLUMNS.len()..]
    }
}

impl fmt::Display for FeatureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|col| row.cell(col).unwrap_or_default())
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(col.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |f: &mut fmt::Formatter<'_>, values: &[String]| -> fmt::Result {
            let padded: Vec<String> = values
                .iter()
                .zip(&widths)
                .map(|(v, w)| format!("{:<width$}", v, width = *w))
                .collect();
            writeln!(f, "{}", padded.join("  ").trim_end())
        };

        line(f, &self.columns)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        line(f, &rule)?;
        for row in &cells {
            line(f, row)?;
        }
        Ok(())
    }
}
