//! Feature and metric reads for reporting.
//!
//! Metrics for a page of features come back in one `= ANY($1)` query
//! rather than one query per feature.

use sqlx::{PgConnection, Postgres, QueryBuilder};

use crate::error::Result;
use crate::models::{FeatureRecord, MetricRecord};

pub struct FeatureRepo<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> FeatureRepo<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Features of one problem with their owner's name, oldest first.
    pub async fn list_for_problem(
        &mut self,
        problem_id: i32,
        user_name: Option<&str>,
    ) -> Result<Vec<FeatureRecord>> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT f.id, u.name AS user_name, f.description, f.md5, f.created_at \
             FROM features f JOIN users u ON u.id = f.user_id \
             WHERE f.problem_id = ",
        );
        builder.push_bind(problem_id);
        if let Some(user) = user_name {
            builder.push(" AND u.name = ");
            builder.push_bind(user);
        }
        builder.push(" ORDER BY f.id");

        let rows = builder
            .build_query_as::<FeatureRecord>()
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows)
    }

    /// Metrics of the given features, grouped by feature then write order.
    pub async fn metrics_for(&mut self, feature_ids: &[i32]) -> Result<Vec<MetricRecord>> {
        if feature_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, MetricRecord>(
            r#"
            SELECT feature_id, name, value
            FROM metrics
            WHERE feature_id = ANY($1)
            ORDER BY feature_id, id
            "#,
        )
        .bind(feature_ids)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows)
    }
}
