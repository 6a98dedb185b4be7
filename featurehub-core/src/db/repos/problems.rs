//! Problem repository
//!
//! - insert: INSERT with ON CONFLICT (name) DO NOTHING, so a concurrent
//!   creator of the same name never produces a second row
//! - reads decode the JSON-text columns into typed values

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};

use crate::error::{AdminError, Result};
use crate::models::columns::{self, Details, FILES, PROBLEM_TYPE_DETAILS, TABLE_NAMES};
use crate::models::{NewProblem, Problem, ProblemContext};

/// Problem row as stored
#[derive(Debug, Clone, FromRow)]
struct ProblemRow {
    id: i32,
    name: String,
    problem_type: String,
    problem_type_details: String,
    data_dir_train: String,
    data_dir_test: String,
    files: String,
    table_names: String,
    entities_table_name: String,
    entities_featurized_table_name: String,
    target_table_name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProblemRow> for Problem {
    type Error = AdminError;

    fn try_from(row: ProblemRow) -> Result<Self> {
        let problem_type = row
            .problem_type
            .parse()
            .map_err(|reason: String| AdminError::invalid_problem(&row.name, reason))?;
        let problem_type_details: Details =
            columns::decode(PROBLEM_TYPE_DETAILS, &row.problem_type_details)?;

        Ok(Problem {
            id: row.id,
            problem_type,
            problem_type_details,
            data_dir_train: row.data_dir_train,
            data_dir_test: row.data_dir_test,
            files: columns::decode(FILES, &row.files)?,
            table_names: columns::decode(TABLE_NAMES, &row.table_names)?,
            entities_table_name: row.entities_table_name,
            entities_featurized_table_name: row.entities_featurized_table_name,
            target_table_name: row.target_table_name,
            created_at: row.created_at,
            name: row.name,
        })
    }
}

/// Problem repository, bound to one transaction's connection
pub struct ProblemRepo<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> ProblemRepo<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn find_context(&mut self, name: &str) -> Result<Option<ProblemContext>> {
        let row: Option<(i32, String)> =
            sqlx::query_as("SELECT id, name FROM problems WHERE name = $1")
                .bind(name)
                .fetch_optional(&mut *self.conn)
                .await?;

        Ok(row.map(|(id, name)| ProblemContext { id, name }))
    }

    pub async fn find_by_name(&mut self, name: &str) -> Result<Option<Problem>> {
        let row: Option<ProblemRow> = sqlx::query_as(
            r#"
            SELECT id, name, problem_type, problem_type_details, data_dir_train,
                   data_dir_test, files, table_names, entities_table_name,
                   entities_featurized_table_name, target_table_name, created_at
            FROM problems
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(Problem::try_from).transpose()
    }

    /// Insert a problem, encoding its JSON-text columns.
    ///
    /// Returns `None` when the name is already taken.
    pub async fn insert(&mut self, problem: &NewProblem) -> Result<Option<ProblemContext>> {
        let details = columns::encode(PROBLEM_TYPE_DETAILS, &problem.problem_type_details)?;
        let files = columns::encode(FILES, &problem.files)?;
        let table_names = columns::encode(TABLE_NAMES, &problem.table_names)?;

        let row: Option<(i32, String)> = sqlx::query_as(
            r#"
            INSERT INTO problems (
                name, problem_type, problem_type_details, data_dir_train,
                data_dir_test, files, table_names, entities_table_name,
                entities_featurized_table_name, target_table_name
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (name) DO NOTHING
            RETURNING id, name
            "#,
        )
        .bind(&problem.name)
        .bind(problem.problem_type.as_str())
        .bind(details)
        .bind(&problem.data_dir_train)
        .bind(&problem.data_dir_test)
        .bind(files)
        .bind(table_names)
        .bind(&problem.entities_table_name)
        .bind(&problem.entities_featurized_table_name)
        .bind(&problem.target_table_name)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(row.map(|(id, name)| ProblemContext { id, name }))
    }

    /// Problem names in creation order.
    pub async fn list_names(&mut self) -> Result<Vec<String>> {
        let names = sqlx::query_scalar("SELECT name FROM problems ORDER BY id")
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(names)
    }
}
