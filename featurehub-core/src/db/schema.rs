//! Physical database lifecycle and table creation.

use sqlx::migrate::MigrateDatabase;
use sqlx::{PgConnection, Postgres};
use tracing::info;

use super::pool::Store;
use crate::config::DatabaseConfig;
use crate::error::Result;

/// Tables declared by the schema, in creation order.
pub const DECLARED_TABLES: [&str; 5] = [
    "users",
    "problems",
    "features",
    "metrics",
    "evaluation_attempts",
];

const TABLE_DDL: [&str; 5] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS problems (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        problem_type TEXT NOT NULL,
        problem_type_details TEXT NOT NULL DEFAULT '{}',
        data_dir_train TEXT NOT NULL,
        data_dir_test TEXT NOT NULL,
        files TEXT NOT NULL DEFAULT '[]',
        table_names TEXT NOT NULL DEFAULT '[]',
        entities_table_name TEXT NOT NULL,
        entities_featurized_table_name TEXT NOT NULL,
        target_table_name TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS features (
        id SERIAL PRIMARY KEY,
        description TEXT NOT NULL,
        code TEXT NOT NULL DEFAULT '',
        md5 TEXT NOT NULL,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        problem_id INTEGER NOT NULL REFERENCES problems(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS metrics (
        id SERIAL PRIMARY KEY,
        feature_id INTEGER NOT NULL REFERENCES features(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        scoring TEXT NOT NULL DEFAULT '',
        value DOUBLE PRECISION NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS evaluation_attempts (
        id SERIAL PRIMARY KEY,
        problem_id INTEGER NOT NULL REFERENCES problems(id) ON DELETE CASCADE,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        code TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

const INDEX_DDL: [&str; 5] = [
    "CREATE INDEX IF NOT EXISTS idx_features_problem ON features(problem_id)",
    "CREATE INDEX IF NOT EXISTS idx_features_user ON features(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_metrics_feature ON metrics(feature_id)",
    "CREATE INDEX IF NOT EXISTS idx_evaluation_attempts_problem ON evaluation_attempts(problem_id)",
    "CREATE INDEX IF NOT EXISTS idx_evaluation_attempts_user ON evaluation_attempts(user_id)",
];

/// What `initialize` did to the physical database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOutcome {
    /// The database did not exist and was created
    Created,
    /// The database existed and was dropped and created again
    Recreated,
    /// The database existed and was kept; missing tables were added
    Existing,
}

pub async fn database_exists(config: &DatabaseConfig) -> Result<bool> {
    let url = config.connection_url()?;
    Ok(Postgres::database_exists(&url).await?)
}

/// Create (or drop and recreate) the database, then create missing tables.
///
/// Dropping terminates other sessions on the database (PostgreSQL 13+).
///
/// Never alters an existing table. A failure part way is not recovered;
/// run again with the same arguments.
pub async fn initialize(config: &DatabaseConfig, drop: bool) -> Result<SchemaOutcome> {
    let url = config.connection_url()?;
    let name = &config.name;

    let outcome = if Postgres::database_exists(&url).await? {
        info!("Database {} already exists", name);
        if drop {
            info!("Dropping old database {}", name);
            // WITH (FORCE): sessions that are still exiting would block a plain DROP
            Postgres::force_drop_database(&url).await?;
            info!("Re-creating database {}", name);
            Postgres::create_database(&url).await?;
            SchemaOutcome::Recreated
        } else {
            SchemaOutcome::Existing
        }
    } else {
        info!("Creating database {}", name);
        Postgres::create_database(&url).await?;
        SchemaOutcome::Created
    };

    let store = Store::connect(config).await?;
    let result = create_tables(&store).await;
    store.close().await;
    result?;

    info!("Database {} created successfully", name);
    Ok(outcome)
}

/// Create every declared table and index that is missing.
pub async fn create_tables(store: &Store) -> Result<()> {
    info!("Creating tables...");
    store
        .session_scope(|conn| Box::pin(async move { run_ddl(conn).await }))
        .await
}

async fn run_ddl(conn: &mut PgConnection) -> Result<()> {
    for ddl in TABLE_DDL.iter().chain(INDEX_DDL.iter()) {
        sqlx::query(ddl).execute(&mut *conn).await?;
    }
    Ok(())
}

/// Names of the tables present in the public schema, sorted.
pub async fn existing_tables(store: &Store) -> Result<Vec<String>> {
    store
        .session_scope(|conn| {
            Box::pin(async move {
                let names = sqlx::query_scalar::<_, String>(
                    r#"
                    SELECT table_name::TEXT
                    FROM information_schema.tables
                    WHERE table_schema = 'public'
                    ORDER BY table_name
                    "#,
                )
                .fetch_all(conn)
                .await?;
                Ok(names)
            })
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_declared_table_has_ddl() {
        for (table, ddl) in DECLARED_TABLES.iter().zip(TABLE_DDL.iter()) {
            let needle = format!("CREATE TABLE IF NOT EXISTS {} (", table);
            assert!(ddl.contains(&needle), "missing DDL for {}", table);
        }
    }

    #[test]
    fn ddl_is_additive_only() {
        for ddl in TABLE_DDL.iter().chain(INDEX_DDL.iter()) {
            assert!(ddl.contains("IF NOT EXISTS"));
            assert!(!ddl.to_uppercase().contains("DROP"));
            assert!(!ddl.to_uppercase().contains("ALTER"));
        }
    }

    #[test]
    fn referenced_tables_are_created_first() {
        let position = |name: &str| DECLARED_TABLES.iter().position(|t| *t == name).unwrap();
        assert!(position("users") < position("features"));
        assert!(position("problems") < position("features"));
        assert!(position("features") < position("metrics"));
        assert!(position("problems") < position("evaluation_attempts"));
    }
}
