//! Database connection pool and the scoped transaction boundary.
//!
//! Every read and write in the admin surface goes through
//! [`Store::session_scope`]: begin, run, commit on `Ok`, roll back on `Err`,
//! and hand the connection back to the pool on every path.

use std::time::Duration;

use futures::future::BoxFuture;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, warn};

use crate::config::DatabaseConfig;
use crate::error::Result;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Create a PostgreSQL connection pool for the configured database.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let url = config.connection_url()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(&url)
        .await?;
    Ok(pool)
}

/// Handle on one featurehub database.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
    name: String,
}

impl Store {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = create_pool(config).await?;
        debug!(database = %config.name, "connected");
        Ok(Self {
            pool,
            name: config.name.clone(),
        })
    }

    pub fn from_pool(pool: PgPool, name: impl Into<String>) -> Self {
        Self {
            pool,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run `f` inside one transaction.
    ///
    /// The closure receives the transaction's connection and must return a
    /// boxed future; captured data should be owned so the future can borrow
    /// the connection alone. A dropped transaction rolls back, so a panic or
    /// a cancelled future never leaves partial writes behind.
    pub async fn session_scope<T, F>(&self, f: F) -> Result<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T>> + Send,
    {
        let mut tx = self.pool.begin().await?;

        match f(&mut *tx).await {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(
                        database = %self.name,
                        error = %rollback_err,
                        "rollback failed; connection discarded"
                    );
                }
                Err(err)
            }
        }
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
        debug!(database = %self.name(), "pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdminError;

    // Integration tests require a real database
    // Run with: DATABASE_URL=postgres://... cargo test -p featurehub-core -- --ignored

    async fn store() -> Store {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("pool creation failed");
        Store::from_pool(pool, "scratch")
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn scope_returns_closure_value() {
        let store = store().await;
        let value: i32 = store
            .session_scope(|conn| {
                Box::pin(async move {
                    let row: (i32,) = sqlx::query_as("SELECT 1").fetch_one(conn).await?;
                    Ok(row.0)
                })
            })
            .await
            .expect("scope failed");
        assert_eq!(value, 1);
        assert_eq!(store.name(), "scratch");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn scope_rolls_back_on_error() {
        let store = store().await;
        sqlx::query("CREATE TABLE IF NOT EXISTS scope_rollback_probe (v INT)")
            .execute(store.pool())
            .await
            .expect("create failed");
        sqlx::query("DELETE FROM scope_rollback_probe")
            .execute(store.pool())
            .await
            .expect("cleanup failed");

        let result: Result<()> = store
            .session_scope(|conn| {
                Box::pin(async move {
                    sqlx::query("INSERT INTO scope_rollback_probe (v) VALUES (1)")
                        .execute(&mut *conn)
                        .await?;
                    Err(AdminError::config("forced failure"))
                })
            })
            .await;
        assert!(result.is_err());

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM scope_rollback_probe")
            .fetch_one(store.pool())
            .await
            .expect("count failed");
        assert_eq!(count.0, 0);

        sqlx::query("DROP TABLE scope_rollback_probe")
            .execute(store.pool())
            .await
            .expect("drop failed");
    }
}
