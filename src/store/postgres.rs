//! Postgres-backed user store.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE users (
//!     name           TEXT PRIMARY KEY,
//!     email          TEXT,
//!     password_hash  TEXT NOT NULL,
//!     roles          TEXT[],
//!     login_attempts INTEGER NOT NULL DEFAULT 0,
//!     created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! All user-supplied values travel as bound parameters; query text is never
//! assembled from input. Connections are pool-scoped and return to the pool on
//! every exit path, and each query is bounded by the configured timeout.

use super::{UserRecord, UserStore};
use crate::config::StoreConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::time::timeout;
use tracing::Instrument;

/// A [`UserStore`] over a Postgres connection pool.
pub struct PgUserStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgUserStore {
    /// Connect a new pool using the given configuration.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections())
            .acquire_timeout(config.acquire_timeout())
            .connect(config.dsn()?.as_str())
            .await
            .context("failed to connect to user store")?;

        Ok(Self {
            pool,
            query_timeout: config.query_timeout(),
        })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub fn with_pool(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    async fn execute_counter_update(&self, query: &'static str, name: &str) -> Result<()> {
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        timeout(
            self.query_timeout,
            sqlx::query(query).bind(name).execute(&self.pool).instrument(span),
        )
        .await
        .context("login attempt update timed out")?
        .context("failed to update login attempts")?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<UserRecord>> {
        let query = "SELECT name, email, password_hash, roles, login_attempts, created_at \
                     FROM users WHERE name = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = timeout(
            self.query_timeout,
            sqlx::query(query)
                .bind(name)
                .fetch_optional(&self.pool)
                .instrument(span),
        )
        .await
        .context("user lookup timed out")?
        .context("failed to look up user")?;

        row.map(|row| record_from_row(&row)).transpose()
    }

    async fn record_failed_login(&self, name: &str) -> Result<()> {
        self.execute_counter_update(
            "UPDATE users SET login_attempts = login_attempts + 1 WHERE name = $1",
            name,
        )
        .await
    }

    async fn reset_login_attempts(&self, name: &str) -> Result<()> {
        self.execute_counter_update("UPDATE users SET login_attempts = 0 WHERE name = $1", name)
            .await
    }
}

fn record_from_row(row: &PgRow) -> Result<UserRecord> {
    let name: String = row.try_get("name").context("missing name column")?;
    let email: Option<String> = row.try_get("email").context("missing email column")?;
    let password_hash: String = row
        .try_get("password_hash")
        .context("missing password_hash column")?;
    let roles: BTreeSet<String> = row
        .try_get::<Option<Vec<String>>, _>("roles")
        .context("missing roles column")?
        .unwrap_or_default()
        .into_iter()
        .collect();
    let login_attempts: i32 = row
        .try_get("login_attempts")
        .context("missing login_attempts column")?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .context("missing created_at column")?;

    Ok(UserRecord::from_store(
        name,
        email,
        password_hash,
        roles,
        u32::try_from(login_attempts).unwrap_or(0),
        created_at,
    ))
}

#[cfg(test)]
mod tests {
    use super::PgUserStore;
    use crate::store::UserStore;
    use anyhow::Result;
    use sqlx::postgres::PgPoolOptions;
    use std::time::Duration;

    fn unreachable_store() -> Result<PgUserStore> {
        // Port 9 (discard) refuses connections; the pool is lazy so errors
        // only show up when a query runs.
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://postgres@127.0.0.1:9/postgres")?;
        Ok(PgUserStore::with_pool(pool, Duration::from_secs(2)))
    }

    #[tokio::test]
    async fn unreachable_store_errors_instead_of_hanging() -> Result<()> {
        let store = unreachable_store()?;
        assert!(store.find_by_name("alice").await.is_err());
        assert!(store.record_failed_login("alice").await.is_err());
        assert!(store.reset_login_attempts("alice").await.is_err());
        Ok(())
    }
}
