//! Connection handling for the SQLite database.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::schema::{SCHEMA, SEED_ADMIN_PASSWORD, SEED_ADMIN_USERNAME};

/// A pooled SQLite database.
///
/// Every statement executed through the pool commits on its own; multi-statement
/// changes open an explicit transaction.
#[derive(Clone, Debug)]
pub struct Database {
    /// The connection pool.
    pub pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database at `url`, e.g.
    /// `sqlite://taxibooking.db?mode=rwc`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed or the file cannot be opened.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    ///
    /// An in-memory SQLite database lives and dies with its connection, so the pool is
    /// pinned to a single connection that is never recycled.
    ///
    /// # Errors
    ///
    /// Returns an error if `SQLite` cannot allocate the database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Create missing tables and seed the operator account into an empty `admin` table.
    ///
    /// Safe to call on every start-up.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails; nothing is committed in that case.
    pub async fn initialize(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::raw_sql(SCHEMA).execute(&mut *tx).await?;

        let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin")
            .fetch_one(&mut *tx)
            .await?;

        if admins == 0 {
            sqlx::query("INSERT INTO admin (username, password) VALUES (?, ?)")
                .bind(SEED_ADMIN_USERNAME)
                .bind(SEED_ADMIN_PASSWORD)
                .execute(&mut *tx)
                .await?;
            tracing::info!(username = SEED_ADMIN_USERNAME, "Seeded default admin account");
        }

        tx.commit().await?;
        tracing::debug!("Schema initialized");
        Ok(())
    }
}
