//! Database connection management.
//!
//! The [`Store`] struct owns a [`SqlitePool`] and guarantees that migrations
//! are run before the handle is handed out.  Clones are cheap and share the
//! same pool, so one `Store` can be passed to every request handler and
//! pipeline run.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::error::Result;
use crate::migrations;

/// Cloneable handle over the SQLite connection pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (or create) the database at `url` and run pending migrations.
    ///
    /// `url` accepts anything sqlx understands for SQLite, e.g.
    /// `sqlite://natter.db` or `sqlite::memory:`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        tracing::info!(url, max_connections, "opening database");

        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        migrations::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Open a fresh in-memory database.
    ///
    /// The pool is capped at one connection so every query sees the same
    /// in-memory instance.  Intended for tests and local experiments.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        migrations::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Return a reference to the underlying pool.
    ///
    /// Callers should prefer the typed query helpers, but direct access is
    /// occasionally needed for transactions or ad-hoc queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool, waiting for checked-out connections to finish.
    pub async fn close(&self) {
        tracing::info!("closing database");
        self.pool.close().await;
    }
}
