//! Database migration runner.
//!
//! Migrations are executed in order on every [`Store::connect`] call.  Each
//! migration is guarded by SQLite's `user_version` pragma so it runs exactly
//! once per database file.
//!
//! [`Store::connect`]: crate::database::Store::connect

pub mod v001_initial;

use sqlx::SqlitePool;

use crate::error::{Result, StoreError};

/// Current schema version.  Bump this and add a new migration module whenever
/// the schema changes.
const CURRENT_VERSION: i64 = 1;

/// Run all pending migrations against the pool.
///
/// The function reads `PRAGMA user_version` to determine which migrations
/// have already been applied, then executes any outstanding ones in order.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await?;

    tracing::info!(
        current_version = current,
        target_version = CURRENT_VERSION,
        "checking database migrations"
    );

    if current < 1 {
        tracing::info!("applying migration v001_initial");
        sqlx::raw_sql(v001_initial::UP_SQL)
            .execute(pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;
        sqlx::query("PRAGMA user_version = 1").execute(pool).await?;
    }

    // Future migrations would be added here:
    // if current < 2 {
    //     sqlx::raw_sql(v002_xxx::UP_SQL).execute(pool).await?;
    //     sqlx::query("PRAGMA user_version = 2").execute(pool).await?;
    // }

    Ok(())
}
