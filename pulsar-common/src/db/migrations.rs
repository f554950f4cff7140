//! Database schema migrations
//!
//! Forward-only, versioned migrations tracked in the `schema_version` table.
//! Each migration checks the live schema before altering it, so running it
//! against an already-migrated database is a logged no-op.
//!
//! # Adding a migration
//!
//! 1. Never modify an existing migration
//! 2. Add `migrate_vN` and bump [`CURRENT_SCHEMA_VERSION`]
//! 3. Check the column/table first (`pragma_table_info`) instead of
//!    relying on the ALTER failing

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    // OR IGNORE: two processes starting together may both record the same version
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("✓ Migration v1 completed");
    }

    Ok(())
}

async fn column_exists(pool: &SqlitePool, table: &str, column: &str) -> Result<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?")
            .bind(table)
            .bind(column)
            .fetch_one(pool)
            .await?;

    Ok(count > 0)
}

/// Migration v1: Add patient_explanation column to clinical_knowledge
///
/// Knowledge bases created before patient-facing text existed lack the column.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: Add patient_explanation column to clinical_knowledge");

    if column_exists(pool, "clinical_knowledge", "patient_explanation").await? {
        info!("  patient_explanation column already exists - skipping");
        return Ok(());
    }

    match sqlx::query("ALTER TABLE clinical_knowledge ADD COLUMN patient_explanation TEXT")
        .execute(pool)
        .await
    {
        Ok(_) => {
            info!("  ✓ Added patient_explanation column to clinical_knowledge table");
            Ok(())
        }
        Err(sqlx::Error::Database(db_err)) if db_err.message().contains("duplicate column") => {
            // Another process beat us to it
            info!("  patient_explanation column added concurrently - skipping");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
