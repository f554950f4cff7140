//! Database initialization
//!
//! Startup sequence, safe to repeat on an existing file:
//! 1. Create tables that don't exist yet
//! 2. Run pending schema migrations
//! 3. Seed the clinical knowledge base if it is empty

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open or create the database file and bring its schema up to date
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets history reads proceed while a prediction is being recorded
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema_version_table(&pool).await?;
    create_clinical_knowledge_table(&pool).await?;
    create_diagnosis_history_table(&pool).await?;

    // Migrations run before seeding so the insert sees the current columns
    crate::db::migrations::run_migrations(&pool).await?;

    crate::db::knowledge::seed_knowledge_base(&pool).await?;

    Ok(pool)
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the clinical knowledge table
///
/// Column names are consumed by the dashboard and must not change.
pub async fn create_clinical_knowledge_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS clinical_knowledge (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            condition TEXT UNIQUE,
            base_observations TEXT,
            patient_explanation TEXT,
            standard_recommendation TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the append-only diagnosis history table
pub async fn create_diagnosis_history_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS diagnosis_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
            modality TEXT,
            condition TEXT,
            confidence REAL,
            diagnostic_issue TEXT,
            observations TEXT,
            severity TEXT,
            recommendation TEXT,
            filename TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_diagnosis_history_timestamp ON diagnosis_history(timestamp)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
