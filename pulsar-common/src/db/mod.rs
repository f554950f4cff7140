//! Diagnosis Store: durable history and the clinical knowledge base
//!
//! Two tables live in a single SQLite file:
//! - `clinical_knowledge`: static reference text keyed by condition, seeded once
//! - `diagnosis_history`: append-only record of completed predictions

pub mod history;
pub mod init;
pub mod knowledge;
pub mod migrations;
pub mod models;

pub use history::{DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
pub use init::init_database;
pub use models::*;

use crate::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Handle to the diagnosis database
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct DiagnosisStore {
    pool: SqlitePool,
}

impl DiagnosisStore {
    /// Open (creating if necessary) the database at `db_path`
    ///
    /// Safe to call on every process start: schema creation, migrations
    /// and knowledge seeding are all idempotent.
    pub async fn open(db_path: &Path) -> Result<Self> {
        let pool = init_database(db_path).await?;
        Ok(Self { pool })
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
