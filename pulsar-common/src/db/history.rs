//! Diagnosis history: append and recent-first queries

use crate::db::{DiagnosisHistoryEntry, DiagnosisStore, NewDiagnosis};
use crate::Result;
use tracing::debug;

/// Entries returned by a history query without an explicit limit
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Upper bound for a caller-supplied limit
pub const MAX_HISTORY_LIMIT: i64 = 500;

/// Separator used when flattening clinical findings into one column
pub const FINDINGS_SEPARATOR: &str = " | ";

/// Join findings into the single `observations` column
pub fn flatten_findings<S: AsRef<str>>(findings: &[S]) -> String {
    findings
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(FINDINGS_SEPARATOR)
}

impl DiagnosisStore {
    /// Append one completed prediction, returning its id
    ///
    /// Not idempotent: every call adds a row.
    pub async fn record_diagnosis(&self, entry: &NewDiagnosis<'_>) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO diagnosis_history (
                modality, condition, confidence, diagnostic_issue,
                observations, severity, recommendation, filename
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.modality)
        .bind(entry.condition)
        .bind(entry.confidence)
        .bind(entry.diagnostic_issue)
        .bind(&entry.observations)
        .bind(entry.severity)
        .bind(entry.recommendation)
        .bind(entry.filename)
        .execute(self.pool())
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, condition = entry.condition, "Recorded diagnosis");
        Ok(id)
    }

    /// Most recent entries first, at most `limit` of them
    ///
    /// `limit` is clamped to `0..=MAX_HISTORY_LIMIT`; zero or less yields none.
    ///
    /// Rows sharing a timestamp (one-second resolution) are ordered by id.
    pub async fn recent_history(&self, limit: i64) -> Result<Vec<DiagnosisHistoryEntry>> {
        let limit = limit.clamp(0, MAX_HISTORY_LIMIT);

        let rows = sqlx::query_as::<_, DiagnosisHistoryEntry>(
            r#"
            SELECT id, timestamp, modality, condition, confidence, diagnostic_issue,
                   observations, severity, recommendation, filename
            FROM diagnosis_history
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }
}
