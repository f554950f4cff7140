//! Database row models

use serde::Serialize;

/// One row of `clinical_knowledge`
///
/// Text columns are nullable in the schema (older databases predate
/// `patient_explanation`), so readers must tolerate `None`.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct KnowledgeRecord {
    pub condition: String,
    pub base_observations: Option<String>,
    pub patient_explanation: Option<String>,
    pub standard_recommendation: Option<String>,
}

/// One row of `diagnosis_history`, serialized as-is by `GET /history`
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct DiagnosisHistoryEntry {
    pub id: i64,
    pub timestamp: Option<String>,
    pub modality: Option<String>,
    pub condition: Option<String>,
    pub confidence: Option<f64>,
    pub diagnostic_issue: Option<String>,
    pub observations: Option<String>,
    pub severity: Option<String>,
    pub recommendation: Option<String>,
    pub filename: Option<String>,
}

/// Values for a new history row; `id` and `timestamp` are assigned by SQLite
#[derive(Debug, Clone)]
pub struct NewDiagnosis<'a> {
    pub modality: &'a str,
    pub condition: &'a str,
    pub confidence: f64,
    /// Impression sentence
    pub diagnostic_issue: &'a str,
    /// Findings flattened with [`FINDINGS_SEPARATOR`](crate::db::history::FINDINGS_SEPARATOR)
    pub observations: String,
    pub severity: &'a str,
    pub recommendation: &'a str,
    pub filename: Option<&'a str>,
}
