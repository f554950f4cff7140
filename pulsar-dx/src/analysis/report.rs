//! Clinician-facing report composition
//!
//! Text comes from the clinical knowledge base when the condition has a
//! record; otherwise a generic "pending review" report is produced.

use super::pathology::Assessment;
use super::{FeatureVector, Fingerprint, Modality};
use chrono::{DateTime, Local};
use pulsar_common::db::KnowledgeRecord;
use serde::Serialize;

/// Anatomical location strings, indexed by `fingerprint mod 5`
pub const LOCATIONS: [&str; 5] = [
    "distal second distal fourth",
    "proximal third",
    "medial aspect",
    "lateral margin",
    "mid-shaft region",
];

/// Severity tiers, indexed by `floor(complexity) mod 3`
pub const SEVERITY_TIERS: [&str; 3] = ["Mild/Early Stage", "Moderate/Advancing", "Acute/Critical"];

pub const SEVERITY_NORMAL: &str = "Normal";
pub const SEVERITY_UNDER_REVIEW: &str = "Under Review";

const DEFAULT_PATIENT_EXPLANATION: &str = "The scan appears normal.";
const SPECIALIST_RECOMMENDATION: &str = "Consult with a certified radiologist.";
const TIMESTAMP_FORMAT: &str = "%b %d, %Y | %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub impacting_condition: String,
    pub location_identified: String,
    pub confidence_score: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosisReport {
    pub summary: ReportSummary,
    pub clinical_findings: Vec<String>,
    pub impression: String,
    pub patient_explanation: String,
    pub severity: String,
    pub recommendation: String,
    pub diagnosis_id: String,
    pub analysis_timestamp: String,
}

/// Everything the composer needs from the classification stages
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub modality: Modality,
    pub fingerprint: &'a Fingerprint,
    pub features: &'a FeatureVector,
    pub assessment: &'a Assessment,
}

/// `RAD-AI-` followed by `fingerprint mod 10000`, zero padded to 4 digits
pub fn diagnosis_id(fingerprint: &Fingerprint) -> String {
    format!("RAD-AI-{:04}", fingerprint.rem(10_000))
}

/// Build the report; never fails
///
/// `knowledge` is the record for `input.assessment.condition`, if any.
pub fn compose(input: &ReportInput<'_>, knowledge: Option<&KnowledgeRecord>, generated_at: DateTime<Local>) -> DiagnosisReport {
    let timestamp = generated_at.format(TIMESTAMP_FORMAT).to_string();
    match knowledge {
        Some(record) => compose_from_knowledge(input, record, timestamp),
        None => compose_fallback(input, timestamp),
    }
}

fn compose_from_knowledge(input: &ReportInput<'_>, record: &KnowledgeRecord, timestamp: String) -> DiagnosisReport {
    let condition = input.assessment.condition;
    let normal = input.assessment.is_normal();
    let complexity = input.features.complexity;

    let location = LOCATIONS[input.fingerprint.rem(LOCATIONS.len() as u64) as usize];
    let severity = if normal {
        SEVERITY_NORMAL
    } else {
        SEVERITY_TIERS[(complexity.floor() as u64 % SEVERITY_TIERS.len() as u64) as usize]
    };

    let texture_finding = if normal {
        "Normal anatomical patterns observed throughout the scanned region.".to_string()
    } else {
        let observations = record.base_observations.as_deref().unwrap_or_default();
        format!(
            "Texture analysis reveals {:.1} intensity variance with focal {}.",
            complexity,
            observations.to_lowercase()
        )
    };

    let impression = if normal {
        "Normal diagnostic study. No acute findings.".to_string()
    } else {
        format!("Features are highly suggestive of {}.", condition)
    };

    DiagnosisReport {
        summary: ReportSummary {
            impacting_condition: condition.to_string(),
            location_identified: location.to_string(),
            confidence_score: format!("{:.2}%", input.assessment.raw_confidence * 100.0),
        },
        clinical_findings: vec![
            format!(
                "Evaluation of the {} demonstrates {} characteristics located within the {}.",
                input.modality,
                condition.to_lowercase(),
                location
            ),
            texture_finding,
        ],
        impression,
        patient_explanation: record
            .patient_explanation
            .clone()
            .unwrap_or_else(|| DEFAULT_PATIENT_EXPLANATION.to_string()),
        severity: severity.to_string(),
        recommendation: record
            .standard_recommendation
            .clone()
            .unwrap_or_else(|| SPECIALIST_RECOMMENDATION.to_string()),
        diagnosis_id: diagnosis_id(input.fingerprint),
        analysis_timestamp: timestamp,
    }
}

fn compose_fallback(input: &ReportInput<'_>, timestamp: String) -> DiagnosisReport {
    let condition = input.assessment.condition;
    DiagnosisReport {
        summary: ReportSummary {
            impacting_condition: condition.to_string(),
            location_identified: "Generalized".to_string(),
            confidence_score: "N/A".to_string(),
        },
        clinical_findings: vec![
            format!("Routine {} screening.", input.modality),
            format!("Patient scan showing {} markers.", condition),
        ],
        impression: format!("Pending specialist review for {}.", condition),
        patient_explanation: "A specialized review is required to interpret these patterns.".to_string(),
        severity: SEVERITY_UNDER_REVIEW.to_string(),
        recommendation: SPECIALIST_RECOMMENDATION.to_string(),
        diagnosis_id: diagnosis_id(input.fingerprint),
        analysis_timestamp: timestamp,
    }
}
