//! Deterministic scan analysis pipeline
//!
//! bytes -> [`ImageSample`] / [`FeatureVector`] -> [`Modality`] ->
//! [`pathology::Assessment`] -> ensemble breakdown -> report.
//!
//! Every stage is a pure function of the input bytes; the only outside
//! inputs are the knowledge record and the report timestamp, both supplied
//! by the caller.

pub mod ensemble;
pub mod features;
pub mod fingerprint;
pub mod modality;
pub mod pathology;
pub mod report;

pub use ensemble::EnsembleMemberResult;
pub use features::{FeatureVector, ImageSample};
pub use fingerprint::Fingerprint;
pub use modality::Modality;
pub use report::DiagnosisReport;

use chrono::{DateTime, Local};
use pathology::Assessment;
use pulsar_common::db::history::flatten_findings;
use pulsar_common::db::{KnowledgeRecord, NewDiagnosis};
use serde::Serialize;
use thiserror::Error;

/// Modality reported when the upload could not be analyzed
pub const UNKNOWN_MODALITY: &str = "Unknown";
/// Condition reported when the upload could not be analyzed
pub const ANALYSIS_ERROR: &str = "Analysis Error";

/// Failure to turn bytes into pixels
///
/// Contained by [`Prediction::degraded`]; never surfaced as an HTTP error.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Unable to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Output of the classification stages, before knowledge lookup
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub fingerprint: Fingerprint,
    pub features: FeatureVector,
    pub modality: Modality,
    pub assessment: Assessment,
    pub ensemble: Vec<EnsembleMemberResult>,
}

/// Run the CPU-bound stages on raw upload bytes
///
/// `roster` names the ensemble members, in order.
pub fn analyze(bytes: &[u8], roster: &[&str]) -> Result<Analysis, AnalysisError> {
    let sample = ImageSample::decode(bytes)?;
    let features = FeatureVector::extract(&sample.intensities);
    let modality = Modality::detect(&features);
    let vocabulary = modality.vocabulary();
    let assessment = pathology::assess(&sample.fingerprint, features.complexity, vocabulary);
    let ensemble = ensemble::synthesize(&sample.fingerprint, &assessment, vocabulary, roster);

    Ok(Analysis {
        fingerprint: sample.fingerprint,
        features,
        modality,
        assessment,
        ensemble,
    })
}

impl Analysis {
    pub fn condition(&self) -> &'static str {
        self.assessment.condition
    }
}

/// Minimal report returned when analysis failed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureNotice {
    pub finding: String,
    pub severity: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Complete(DiagnosisReport),
    Failed(FailureNotice),
}

/// Response body of `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub modality: String,
    pub condition: String,
    pub confidence: f64,
    pub report: Report,
    pub ensemble_breakdown: Vec<EnsembleMemberResult>,
}

impl Prediction {
    /// Compose the final result; `knowledge` may be absent
    pub fn from_analysis(
        analysis: &Analysis,
        knowledge: Option<&KnowledgeRecord>,
        generated_at: DateTime<Local>,
    ) -> Self {
        let input = report::ReportInput {
            modality: analysis.modality,
            fingerprint: &analysis.fingerprint,
            features: &analysis.features,
            assessment: &analysis.assessment,
        };

        Self {
            modality: analysis.modality.to_string(),
            condition: analysis.condition().to_string(),
            confidence: analysis.assessment.confidence(),
            report: Report::Complete(report::compose(&input, knowledge, generated_at)),
            ensemble_breakdown: analysis.ensemble.clone(),
        }
    }

    /// Well-formed result for an upload that could not be analyzed
    pub fn degraded() -> Self {
        Self {
            modality: UNKNOWN_MODALITY.to_string(),
            condition: ANALYSIS_ERROR.to_string(),
            confidence: 0.0,
            report: Report::Failed(FailureNotice {
                finding: "Analysis failed to complete.".to_string(),
                severity: "Error".to_string(),
                recommendation: "Check system logs.".to_string(),
            }),
            ensemble_breakdown: Vec::new(),
        }
    }

    #[cfg(test)]
    fn is_degraded(&self) -> bool {
        matches!(self.report, Report::Failed(_))
    }

    /// History row for this prediction
    pub fn to_history_entry<'a>(&'a self, filename: Option<&'a str>) -> NewDiagnosis<'a> {
        let (diagnostic_issue, observations, severity, recommendation) = match &self.report {
            Report::Complete(report) => (
                report.impression.as_str(),
                flatten_findings(&report.clinical_findings),
                report.severity.as_str(),
                report.recommendation.as_str(),
            ),
            Report::Failed(notice) => (
                "",
                String::new(),
                notice.severity.as_str(),
                notice.recommendation.as_str(),
            ),
        };

        NewDiagnosis {
            modality: &self.modality,
            condition: &self.condition,
            confidence: self.confidence,
            diagnostic_issue,
            observations,
            severity,
            recommendation,
            filename,
        }
    }
}
