//! Simulated per-model breakdown
//!
//! Member `i` draws `(fingerprint >> 8i) mod 100`. Below 80 it agrees with
//! the primary assessment, otherwise it votes for an alternate label with
//! lower confidence.

use super::pathology::Assessment;
use super::Fingerprint;
use serde::Serialize;

pub const MEMBER_MIN_CONFIDENCE: f64 = 0.1;
pub const MEMBER_MAX_CONFIDENCE: f64 = 0.99;

/// Members whose draw is below this agree with the primary condition
const AGREEMENT_THRESHOLD: u64 = 80;

/// Confidence penalty for a dissenting member
const DISSENT_PENALTY: f64 = 0.12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnsembleMemberResult {
    pub model: String,
    pub prediction: String,
    pub confidence: f64,
}

/// One result per roster entry, in roster order
///
/// The dissenting label is drawn from the whole vocabulary, "Normal"
/// included, unlike the primary assignment.
pub fn synthesize(
    fingerprint: &Fingerprint,
    assessment: &Assessment,
    vocabulary: &[&str],
    roster: &[&str],
) -> Vec<EnsembleMemberResult> {
    roster
        .iter()
        .enumerate()
        .map(|(i, model)| {
            let draw = fingerprint.shr(8 * i as u32).rem(100);

            let (prediction, confidence) = if draw < AGREEMENT_THRESHOLD {
                let jitter = ((draw % 20) as f64 - 10.0) / 1000.0;
                (assessment.condition, assessment.raw_confidence + jitter)
            } else {
                let alternate = vocabulary[fingerprint.rem(vocabulary.len() as u64) as usize];
                (alternate, assessment.raw_confidence - DISSENT_PENALTY)
            };

            EnsembleMemberResult {
                model: (*model).to_string(),
                prediction: prediction.to_string(),
                confidence: confidence.clamp(MEMBER_MIN_CONFIDENCE, MEMBER_MAX_CONFIDENCE),
            }
        })
        .collect()
}
