//! Condition assignment from fingerprint and texture complexity

use super::Fingerprint;

pub const NORMAL: &str = "Normal";

/// Base of the "Normal" complexity cut-off; the fingerprint adds 0..50
const NORMAL_COMPLEXITY_BASE: f64 = 250.0;

pub const MIN_CONFIDENCE: f64 = 0.01;
pub const MAX_CONFIDENCE: f64 = 0.999;

/// Primary condition and its confidence
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub condition: &'static str,
    /// Unclamped value; ensemble jitter and the report summary start from it
    pub raw_confidence: f64,
}

impl Assessment {
    /// Confidence reported to callers, within `[0.01, 0.999]`
    pub fn confidence(&self) -> f64 {
        self.raw_confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
    }

    pub fn is_normal(&self) -> bool {
        self.condition == NORMAL
    }
}

/// Pure function of its inputs
///
/// Low complexity reads as "Normal". Otherwise the condition is picked from
/// `vocabulary[1..]`, so "Normal" is never chosen by index.
pub fn assess(fingerprint: &Fingerprint, complexity: f64, vocabulary: &'static [&'static str]) -> Assessment {
    let wiggle = fingerprint.rem(100);
    let cutoff = NORMAL_COMPLEXITY_BASE + (wiggle % 50) as f64;

    if complexity < cutoff || vocabulary.len() < 2 {
        return Assessment {
            condition: NORMAL,
            raw_confidence: 0.92 + fingerprint.rem(75) as f64 / 1000.0,
        };
    }

    let pathologies = (vocabulary.len() - 1) as u64;
    let index = (complexity.floor() as u64 + fingerprint.rem(7)) % pathologies;

    Assessment {
        condition: vocabulary[index as usize + 1],
        raw_confidence: 0.82 + fingerprint.rem(170) as f64 / 1000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::modality::{BONE_CONDITIONS, BRAIN_CONDITIONS, CHEST_CONDITIONS};

    fn fp(value: u64) -> Fingerprint {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Fingerprint::from_digest(bytes)
    }

    #[test]
    fn test_low_complexity_is_normal() {
        // wiggle = 42 -> cutoff 250 + 42 = 292
        let assessment = assess(&fp(42), 291.9, CHEST_CONDITIONS);
        assert_eq!(assessment.condition, "Normal");
        // 42 % 75 = 42
        assert!((assessment.raw_confidence - 0.962).abs() < 1e-12);
    }

    #[test]
    fn test_cutoff_is_exclusive() {
        let assessment = assess(&fp(42), 292.0, CHEST_CONDITIONS);
        assert_ne!(assessment.condition, "Normal");
    }

    #[test]
    fn test_pathology_index_skips_normal() {
        // fingerprint 1000: wiggle 0 -> cutoff 250; 1000 % 7 = 6
        // index = (700 + 6) % 4 = 2 -> BRAIN_CONDITIONS[3]
        let assessment = assess(&fp(1000), 700.4, BRAIN_CONDITIONS);
        assert_eq!(assessment.condition, "Hemorrhage");
        // 1000 % 170 = 150
        assert!((assessment.raw_confidence - 0.97).abs() < 1e-12);
    }

    #[test]
    fn test_condition_always_in_vocabulary() {
        for value in 0..500u64 {
            for complexity in [0.0, 260.0, 333.3, 601.0, 1999.9] {
                let assessment = assess(&fp(value * 7919), complexity, BONE_CONDITIONS);
                assert!(BONE_CONDITIONS.contains(&assessment.condition));
                assert!(assessment.confidence() >= MIN_CONFIDENCE);
                assert!(assessment.confidence() <= MAX_CONFIDENCE);
            }
        }
    }

    #[test]
    fn test_assess_is_pure() {
        let fingerprint = Fingerprint::of(b"same bytes");
        assert_eq!(
            assess(&fingerprint, 512.0, CHEST_CONDITIONS),
            assess(&fingerprint, 512.0, CHEST_CONDITIONS)
        );
    }
}
