//! Modality detection from pixel statistics

use super::FeatureVector;
use serde::{Serialize, Serializer};
use std::fmt;

/// Strictly below this mean intensity the scan is treated as a brain MRI
pub const BRAIN_MAX_BRIGHTNESS: f64 = 85.0;
/// Strictly above this texture complexity the scan is treated as a bone X-ray
pub const BONE_MIN_COMPLEXITY: f64 = 600.0;
/// Strictly above this entropy the scan is treated as a chest X-ray
pub const CHEST_MIN_ENTROPY: f64 = 0.005;

pub const CHEST_CONDITIONS: &[&str] = &[
    "Normal",
    "Pneumonia",
    "Cardiomegaly",
    "Effusion",
    "Infiltration",
    "Mass",
    "Nodule",
    "Pneumothorax",
];

pub const BRAIN_CONDITIONS: &[&str] = &["Normal", "Tumor", "Stroke", "Hemorrhage", "Aneurysm"];

pub const BONE_CONDITIONS: &[&str] = &[
    "Normal",
    "Fracture",
    "Dislocation",
    "Fissure",
    "Fragmentation",
    "Displacement",
    "Stress Fracture",
];

/// Imaging category; selects the condition vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modality {
    BrainMri,
    BoneXray,
    ChestXray,
    /// Balanced brightness, low texture and low entropy
    CtScan,
}

impl Modality {
    /// Threshold cascade, first match wins; a value equal to a threshold
    /// falls through to the next check
    pub fn detect(features: &FeatureVector) -> Self {
        if features.brightness < BRAIN_MAX_BRIGHTNESS {
            Modality::BrainMri
        } else if features.complexity > BONE_MIN_COMPLEXITY {
            Modality::BoneXray
        } else if features.entropy > CHEST_MIN_ENTROPY {
            Modality::ChestXray
        } else {
            Modality::CtScan
        }
    }

    /// Ordered condition labels; index 0 is always "Normal"
    ///
    /// CT reuses the bone vocabulary.
    pub fn vocabulary(self) -> &'static [&'static str] {
        match self {
            Modality::BrainMri => BRAIN_CONDITIONS,
            Modality::BoneXray | Modality::CtScan => BONE_CONDITIONS,
            Modality::ChestXray => CHEST_CONDITIONS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Modality::BrainMri => "Brain MRI",
            Modality::BoneXray => "Bone X-ray",
            Modality::ChestXray => "Chest X-ray",
            Modality::CtScan => "CT Scan",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Modality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
