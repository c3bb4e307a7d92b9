//! Diagnostic class labels

use serde::{Deserialize, Serialize};
use std::fmt;

/// Clinical Dementia Rating class emitted by the screening models.
///
/// The variants map to CDR scores 0, 0.5, 1 and 2 as encoded during
/// training. Display strings match the class labels used by the original
/// training pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImpairmentLevel {
    #[serde(rename = "No Impairment")]
    NoImpairment,
    #[serde(rename = "Very Mild Impairment")]
    VeryMildImpairment,
    #[serde(rename = "Mild Impairment")]
    MildImpairment,
    #[serde(rename = "Moderate Impairment")]
    ModerateImpairment,
}

impl ImpairmentLevel {
    /// All levels in CDR severity order.
    pub const ALL: [ImpairmentLevel; 4] = [
        ImpairmentLevel::NoImpairment,
        ImpairmentLevel::VeryMildImpairment,
        ImpairmentLevel::MildImpairment,
        ImpairmentLevel::ModerateImpairment,
    ];

    /// Display label as used in model class lists and API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpairmentLevel::NoImpairment => "No Impairment",
            ImpairmentLevel::VeryMildImpairment => "Very Mild Impairment",
            ImpairmentLevel::MildImpairment => "Mild Impairment",
            ImpairmentLevel::ModerateImpairment => "Moderate Impairment",
        }
    }

    /// CDR class index (0 = none, 3 = moderate).
    pub fn cdr_index(&self) -> usize {
        match self {
            ImpairmentLevel::NoImpairment => 0,
            ImpairmentLevel::VeryMildImpairment => 1,
            ImpairmentLevel::MildImpairment => 2,
            ImpairmentLevel::ModerateImpairment => 3,
        }
    }
}

impl fmt::Display for ImpairmentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
