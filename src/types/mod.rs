//! Type definitions for the screening service

pub mod analysis;
pub mod assessment;
pub mod label;

pub use analysis::{ConfidenceTier, DecisionAnalysis, RankedPrediction};
pub use assessment::BiomarkerAssessment;
pub use label::ImpairmentLevel;
