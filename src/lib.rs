//! CDR Screening Service Library
//!
//! Loads the exported Alzheimer's screening classifiers (MRI and
//! biomarker), runs ONNX inference, and synthesizes a clinical decision
//! analysis from the raw class scores.

pub mod config;
pub mod decision;
pub mod error;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use decision::DecisionSynthesizer;
pub use feature_extractor::FeatureExtractor;
pub use metrics::ServiceMetrics;
pub use models::inference::InferenceEngine;
pub use types::{BiomarkerAssessment, ConfidenceTier, DecisionAnalysis, ImpairmentLevel};
