//! Feature extraction for biomarker model inference.
//!
//! Flattens a biomarker assessment into the feature vector the tabular
//! classifier was trained on. Order must match the cleaned training
//! columns exactly.

use crate::types::assessment::BiomarkerAssessment;

/// Number of features the biomarker model expects.
pub const BIOMARKER_FEATURE_COUNT: usize = 8;

/// Feature extractor that transforms assessments into model input features.
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Create a new feature extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract features from an assessment.
    ///
    /// Returns an 8-element vector in the training column order:
    /// M/F, Age, EDUC, SES, MMSE, eTIV, nWBV, ASF.
    pub fn extract(&self, assessment: &BiomarkerAssessment) -> Vec<f32> {
        vec![
            assessment.sex as f32,
            assessment.age as f32,
            assessment.education_years as f32,
            assessment.ses as f32,
            assessment.mmse as f32,
            assessment.etiv as f32,
            assessment.nwbv as f32,
            assessment.asf as f32,
        ]
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        BIOMARKER_FEATURE_COUNT
    }

    /// Get feature names (matching training column order).
    pub fn feature_names(&self) -> Vec<&'static str> {
        vec!["M/F", "Age", "EDUC", "SES", "MMSE", "eTIV", "nWBV", "ASF"]
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_extraction() {
        let extractor = FeatureExtractor::new();
        let assessment = BiomarkerAssessment::new("pat_001".to_string(), 72, 28.0);

        let features = extractor.extract(&assessment);

        assert_eq!(features.len(), extractor.feature_count());
        assert_eq!(features[1], 72.0); // age
        assert_eq!(features[4], 28.0); // mmse
    }

    #[test]
    fn test_feature_count() {
        let extractor = FeatureExtractor::new();
        assert_eq!(extractor.feature_count(), BIOMARKER_FEATURE_COUNT);
        assert_eq!(extractor.feature_names().len(), BIOMARKER_FEATURE_COUNT);
    }
}
