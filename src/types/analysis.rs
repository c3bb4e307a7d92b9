//! Decision analysis data structures

use crate::types::label::ImpairmentLevel;
use serde::{Deserialize, Serialize};

/// Qualitative decision-confidence tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    VeryHigh,
    High,
    Moderate,
    Low,
    Uncertain,
}

impl ConfidenceTier {
    /// Classify confidence from the top normalized probability and the
    /// margin between the top two ranks. Rules apply in order, first
    /// match wins.
    pub fn classify(top_probability: f64, margin_first_second: f64) -> Self {
        if top_probability >= 0.85 {
            ConfidenceTier::VeryHigh
        } else if top_probability >= 0.70 && margin_first_second >= 0.20 {
            ConfidenceTier::High
        } else if top_probability >= 0.55 && margin_first_second >= 0.15 {
            ConfidenceTier::Moderate
        } else if top_probability >= 0.40 && margin_first_second >= 0.10 {
            ConfidenceTier::Low
        } else {
            ConfidenceTier::Uncertain
        }
    }

    /// Fixed clinical-significance statement for the tier.
    pub fn clinical_significance(&self) -> &'static str {
        match self {
            ConfidenceTier::VeryHigh => {
                "Model output strongly supports a single diagnostic class"
            }
            ConfidenceTier::High => {
                "Primary class is clearly separated from the alternatives"
            }
            ConfidenceTier::Moderate => {
                "Primary class is likely but alternatives cannot be excluded"
            }
            ConfidenceTier::Low => "Weak separation between candidate classes",
            ConfidenceTier::Uncertain => {
                "Model output does not support a reliable determination"
            }
        }
    }

    /// Human-readable tier name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::VeryHigh => "Very High",
            ConfidenceTier::High => "High",
            ConfidenceTier::Moderate => "Moderate",
            ConfidenceTier::Low => "Low",
            ConfidenceTier::Uncertain => "Uncertain",
        }
    }
}

/// A single class prediction after normalization and ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedPrediction {
    /// Diagnostic class label
    pub label: ImpairmentLevel,

    /// Normalized probability (softmax output, sums to 1 across ranks)
    pub probability: f64,

    /// Display percentage, e.g. "64.1%"
    pub percentage: String,

    /// Rank position, 1 = highest probability
    pub rank: usize,
}

impl RankedPrediction {
    pub fn new(label: ImpairmentLevel, probability: f64, rank: usize) -> Self {
        Self {
            label,
            probability,
            percentage: format!("{:.1}%", probability * 100.0),
            rank,
        }
    }
}

/// Full decision analysis derived from one raw score vector.
///
/// Constructed per prediction and serialized into the response; never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionAnalysis {
    /// Top-ranked prediction
    pub primary: RankedPrediction,

    /// Second-ranked prediction
    pub secondary: RankedPrediction,

    /// All predictions in rank order
    pub ranking: Vec<RankedPrediction>,

    /// Qualitative confidence tier
    pub confidence_tier: ConfidenceTier,

    /// Rationale interpolating the top two classes and their percentages
    pub rationale: String,

    /// Fixed clinical-significance statement for the tier
    pub clinical_significance: String,

    /// P(rank 1) - P(rank 2)
    pub margin_first_second: f64,

    /// P(rank 2) - P(rank 3)
    pub margin_second_third: f64,

    /// Clinical recommendations keyed off the primary class
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(ConfidenceTier::classify(0.90, 0.5), ConfidenceTier::VeryHigh);
        assert_eq!(ConfidenceTier::classify(0.85, 0.0), ConfidenceTier::VeryHigh);
        assert_eq!(ConfidenceTier::classify(0.75, 0.25), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::classify(0.60, 0.18), ConfidenceTier::Moderate);
        assert_eq!(ConfidenceTier::classify(0.45, 0.12), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::classify(0.30, 0.05), ConfidenceTier::Uncertain);
    }

    #[test]
    fn test_tier_first_match_wins() {
        // High top probability with a thin margin is still Very High
        assert_eq!(ConfidenceTier::classify(0.86, 0.01), ConfidenceTier::VeryHigh);
        // Strong margin cannot rescue a weak top probability
        assert_eq!(ConfidenceTier::classify(0.39, 0.30), ConfidenceTier::Uncertain);
        // p1 qualifies for High but the margin does not; falls through
        // past Moderate to the Low rule
        assert_eq!(ConfidenceTier::classify(0.72, 0.10), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::classify(0.72, 0.05), ConfidenceTier::Uncertain);
    }

    #[test]
    fn test_ranked_prediction_percentage() {
        let p = RankedPrediction::new(ImpairmentLevel::MildImpairment, 0.641, 1);
        assert_eq!(p.percentage, "64.1%");
        assert_eq!(p.rank, 1);
    }

    #[test]
    fn test_analysis_serialization() {
        let primary = RankedPrediction::new(ImpairmentLevel::MildImpairment, 0.7, 1);
        let secondary = RankedPrediction::new(ImpairmentLevel::VeryMildImpairment, 0.2, 2);
        let analysis = DecisionAnalysis {
            primary: primary.clone(),
            secondary: secondary.clone(),
            ranking: vec![primary, secondary],
            confidence_tier: ConfidenceTier::High,
            rationale: "test".to_string(),
            clinical_significance: ConfidenceTier::High.clinical_significance().to_string(),
            margin_first_second: 0.5,
            margin_second_third: 0.1,
            recommendations: vec!["test".to_string()],
        };

        let json = serde_json::to_string(&analysis).unwrap();
        let deserialized: DecisionAnalysis = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.confidence_tier, ConfidenceTier::High);
        assert_eq!(deserialized.primary.label, ImpairmentLevel::MildImpairment);
        assert_eq!(deserialized.ranking.len(), 2);
    }
}
