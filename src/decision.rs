//! Decision synthesis from raw classifier scores.
//!
//! Takes the raw class-score vector emitted by a screening model, ranks
//! the diagnostic classes, and derives a qualitative confidence tier plus
//! clinical recommendations.

use crate::types::analysis::{ConfidenceTier, DecisionAnalysis, RankedPrediction};
use crate::types::label::ImpairmentLevel;
use thiserror::Error;

/// Margin between the top two ranks below which the result is treated as
/// ambiguous and uncertainty recommendations are appended.
const UNCERTAINTY_MARGIN: f64 = 0.20;

/// Probability cutoff that splits the "No Impairment" recommendation set.
const NO_IMPAIRMENT_CONFIDENT: f64 = 0.80;

/// Caller contract violations
#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("invalid input shape: {scores} scores but {labels} labels")]
    ShapeMismatch { scores: usize, labels: usize },

    #[error("invalid input shape: need at least 2 classes, got {0}")]
    TooFewClasses(usize),
}

/// Synthesizes a [`DecisionAnalysis`] from a raw score vector.
///
/// Stateless and deterministic; safe to share across request handlers.
pub struct DecisionSynthesizer;

impl DecisionSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Produce a decision analysis from raw scores and their class labels.
    ///
    /// `raw_scores` and `labels` must be parallel slices with at least two
    /// entries. Scores need not be normalized; a numerically stable
    /// softmax is applied first.
    pub fn synthesize(
        &self,
        raw_scores: &[f64],
        labels: &[ImpairmentLevel],
    ) -> Result<DecisionAnalysis, DecisionError> {
        if raw_scores.len() != labels.len() {
            return Err(DecisionError::ShapeMismatch {
                scores: raw_scores.len(),
                labels: labels.len(),
            });
        }
        if raw_scores.len() < 2 {
            return Err(DecisionError::TooFewClasses(raw_scores.len()));
        }

        let probabilities = softmax(raw_scores);

        // Stable sort keeps input order on ties
        let mut order: Vec<usize> = (0..probabilities.len()).collect();
        order.sort_by(|&a, &b| {
            probabilities[b]
                .partial_cmp(&probabilities[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let ranking: Vec<RankedPrediction> = order
            .iter()
            .enumerate()
            .map(|(rank, &idx)| RankedPrediction::new(labels[idx], probabilities[idx], rank + 1))
            .collect();

        let primary = ranking[0].clone();
        let secondary = ranking[1].clone();

        let margin_first_second = primary.probability - secondary.probability;
        let margin_second_third = if ranking.len() > 2 {
            secondary.probability - ranking[2].probability
        } else {
            secondary.probability
        };

        let tier = ConfidenceTier::classify(primary.probability, margin_first_second);

        let rationale = format!(
            "{} leads at {} over {} at {}, a separation of {:.1} points ({} confidence)",
            primary.label,
            primary.percentage,
            secondary.label,
            secondary.percentage,
            margin_first_second * 100.0,
            tier.as_str(),
        );

        let recommendations =
            build_recommendations(primary.label, primary.probability, margin_first_second);

        Ok(DecisionAnalysis {
            primary,
            secondary,
            ranking,
            confidence_tier: tier,
            rationale,
            clinical_significance: tier.clinical_significance().to_string(),
            margin_first_second,
            margin_second_third,
            recommendations,
        })
    }
}

impl Default for DecisionSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Numerically stable softmax: subtracts the maximum before exponentiating
/// so the sum cannot overflow, then normalizes to sum to 1.
pub fn softmax(raw: &[f64]) -> Vec<f64> {
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = raw.iter().map(|&v| (v - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.iter().map(|&e| e / sum).collect()
}

/// Base recommendation set for the primary class, plus uncertainty
/// follow-ups when the top two ranks are poorly separated.
fn build_recommendations(
    primary: ImpairmentLevel,
    primary_probability: f64,
    margin_first_second: f64,
) -> Vec<String> {
    let base: &[&str] = match primary {
        ImpairmentLevel::NoImpairment if primary_probability >= NO_IMPAIRMENT_CONFIDENT => &[
            "Continue current preventive measures",
            "Annual cognitive assessment",
            "Maintain regular physical and social activity",
        ],
        ImpairmentLevel::NoImpairment => &[
            "Maintain current healthy lifestyle",
            "Repeat cognitive screening in 12 months",
            "Monitor for subjective memory complaints",
        ],
        ImpairmentLevel::VeryMildImpairment => &[
            "Regular cognitive assessment recommended",
            "Comprehensive neuropsychological testing",
            "Review modifiable risk factors (diet, exercise, sleep)",
            "Consider follow-up scan in 6-12 months",
        ],
        ImpairmentLevel::MildImpairment => &[
            "Referral to memory clinic for full workup",
            "Consider follow-up scan in 6-12 months",
            "Assess daily-living support needs",
            "Discuss care planning with family",
        ],
        ImpairmentLevel::ModerateImpairment => &[
            "Urgent specialist referral recommended",
            "Evaluate treatment options with neurologist",
            "Assess home safety and caregiver support",
            "Review medication management",
        ],
    };

    let mut recommendations: Vec<String> = base.iter().map(|s| s.to_string()).collect();

    if margin_first_second < UNCERTAINTY_MARGIN {
        recommendations.push("Results are ambiguous; repeat imaging is advised".to_string());
        recommendations
            .push("Correlate with clinical examination and patient history".to_string());
        recommendations.push("Consider additional biomarker testing".to_string());
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    const MRI_LABELS: [ImpairmentLevel; 4] = [
        ImpairmentLevel::MildImpairment,
        ImpairmentLevel::ModerateImpairment,
        ImpairmentLevel::NoImpairment,
        ImpairmentLevel::VeryMildImpairment,
    ];

    #[test]
    fn test_softmax_sums_to_one() {
        for raw in [
            vec![2.0, 1.0, 0.1, 0.1],
            vec![0.0, 0.0, 0.0, 0.0],
            vec![-5.0, 3.0, 100.0, 0.5],
            vec![1000.0, 999.0, 998.0, 0.0],
        ] {
            let probs = softmax(&raw);
            let sum: f64 = probs.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "sum was {sum} for {raw:?}");
            assert!(probs.iter().all(|&p| p >= 0.0));
        }
    }

    #[test]
    fn test_softmax_large_inputs_do_not_overflow() {
        let probs = softmax(&[1e4, 1e4 - 1.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!(probs[0] > probs[1]);
    }

    #[test]
    fn test_ranks_are_permutation() {
        let synthesizer = DecisionSynthesizer::new();
        let analysis = synthesizer
            .synthesize(&[0.3, 2.5, 1.1, 0.7], &MRI_LABELS)
            .unwrap();

        let mut ranks: Vec<usize> = analysis.ranking.iter().map(|p| p.rank).collect();
        ranks.sort();
        assert_eq!(ranks, vec![1, 2, 3, 4]);

        let max = analysis
            .ranking
            .iter()
            .map(|p| p.probability)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(analysis.primary.probability, max);
        assert_eq!(analysis.primary.rank, 1);
    }

    #[test]
    fn test_highest_score_ranks_first() {
        let synthesizer = DecisionSynthesizer::new();
        let analysis = synthesizer
            .synthesize(&[2.0, 1.0, 0.1, 0.1], &MRI_LABELS)
            .unwrap();

        assert_eq!(analysis.primary.label, ImpairmentLevel::MildImpairment);
        assert_eq!(analysis.secondary.label, ImpairmentLevel::ModerateImpairment);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let synthesizer = DecisionSynthesizer::new();
        let analysis = synthesizer
            .synthesize(&[1.0, 1.0, 1.0, 1.0], &MRI_LABELS)
            .unwrap();

        let labels: Vec<ImpairmentLevel> = analysis.ranking.iter().map(|p| p.label).collect();
        assert_eq!(labels, MRI_LABELS.to_vec());
    }

    #[test]
    fn test_near_uniform_is_uncertain() {
        let synthesizer = DecisionSynthesizer::new();
        let analysis = synthesizer
            .synthesize(&[0.25, 0.26, 0.24, 0.25], &MRI_LABELS)
            .unwrap();

        assert_eq!(analysis.confidence_tier, ConfidenceTier::Uncertain);
    }

    #[test]
    fn test_dominant_score_is_very_high() {
        let synthesizer = DecisionSynthesizer::new();
        let analysis = synthesizer
            .synthesize(&[5.0, 0.0, 0.0, 0.0], &MRI_LABELS)
            .unwrap();

        assert_eq!(analysis.confidence_tier, ConfidenceTier::VeryHigh);
        // Rank-2 probability is near zero, so the margin is close to p1
        assert!(
            (analysis.margin_first_second - analysis.primary.probability).abs() < 0.01,
            "margin {} vs p1 {}",
            analysis.margin_first_second,
            analysis.primary.probability
        );
    }

    #[test]
    fn test_recommendations_never_empty() {
        let synthesizer = DecisionSynthesizer::new();
        let cases = [
            vec![5.0, 0.0, 0.0, 0.0],
            vec![0.0, 5.0, 0.0, 0.0],
            vec![0.0, 0.0, 5.0, 0.0],
            vec![0.0, 0.0, 0.0, 5.0],
            vec![0.25, 0.26, 0.24, 0.25],
            vec![-3.0, -3.0, -3.0, -3.0],
        ];
        for raw in cases {
            let analysis = synthesizer.synthesize(&raw, &MRI_LABELS).unwrap();
            assert!(!analysis.recommendations.is_empty(), "empty for {raw:?}");
        }
    }

    #[test]
    fn test_no_impairment_split_on_confidence() {
        // Confident "No Impairment" and a borderline one get different sets
        let confident = build_recommendations(ImpairmentLevel::NoImpairment, 0.92, 0.8);
        let borderline = build_recommendations(ImpairmentLevel::NoImpairment, 0.55, 0.3);
        assert_ne!(confident, borderline);
        assert!(confident.contains(&"Annual cognitive assessment".to_string()));
        assert!(borderline.contains(&"Repeat cognitive screening in 12 months".to_string()));
    }

    #[test]
    fn test_thin_margin_appends_uncertainty_followups() {
        let wide = build_recommendations(ImpairmentLevel::MildImpairment, 0.7, 0.5);
        let thin = build_recommendations(ImpairmentLevel::MildImpairment, 0.4, 0.05);
        assert_eq!(thin.len(), wide.len() + 3);
        assert!(thin
            .iter()
            .any(|r| r.contains("repeat imaging is advised")));
    }

    #[test]
    fn test_margins_match_ranking() {
        let synthesizer = DecisionSynthesizer::new();
        let analysis = synthesizer
            .synthesize(&[1.8, 1.2, 0.4, -0.6], &MRI_LABELS)
            .unwrap();

        let p: Vec<f64> = analysis.ranking.iter().map(|r| r.probability).collect();
        assert!((analysis.margin_first_second - (p[0] - p[1])).abs() < 1e-12);
        assert!((analysis.margin_second_third - (p[1] - p[2])).abs() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch_fails_fast() {
        let synthesizer = DecisionSynthesizer::new();
        let err = synthesizer
            .synthesize(&[1.0, 2.0, 3.0], &MRI_LABELS)
            .unwrap_err();
        assert!(matches!(err, DecisionError::ShapeMismatch { scores: 3, labels: 4 }));

        let err = synthesizer
            .synthesize(&[1.0], &MRI_LABELS[..1])
            .unwrap_err();
        assert!(matches!(err, DecisionError::TooFewClasses(1)));
    }

    #[test]
    fn test_deterministic() {
        let synthesizer = DecisionSynthesizer::new();
        let raw = [0.9, 1.4, -0.2, 0.3];
        let a = synthesizer.synthesize(&raw, &MRI_LABELS).unwrap();
        let b = synthesizer.synthesize(&raw, &MRI_LABELS).unwrap();
        assert_eq!(a.rationale, b.rationale);
        assert_eq!(a.recommendations, b.recommendations);
        assert_eq!(a.confidence_tier, b.confidence_tier);
    }
}
