//! Standalone model agreement scoring.
//!
//! A lighter diagnostic than the full aggregator: it looks only at how
//! tightly the raw predictions cluster relative to a fixed spread threshold,
//! with no weighting involved. Used for secondary confidence estimates and
//! for surfacing "the models disagree" to callers without running the full
//! ensemble pipeline.

use crate::ensemble::population_std_dev;
use crate::models::{AgreementLevel, AgreementReport, ModelPrediction};

/// Spread (in the target stat's units) that counts as total disagreement.
/// Two points apart on a points prop is a real split; the same gap on a
/// 30-point average barely registers in the aggregator, which is why this
/// scorer uses an absolute threshold instead.
pub const DEFAULT_DISAGREEMENT_SPREAD: f64 = 2.0;

fn level_for(agreement: f64) -> AgreementLevel {
    if agreement > 0.85 {
        AgreementLevel::VeryHigh
    } else if agreement > 0.70 {
        AgreementLevel::High
    } else if agreement > 0.50 {
        AgreementLevel::Moderate
    } else if agreement > 0.30 {
        AgreementLevel::Low
    } else {
        AgreementLevel::None
    }
}

/// Score how well the models agree, independent of their weights.
///
/// `threshold` overrides [`DEFAULT_DISAGREEMENT_SPREAD`]. Empty input maps
/// to zero agreement at level NONE with zero confidence.
pub fn score_agreement(predictions: &[ModelPrediction], threshold: Option<f64>) -> AgreementReport {
    if predictions.is_empty() {
        return AgreementReport {
            agreement: 0.0,
            level: AgreementLevel::None,
            confidence: 0.0,
        };
    }

    let threshold = threshold.unwrap_or(DEFAULT_DISAGREEMENT_SPREAD);
    let values: Vec<f64> = predictions.iter().map(|p| p.prediction).collect();
    let std_dev = population_std_dev(&values);

    let agreement = (1.0 - std_dev / threshold).clamp(0.0, 1.0);
    let confidence = (0.5 + agreement * 0.5).min(0.95);

    AgreementReport {
        agreement,
        level: level_for(agreement),
        confidence,
    }
}
