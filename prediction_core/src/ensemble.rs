//! Weighted ensemble aggregation.
//!
//! Reduces the per-model predictions for one player/prop pair into a single
//! ensemble statistic:
//! - Weighted average and weighted base confidence
//! - Median and mode (robust central tendencies)
//! - Population standard deviation and an agreement score derived from it
//! - A blended confidence that rewards model convergence, capped at 0.95
//!
//! Every function here is a pure, single-pass computation. Degenerate inputs
//! (empty slice, zero total weight, zero mean) resolve to defined zero
//! fallbacks rather than NaN.

use crate::models::{EnsembleResult, ModelPrediction};
use rustc_hash::FxHashMap;

/// Confidence ceiling. The ensemble never claims near-certainty regardless
/// of how strongly the models agree.
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Weighted mean of (value, weight) pairs. Returns 0.0 when the weights
/// sum to zero.
fn weighted_mean(pairs: impl Iterator<Item = (f64, f64)>) -> f64 {
    let (mut num, mut denom) = (0.0_f64, 0.0_f64);
    for (value, weight) in pairs {
        num += value * weight;
        denom += weight;
    }
    if denom > 0.0 {
        num / denom
    } else {
        0.0
    }
}

/// Median of the raw predictions: middle value for an odd count, mean of
/// the two middle values for an even count.
fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Mode of the predictions after rounding each to the nearest 0.5.
///
/// Frequency ties are broken by taking the smallest tied value, so the
/// result does not depend on hash-map iteration order.
fn mode(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    // Bucket on half-point keys scaled to integers so they hash exactly
    let mut counts: FxHashMap<i64, u32> = FxHashMap::default();
    for v in values {
        let rounded = (v * 2.0).round() as i64; // key in half-units
        *counts.entry(rounded).or_insert(0) += 1;
    }
    let mut best_key = i64::MAX;
    let mut best_count = 0u32;
    for (&key, &count) in &counts {
        if count > best_count || (count == best_count && key < best_key) {
            best_key = key;
            best_count = count;
        }
    }
    best_key as f64 / 2.0
}

/// Population standard deviation (N denominator) of the raw, unweighted
/// predictions. The model set is the full population, not a sample.
pub(crate) fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Agreement from the inverted coefficient of variation:
/// `1 - stddev/mean`, clamped to [0, 1]. Zero when the mean is not positive.
fn agreement_from_spread(std_dev: f64, mean: f64) -> f64 {
    if mean > 0.0 {
        (1.0 - std_dev / mean).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Blend the weighted base confidence with the agreement score.
///
/// Two terms: a multiplicative scaling (0.85 to 1.0 as agreement goes
/// 0 to 1) plus an additive boost that only kicks in above 0.5 agreement.
/// Convergent independent models earn more than their average confidence,
/// but never more than [`MAX_CONFIDENCE`].
fn blend_confidence(base_confidence: f64, agreement: f64) -> f64 {
    let boost = if agreement > 0.5 {
        0.06 + (agreement - 0.5) * 0.12
    } else {
        0.0
    };
    (base_confidence * (0.85 + agreement * 0.15) + boost).min(MAX_CONFIDENCE)
}

/// Aggregate one run of model predictions into an [`EnsembleResult`].
///
/// An empty run returns the all-zero result with confidence 0 instead of an
/// error; the caller always gets a usable, if low-confidence, output.
pub fn aggregate(predictions: &[ModelPrediction]) -> EnsembleResult {
    if predictions.is_empty() {
        return EnsembleResult::default();
    }

    let values: Vec<f64> = predictions.iter().map(|p| p.prediction).collect();

    let weighted_average = weighted_mean(predictions.iter().map(|p| (p.prediction, p.weight)));
    let median = median(&values);
    let mode = mode(&values);
    let standard_deviation = population_std_dev(&values);

    let unweighted_mean = values.iter().sum::<f64>() / values.len() as f64;
    let agreement = agreement_from_spread(standard_deviation, unweighted_mean);

    let base_confidence = weighted_mean(predictions.iter().map(|p| (p.confidence, p.weight)));
    let confidence = blend_confidence(base_confidence, agreement);

    EnsembleResult {
        weighted_average,
        median,
        mode,
        standard_deviation,
        agreement,
        confidence,
    }
}

/// Aggregate many independent runs in parallel.
///
/// Each run is pure and shares no state with the others, so this is a
/// straight data-parallel map over player/prop pairs.
pub fn batch_aggregate(runs: &[Vec<ModelPrediction>]) -> Vec<EnsembleResult> {
    use rayon::prelude::*;
    runs.par_iter().map(|run| aggregate(run)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelCategory;

    fn make_prediction(name: &str, prediction: f64, confidence: f64, weight: f64) -> ModelPrediction {
        ModelPrediction::new(
            name,
            ModelCategory::Statistical,
            prediction,
            confidence,
            weight,
            "test",
        )
    }

    /// Worked example: three models on a 24.5 points line.
    #[test]
    fn test_three_model_aggregate() {
        let predictions = vec![
            make_prediction("season_average", 25.0, 0.8, 0.5),
            make_prediction("matchup_adjusted", 27.0, 0.6, 0.3),
            make_prediction("recent_form", 24.0, 0.7, 0.2),
        ];
        let result = aggregate(&predictions);

        assert!((result.weighted_average - 25.4).abs() < 1e-9);
        assert_eq!(result.median, 25.0);
        // All rounded values distinct, frequency tie broken by smallest
        assert_eq!(result.mode, 24.0);
        assert!((result.standard_deviation - 1.2472191).abs() < 1e-6);
        assert!((result.agreement - 0.9507676).abs() < 1e-6);
        // base 0.72, scaled by agreement, plus the high-agreement boost
        assert!((result.confidence - 0.828775).abs() < 1e-6);
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let result = aggregate(&[]);
        assert_eq!(result.weighted_average, 0.0);
        assert_eq!(result.median, 0.0);
        assert_eq!(result.mode, 0.0);
        assert_eq!(result.standard_deviation, 0.0);
        assert_eq!(result.agreement, 0.0);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_zero_total_weight_does_not_divide() {
        let predictions = vec![
            make_prediction("a", 20.0, 0.8, 0.0),
            make_prediction("b", 22.0, 0.6, 0.0),
        ];
        let result = aggregate(&predictions);
        assert_eq!(result.weighted_average, 0.0);
        // Median/stddev still defined from the raw values
        assert_eq!(result.median, 21.0);
        assert!(result.standard_deviation > 0.0);
        assert!(result.confidence.is_finite());
    }

    #[test]
    fn test_identical_predictions_agree_fully() {
        let predictions = vec![
            make_prediction("a", 18.5, 0.7, 0.4),
            make_prediction("b", 18.5, 0.7, 0.3),
            make_prediction("c", 18.5, 0.7, 0.3),
        ];
        let result = aggregate(&predictions);
        assert_eq!(result.standard_deviation, 0.0);
        assert_eq!(result.agreement, 1.0);
        assert_eq!(result.mode, 18.5);
        // base 0.7 * 1.0 + boost 0.12 = 0.82
        assert!((result.confidence - 0.82).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_ceiling() {
        let predictions = vec![
            make_prediction("a", 30.0, 1.0, 0.5),
            make_prediction("b", 30.0, 1.0, 0.5),
        ];
        let result = aggregate(&predictions);
        assert_eq!(result.confidence, MAX_CONFIDENCE);
    }

    #[test]
    fn test_even_count_median() {
        let predictions = vec![
            make_prediction("a", 10.0, 0.5, 1.0),
            make_prediction("b", 14.0, 0.5, 1.0),
            make_prediction("c", 12.0, 0.5, 1.0),
            make_prediction("d", 16.0, 0.5, 1.0),
        ];
        let result = aggregate(&predictions);
        assert_eq!(result.median, 13.0);
    }

    #[test]
    fn test_mode_counts_half_point_buckets() {
        // 22.4 and 22.6 both round to 22.5
        let predictions = vec![
            make_prediction("a", 22.4, 0.5, 1.0),
            make_prediction("b", 22.6, 0.5, 1.0),
            make_prediction("c", 25.0, 0.5, 1.0),
        ];
        let result = aggregate(&predictions);
        assert_eq!(result.mode, 22.5);
    }

    #[test]
    fn test_mode_tie_takes_smallest() {
        let predictions = vec![
            make_prediction("a", 20.0, 0.5, 1.0),
            make_prediction("b", 20.0, 0.5, 1.0),
            make_prediction("c", 26.0, 0.5, 1.0),
            make_prediction("d", 26.0, 0.5, 1.0),
        ];
        let result = aggregate(&predictions);
        assert_eq!(result.mode, 20.0);
    }

    #[test]
    fn test_agreement_zero_when_mean_not_positive() {
        let predictions = vec![
            make_prediction("a", -3.0, 0.5, 1.0),
            make_prediction("b", 3.0, 0.5, 1.0),
        ];
        let result = aggregate(&predictions);
        assert_eq!(result.agreement, 0.0);
    }

    #[test]
    fn test_bounds_hold_for_scattered_inputs() {
        let predictions = vec![
            make_prediction("a", 5.0, 0.9, 0.1),
            make_prediction("b", 45.0, 0.2, 2.0),
            make_prediction("c", 12.5, 0.55, 0.7),
        ];
        let result = aggregate(&predictions);
        assert!((0.0..=1.0).contains(&result.agreement));
        assert!((0.0..=MAX_CONFIDENCE).contains(&result.confidence));
    }

    #[test]
    fn test_batch_matches_serial() {
        let run_a = vec![
            make_prediction("a", 25.0, 0.8, 0.5),
            make_prediction("b", 27.0, 0.6, 0.5),
        ];
        let run_b = vec![make_prediction("a", 8.5, 0.7, 1.0)];
        let runs = vec![run_a.clone(), run_b.clone(), vec![]];

        let batched = batch_aggregate(&runs);
        assert_eq!(batched.len(), 3);
        assert_eq!(batched[0].weighted_average, aggregate(&run_a).weighted_average);
        assert_eq!(batched[1].weighted_average, aggregate(&run_b).weighted_average);
        assert_eq!(batched[2].confidence, 0.0);
    }
}
