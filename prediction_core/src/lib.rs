//! PropEdge Core - prediction ensemble engine and betting recommendations.
//!
//! This crate provides:
//! - Weighted ensemble aggregation of per-model prop predictions
//! - A standalone model agreement scorer for diagnostic confidence
//! - Performance-driven dynamic weight adjustment with a storage seam
//! - Recommendation tiering and over/under expected value at American odds
//! - Batch processing over independent props via rayon
//!
//! The engine is a pure library: it consumes predictions produced by the
//! per-category predictor services and a market line from the odds feed,
//! and is wired into an HTTP handler elsewhere. Every computation degrades
//! to a defined low-confidence result instead of erroring; the only I/O is
//! the weight adjuster's repository read, which fails open to the baseline
//! weights.

mod models;

pub mod agreement;
pub mod db;
pub mod ensemble;
pub mod recommendation;
pub mod weights;

pub use models::*;

pub use agreement::{score_agreement, DEFAULT_DISAGREEMENT_SPREAD};
pub use ensemble::{aggregate, batch_aggregate, MAX_CONFIDENCE};
pub use recommendation::{
    american_to_decimal, calculate_expected_value, generate_recommendation, implied_probability,
};
pub use weights::{
    adjust_weights, PerformanceRepository, WeightConfig, WeightConfigError, DEFAULT_LOOKBACK_DAYS,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn slate() -> Vec<ModelPrediction> {
        vec![
            ModelPrediction::new(
                "season_average",
                ModelCategory::Statistical,
                25.0,
                0.8,
                0.5,
                "25.0 ppg over the full season",
            ),
            ModelPrediction::new(
                "matchup_adjusted",
                ModelCategory::Matchup,
                27.0,
                0.6,
                0.3,
                "opponent ranks 28th defending the position",
            ),
            ModelPrediction::new(
                "recent_form",
                ModelCategory::Contextual,
                24.0,
                0.7,
                0.2,
                "24.0 ppg over the last 10 games",
            ),
        ]
    }

    #[test]
    fn test_full_pipeline_for_one_prop() {
        let result = aggregate(&slate());
        let rec = generate_recommendation(&result, 24.5);

        assert!((rec.prediction - 25.4).abs() < 1e-9);
        assert!((rec.edge - 0.9).abs() < 1e-9);
        assert_eq!(rec.recommendation, BetRecommendation::Lean);

        let ev = calculate_expected_value(
            rec.prediction,
            24.5,
            -110.0,
            -110.0,
            result.standard_deviation,
        );
        assert!(ev.prob_over > 0.5, "prediction above the line");
        assert_eq!(ev.side, BetSide::Over);

        let report = score_agreement(&slate(), None);
        assert_eq!(report.level, AgreementLevel::Low);
    }
}
