// Shared models for the PropEdge prediction core
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Predictor Inputs
// ============================================================================

/// Family a predictor model belongs to.
///
/// Informational only: the ensemble arithmetic never branches on category,
/// but downstream consumers group model contributions by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelCategory {
    Statistical,
    Matchup,
    Contextual,
    PropSpecific,
    Ensemble,
}

/// A single model's point estimate for one player/prop pair.
///
/// Produced by the per-category predictor modules upstream. Immutable once
/// built; the aggregator reads slices of these and never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPrediction {
    /// Unique within one ensemble run
    pub model_name: String,
    pub category: ModelCategory,
    /// Point estimate of the target stat (points, rebounds, ...)
    pub prediction: f64,
    /// Model's self-reported confidence, 0.0 to 1.0
    pub confidence: f64,
    /// Relative importance in the ensemble. Not required to sum to 1
    /// across models; the aggregator normalizes.
    pub weight: f64,
    /// Human-readable explanation, no role in the arithmetic
    pub reasoning: String,
}

impl ModelPrediction {
    pub fn new(
        model_name: impl Into<String>,
        category: ModelCategory,
        prediction: f64,
        confidence: f64,
        weight: f64,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            category,
            prediction,
            confidence,
            weight,
            reasoning: reasoning.into(),
        }
    }
}

// ============================================================================
// Ensemble Output
// ============================================================================

/// Combined statistics over one ensemble run.
///
/// All fields are derived purely from the input predictions. An empty run
/// yields the all-zero result rather than an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnsembleResult {
    pub weighted_average: f64,
    pub median: f64,
    pub mode: f64,
    pub standard_deviation: f64,
    /// How tightly the models cluster, 0.0 to 1.0
    pub agreement: f64,
    /// Blended confidence, capped at 0.95 (the engine never claims
    /// near-certainty)
    pub confidence: f64,
}

// ============================================================================
// Agreement Diagnostics
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgreementLevel {
    #[serde(rename = "VERY HIGH")]
    VeryHigh,
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "MODERATE")]
    Moderate,
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "NONE")]
    None,
}

impl AgreementLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgreementLevel::VeryHigh => "VERY HIGH",
            AgreementLevel::High => "HIGH",
            AgreementLevel::Moderate => "MODERATE",
            AgreementLevel::Low => "LOW",
            AgreementLevel::None => "NONE",
        }
    }
}

impl std::fmt::Display for AgreementLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the standalone agreement scorer (diagnostic path, independent
/// of the full aggregator).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgreementReport {
    pub agreement: f64,
    pub level: AgreementLevel,
    pub confidence: f64,
}

// ============================================================================
// Recommendations & Expected Value
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetRecommendation {
    #[serde(rename = "STRONG BET")]
    StrongBet,
    #[serde(rename = "MODERATE BET")]
    ModerateBet,
    #[serde(rename = "LEAN")]
    Lean,
    #[serde(rename = "PASS")]
    Pass,
}

impl BetRecommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetRecommendation::StrongBet => "STRONG BET",
            BetRecommendation::ModerateBet => "MODERATE BET",
            BetRecommendation::Lean => "LEAN",
            BetRecommendation::Pass => "PASS",
        }
    }
}

impl std::fmt::Display for BetRecommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final output handed back to the caller for one prop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropRecommendation {
    pub prediction: f64,
    pub confidence: f64,
    /// Signed difference between prediction and the market line
    pub edge: f64,
    /// Edge as a percentage of the line (0 when the line is not positive)
    pub edge_percent: f64,
    pub recommendation: BetRecommendation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetSide {
    Over,
    Under,
}

/// Better of the over/under expected values for one prop at given odds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedValue {
    /// Probability-weighted net return per unit staked
    pub ev: f64,
    pub side: BetSide,
    /// Estimated probability the actual stat lands above the line
    pub prob_over: f64,
}

// ============================================================================
// Historical Model Performance
// ============================================================================

/// One historical accuracy reading for a model, owned by the performance
/// repository. Read-only input to weight adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPerformance {
    pub model_name: String,
    pub date: DateTime<Utc>,
    pub accuracy: f64,
}
