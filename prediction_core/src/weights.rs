//! Model weight configuration and performance-driven adjustment.
//!
//! The baseline weights are a static configuration object handed to each
//! ensemble run. The adjuster periodically rebuilds that mapping from
//! recent real-world accuracy so persistently poor predictors lose
//! influence without manual retuning. Adjustment is bounded to +/-20% per
//! pass and fails open: any repository problem returns the baseline
//! untouched so the prediction pipeline keeps running.

use crate::models::ModelPerformance;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Lookback window for performance queries, in days.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;

/// Bounds on the per-model performance ratio. A single bad day of data
/// cannot zero out or double a model's influence.
const MIN_PERFORMANCE_RATIO: f64 = 0.80;
const MAX_PERFORMANCE_RATIO: f64 = 1.20;

#[derive(Debug, thiserror::Error)]
pub enum WeightConfigError {
    #[error("weight for model '{model}' is negative ({weight})")]
    NegativeWeight { model: String, weight: f64 },
    #[error("weight for model '{model}' is not finite")]
    NonFiniteWeight { model: String },
}

/// Immutable mapping from model name to relative weight.
///
/// A config is built once (static baseline) or produced wholesale by
/// [`adjust_weights`]; it is never mutated in place, so concurrent ensemble
/// runs can share a snapshot freely.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WeightConfig {
    weights: HashMap<String, f64>,
}

impl WeightConfig {
    /// Build a config, rejecting negative or non-finite weights.
    pub fn new(weights: HashMap<String, f64>) -> Result<Self, WeightConfigError> {
        for (model, &weight) in &weights {
            if !weight.is_finite() {
                return Err(WeightConfigError::NonFiniteWeight {
                    model: model.clone(),
                });
            }
            if weight < 0.0 {
                return Err(WeightConfigError::NegativeWeight {
                    model: model.clone(),
                    weight,
                });
            }
        }
        Ok(Self { weights })
    }

    pub fn get(&self, model_name: &str) -> Option<f64> {
        self.weights.get(model_name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(name, &w)| (name.as_str(), w))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Copy of this config rescaled so the weights sum to 1.0. Returns the
    /// config unchanged when the total is zero.
    pub fn normalized(&self) -> Self {
        let total = self.total();
        if total <= 0.0 {
            return self.clone();
        }
        Self {
            weights: self
                .weights
                .iter()
                .map(|(name, &w)| (name.clone(), w / total))
                .collect(),
        }
    }
}

/// Storage seam for historical model accuracy.
///
/// The core has no opinion about where performance rows live; tests use an
/// in-memory fake and production wires in the Postgres implementation from
/// [`crate::db`].
#[async_trait]
pub trait PerformanceRepository: Send + Sync {
    /// All performance records dated at or after `since`.
    async fn fetch_performance_since(&self, since: DateTime<Utc>)
        -> Result<Vec<ModelPerformance>>;
}

/// Reweight models by their recent accuracy.
///
/// Each model with observed data gets its baseline weight scaled by
/// `model_accuracy / overall_mean_accuracy`, clamped to [0.80, 1.20];
/// models without data keep their baseline weight. The result is
/// renormalized to sum to 1.0.
///
/// Fail-open: repository errors, an empty window, and degenerate all-zero
/// accuracy all return the baseline unchanged.
pub async fn adjust_weights(
    repo: &dyn PerformanceRepository,
    baseline: &WeightConfig,
    lookback_days: Option<i64>,
) -> WeightConfig {
    let lookback = lookback_days.unwrap_or(DEFAULT_LOOKBACK_DAYS);
    let since = Utc::now() - Duration::days(lookback);

    let records = match repo.fetch_performance_since(since).await {
        Ok(records) => records,
        Err(e) => {
            warn!("Weight adjustment skipped, performance fetch failed: {e:#}");
            return baseline.clone();
        }
    };

    if records.is_empty() {
        debug!("No performance records in the last {lookback} days, keeping baseline weights");
        return baseline.clone();
    }

    // Mean accuracy per model over the window
    let mut sums: HashMap<String, (f64, u32)> = HashMap::new();
    for record in &records {
        let entry = sums.entry(record.model_name.clone()).or_insert((0.0, 0));
        entry.0 += record.accuracy;
        entry.1 += 1;
    }
    let model_accuracy: HashMap<String, f64> = sums
        .into_iter()
        .map(|(name, (sum, count))| (name, sum / count as f64))
        .collect();

    let overall_mean =
        model_accuracy.values().sum::<f64>() / model_accuracy.len() as f64;
    if overall_mean <= 0.0 {
        warn!("Overall mean accuracy is not positive, keeping baseline weights");
        return baseline.clone();
    }

    let adjusted: HashMap<String, f64> = baseline
        .iter()
        .map(|(name, weight)| {
            let weight = match model_accuracy.get(name) {
                Some(&accuracy) => {
                    let ratio = (accuracy / overall_mean)
                        .clamp(MIN_PERFORMANCE_RATIO, MAX_PERFORMANCE_RATIO);
                    weight * ratio
                }
                None => weight,
            };
            (name.to_string(), weight)
        })
        .collect();

    debug!(
        models_with_data = model_accuracy.len(),
        records = records.len(),
        "Adjusted model weights from {lookback}-day performance window"
    );

    WeightConfig { weights: adjusted }.normalized()
}
