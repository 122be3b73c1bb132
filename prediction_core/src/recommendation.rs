//! Betting recommendations and expected value.
//!
//! Turns an ensemble result plus a market line into a discrete
//! recommendation tier, and optionally compares the expected value of the
//! over and under sides at American odds using a normal model of the
//! outcome distribution.

use crate::models::{BetRecommendation, BetSide, EnsembleResult, ExpectedValue, PropRecommendation};

// ----------------------------------------------------------------------------
// Recommendation tiers
// ----------------------------------------------------------------------------

/// Grade a prop against the market line.
///
/// Tiers are checked strongest first; on the boundary the stronger tier
/// wins. A non-positive line produces an edge percentage of 0 rather than
/// dividing (sportsbooks do not post such lines, but bad data must not
/// produce infinities).
pub fn generate_recommendation(ensemble: &EnsembleResult, line: f64) -> PropRecommendation {
    let prediction = ensemble.weighted_average;
    let confidence = ensemble.confidence;

    let edge = prediction - line;
    let edge_percent = if line > 0.0 { edge / line * 100.0 } else { 0.0 };

    let abs_edge = edge.abs();
    let abs_pct = edge_percent.abs();

    let recommendation = if (abs_edge >= 3.0 && confidence >= 0.75)
        || (abs_pct >= 15.0 && confidence >= 0.75)
    {
        BetRecommendation::StrongBet
    } else if (abs_edge >= 2.0 && confidence >= 0.65) || (abs_pct >= 10.0 && confidence >= 0.65) {
        BetRecommendation::ModerateBet
    } else if (abs_edge >= 1.0 && confidence >= 0.55)
        || (abs_edge >= 0.5 && confidence >= 0.5)
        || (abs_pct >= 5.0 && confidence >= 0.5)
    {
        BetRecommendation::Lean
    } else {
        BetRecommendation::Pass
    };

    PropRecommendation {
        prediction,
        confidence,
        edge,
        edge_percent,
        recommendation,
    }
}

// ----------------------------------------------------------------------------
// Expected value
// ----------------------------------------------------------------------------

/// Abramowitz & Stegun 7.1.26 polynomial approximation of erf.
/// Absolute error under 1.5e-7, more than enough for EV grading.
fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();
    sign * y
}

/// Standard normal CDF built on the erf approximation above.
#[inline]
fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Convert American odds to decimal odds.
///
/// `+150 -> 2.5`, `-120 -> 1.8333`. Zero odds are degenerate and map to
/// decimal 1.0 (a bet that returns only its stake).
pub fn american_to_decimal(odds: f64) -> f64 {
    if odds > 0.0 {
        odds / 100.0 + 1.0
    } else if odds < 0.0 {
        100.0 / odds.abs() + 1.0
    } else {
        1.0
    }
}

/// Implied probability of decimal odds (no vig removal).
pub fn implied_probability(decimal_odds: f64) -> f64 {
    if decimal_odds > 0.0 {
        (1.0 / decimal_odds).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Expected value of the better side of an over/under at American odds.
///
/// Models the actual outcome as normal around `prediction` with the given
/// standard deviation; a non-positive deviation degrades to a coin flip
/// rather than a division by zero. The returned `prob_over` is always in
/// [0, 1] and P(under) is its complement.
pub fn calculate_expected_value(
    prediction: f64,
    line: f64,
    over_odds: f64,
    under_odds: f64,
    std_dev: f64,
) -> ExpectedValue {
    let prob_over = if std_dev > 0.0 {
        let z = (line - prediction) / std_dev;
        (1.0 - normal_cdf(z)).clamp(0.0, 1.0)
    } else {
        0.5
    };
    let prob_under = 1.0 - prob_over;

    let ev_over = prob_over * american_to_decimal(over_odds) - 1.0;
    let ev_under = prob_under * american_to_decimal(under_odds) - 1.0;

    if ev_over >= ev_under {
        ExpectedValue {
            ev: ev_over,
            side: BetSide::Over,
            prob_over,
        }
    } else {
        ExpectedValue {
            ev: ev_under,
            side: BetSide::Under,
            prob_over,
        }
    }
}
