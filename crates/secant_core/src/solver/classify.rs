//! Empirical convergence order and oscillation diagnostics.

use super::result::{ConvergenceKind, IterationPoint};
use crate::types::ComplexNumber;

/// Golden ratio, the asymptotic order of the secant method.
pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Half-width of the band around [`GOLDEN_RATIO`] counted as quasi-quadratic.
const ORDER_BAND: f64 = 0.05;

/// Number of most recent ratios averaged.
const RATIO_WINDOW: usize = 5;

/// Trajectories up to this length are never flagged as oscillating.
const MIN_OSCILLATION_LEN: usize = 10;

/// Minimum share of direction reversals for a trajectory to oscillate.
const OSCILLATION_SHARE: f64 = 0.3;

/// Mean of the last few `|ln e_k / ln e_{k-1}|` ratios.
///
/// Only consecutive errors strictly inside `(0, 1)` contribute, where the
/// logarithm is negative and finite. Returns `None` without usable pairs.
pub fn order_ratio(errors: &[f64]) -> Option<f64> {
    let usable = |e: f64| e > 0.0 && e < 1.0;

    let ratios: Vec<f64> = errors
        .windows(2)
        .filter(|pair| usable(pair[0]) && usable(pair[1]))
        .map(|pair| (pair[1].ln() / pair[0].ln()).abs())
        .collect();

    if ratios.is_empty() {
        return None;
    }

    let recent = &ratios[ratios.len().saturating_sub(RATIO_WINDOW)..];
    Some(recent.iter().sum::<f64>() / recent.len() as f64)
}

/// Classifies a converged run from its error sequence.
///
/// Returns the kind together with the ratio it was derived from
/// (zero when no ratio could be formed).
pub fn classify_converged(errors: &[f64]) -> (ConvergenceKind, f64) {
    let Some(ratio) = order_ratio(errors) else {
        // Converged before the errors entered (0, 1) twice in a row.
        return (ConvergenceKind::Superlinear, 0.0);
    };

    let golden = GOLDEN_RATIO - ORDER_BAND..=GOLDEN_RATIO + ORDER_BAND;
    let kind = if golden.contains(&ratio) {
        ConvergenceKind::QuasiQuadratic
    } else if (0.9..=1.1).contains(&ratio) {
        ConvergenceKind::Linear
    } else if ratio > 1.1 && ratio < *golden.start() {
        ConvergenceKind::Superlinear
    } else {
        ConvergenceKind::SlowOrDivergent
    };

    (kind, ratio)
}

/// Counts direction reversals sharper than 120 degrees.
pub fn direction_reversals(points: &[IterationPoint]) -> usize {
    points
        .windows(3)
        .filter(|w| {
            let before = w[1].value - w[0].value;
            let after = w[2].value - w[1].value;
            is_reversal(before, after)
        })
        .count()
}

fn is_reversal(before: ComplexNumber, after: ComplexNumber) -> bool {
    let (a, b) = (before.abs(), after.abs());
    if a <= 1e-10 || b <= 1e-10 {
        return false;
    }
    let cos_angle = (before.re * after.re + before.im * after.im) / (a * b);
    cos_angle < -0.5
}

/// True when more than 30 % of a long trajectory's steps reverse direction.
pub fn is_oscillating(points: &[IterationPoint]) -> bool {
    if points.len() <= MIN_OSCILLATION_LEN {
        return false;
    }
    direction_reversals(points) as f64 > OSCILLATION_SHARE * points.len() as f64
}
