//! Run outcome types.

use serde::{Deserialize, Serialize};

use super::SolverConfig;
use crate::types::{ComplexNumber, EvalFailure};

/// Lifecycle of a single run.
///
/// A run starts in `Running` and ends in exactly one terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Iterating.
    Running,
    /// `|f(z)| <= tolerance` reached.
    Converged,
    /// Iteration budget used up.
    MaxIterExhausted,
    /// The recurrence produced a non-finite point.
    DegenerateAborted,
    /// The function could not be evaluated at a visited point.
    Error,
}

impl RunState {
    /// True for every state except `Running`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunState::Running)
    }
}

/// Empirical convergence classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceKind {
    /// Error-reduction order close to 1.
    Linear,
    /// Order between 1.1 and the golden ratio.
    Superlinear,
    /// Order at or above the golden ratio, the secant method's asymptotic rate.
    QuasiQuadratic,
    /// Did not converge, or converged slower than linearly.
    SlowOrDivergent,
    /// Terminated by an evaluation failure.
    Error,
}

impl ConvergenceKind {
    /// Canonical `snake_case` name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConvergenceKind::Linear => "linear",
            ConvergenceKind::Superlinear => "superlinear",
            ConvergenceKind::QuasiQuadratic => "quasi_quadratic",
            ConvergenceKind::SlowOrDivergent => "slow_or_divergent",
            ConvergenceKind::Error => "error",
        }
    }
}

impl std::fmt::Display for ConvergenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A visited point with its errors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationPoint {
    /// Location.
    pub value: ComplexNumber,
    /// `|f(value)|`.
    pub abs_error: f64,
    /// Step size relative to `|value|`; zero for the first seed.
    pub rel_error: f64,
}

/// Outcome of one secant run.
///
/// Built once when the run reaches a terminal state and never mutated
/// afterwards. Invariants:
///
/// - `trajectory.len() == iterations + 1`
/// - `iterations <= config.max_iterations`
/// - `converged` implies `final_abs_error <= config.tolerance`
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// Converged point, or the best visited point otherwise.
    pub root: ComplexNumber,
    /// True when the tolerance was met.
    pub converged: bool,
    /// Steps taken, the second seed and recovery points included.
    pub iterations: usize,
    /// `|f|` at the last trajectory point.
    pub final_abs_error: f64,
    /// Relative step at the last trajectory point.
    pub final_rel_error: f64,
    /// Number of times the cycle guard fired.
    pub cycles_detected: usize,
    /// Empirical convergence classification.
    pub convergence_kind: ConvergenceKind,
    /// Every visited point, seeds first.
    pub trajectory: Vec<IterationPoint>,
    /// Configuration the run was bound to.
    pub config: SolverConfig,
    /// Terminal state.
    pub termination: RunState,
    /// Mean log-error ratio over the most recent steps (0 when undetermined).
    pub convergence_ratio: f64,
    /// Direction reversals dominate the trajectory.
    pub oscillating: bool,
    /// Evaluation failure that ended the run, if any.
    pub failure: Option<EvalFailure>,
}

impl RunResult {
    /// Absolute errors along the trajectory.
    pub fn abs_errors(&self) -> Vec<f64> {
        self.trajectory.iter().map(|p| p.abs_error).collect()
    }

    /// Relative errors along the trajectory.
    pub fn rel_errors(&self) -> Vec<f64> {
        self.trajectory.iter().map(|p| p.rel_error).collect()
    }

    /// Visited points in order.
    pub fn points(&self) -> Vec<ComplexNumber> {
        self.trajectory.iter().map(|p| p.value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!RunState::Running.is_terminal());
        assert!(RunState::Converged.is_terminal());
        assert!(RunState::Error.is_terminal());
    }

    #[test]
    fn test_kind_serialises_snake_case() {
        let json = serde_json::to_string(&ConvergenceKind::QuasiQuadratic).unwrap();
        assert_eq!(json, "\"quasi_quadratic\"");
        let json = serde_json::to_string(&RunState::MaxIterExhausted).unwrap();
        assert_eq!(json, "\"max_iter_exhausted\"");
    }

    #[test]
    fn test_kind_display_matches_serde() {
        for kind in [
            ConvergenceKind::Linear,
            ConvergenceKind::Superlinear,
            ConvergenceKind::QuasiQuadratic,
            ConvergenceKind::SlowOrDivergent,
            ConvergenceKind::Error,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json.trim_matches('"'), kind.to_string());
        }
    }
}
