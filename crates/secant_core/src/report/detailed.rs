//! Detailed per-run report with recommendations.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::views::{finite, ConfigAck, RunView};
use crate::solver::{ConvergenceKind, RunResult};

/// Final error above which a precision note is emitted.
pub const PRECISION_NOTE_THRESHOLD: f64 = 1e-6;

/// Trajectory length above which an iteration-count note is emitted.
pub const LONG_TRAJECTORY: usize = 50;

/// Convergence analysis block of a detailed report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceAnalysis {
    /// Tolerance met
    pub converged: bool,
    /// Classification
    pub convergence_kind: ConvergenceKind,
    /// Mean log-error ratio
    pub convergence_ratio: Option<f64>,
    /// Direction reversals dominate
    pub oscillating: bool,
    /// Cycle guard activations
    pub cycles_detected: usize,
    /// Steps taken
    pub iterations: usize,
}

/// Report for one executed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedReport {
    /// Run identifier
    pub run_id: String,
    /// Generation time
    pub generated_at: DateTime<Utc>,
    /// Configuration the run was bound to
    pub config: ConfigAck,
    /// Convergence analysis
    pub analysis: ConvergenceAnalysis,
    /// Full run view
    pub result: RunView,
    /// Number of visited points
    pub trajectory_length: usize,
    /// Human-readable suggestions
    pub recommendations: Vec<String>,
}

impl DetailedReport {
    /// Builds a report stamped with the current time.
    pub fn new(run_id: impl Into<String>, result: &RunResult) -> Self {
        Self::at(run_id, result, Utc::now())
    }

    /// Builds a report stamped with `generated_at`.
    pub fn at(run_id: impl Into<String>, result: &RunResult, generated_at: DateTime<Utc>) -> Self {
        Self {
            run_id: run_id.into(),
            generated_at,
            config: (&result.config).into(),
            analysis: ConvergenceAnalysis {
                converged: result.converged,
                convergence_kind: result.convergence_kind,
                convergence_ratio: finite(result.convergence_ratio),
                oscillating: result.oscillating,
                cycles_detected: result.cycles_detected,
                iterations: result.iterations,
            },
            result: result.into(),
            trajectory_length: result.trajectory.len(),
            recommendations: recommendations(result),
        }
    }
}

/// Suggestions derived from a run's outcome, in a fixed order.
pub fn recommendations(result: &RunResult) -> Vec<String> {
    let mut notes = Vec::new();

    if !result.converged {
        notes.push(format!(
            "Increase max_iterations (currently {})",
            result.config.max_iterations
        ));
        notes.push(format!(
            "Try a different cycle strategy (currently {})",
            result.config.cycle_strategy
        ));
        notes.push("Try different initial seed points".to_string());
    } else if matches!(
        result.convergence_kind,
        ConvergenceKind::Linear | ConvergenceKind::SlowOrDivergent
    ) {
        notes.push(format!(
            "Convergence was {}; seeds closer to the root or the derivative fallback may help",
            result.convergence_kind
        ));
    }

    if result.final_abs_error.is_nan() || result.final_abs_error > PRECISION_NOTE_THRESHOLD {
        notes.push(format!(
            "Final error exceeds {PRECISION_NOTE_THRESHOLD:e}; precision may be insufficient"
        ));
    }

    if result.trajectory.len() > LONG_TRAJECTORY {
        notes.push(format!(
            "Trajectory has {} points; better seeds may shorten it",
            result.trajectory.len()
        ));
    }

    if result.oscillating {
        notes.push("Oscillation detected; consider the reset or hybrid strategy".to_string());
    }

    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{Solver, SolverConfig};
    use crate::types::ComplexNumber;

    fn run(expression: &str, max_iterations: usize, z0: f64, z1: f64) -> RunResult {
        let config = SolverConfig::new(expression).with_max_iterations(max_iterations);
        Solver::configure(config)
            .unwrap()
            .run(ComplexNumber::real(z0), ComplexNumber::real(z1))
    }

    #[test]
    fn test_clean_run_has_no_recommendations() {
        let mut result = run("z**2 - 4", 200, 1.0, 3.0);
        assert!(result.converged);
        result.convergence_kind = ConvergenceKind::QuasiQuadratic;
        assert!(recommendations(&result).is_empty());
    }

    #[test]
    fn test_fast_but_off_order_run_gets_convergence_note() {
        let mut result = run("z**2 - 4", 200, 1.0, 3.0);
        result.convergence_kind = ConvergenceKind::SlowOrDivergent;
        let notes = recommendations(&result);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].starts_with("Convergence was slow_or_divergent"));
    }

    #[test]
    fn test_non_converged_recommendations() {
        let result = run("exp(z)", 3, 0.0, 1.0);
        assert!(!result.converged);
        let notes = recommendations(&result);
        assert!(notes[0].contains("max_iterations"));
        assert!(notes[1].contains("hybrid_perturbation"));
        assert!(notes[2].contains("seed"));
        assert!(notes.iter().any(|n| n.contains("precision")));
    }

    #[test]
    fn test_report_fields() {
        let result = run("z**2 - 4", 200, 1.0, 3.0);
        let stamp = DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let report = DetailedReport::at("run-1", &result, stamp);
        assert_eq!(report.run_id, "run-1");
        assert_eq!(report.trajectory_length, result.iterations + 1);
        assert_eq!(report.analysis.iterations, result.iterations);
        assert_eq!(report.config.tolerance, 1e-12);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["generated_at"], "2024-01-02T03:04:05Z");
        assert_eq!(json["analysis"]["converged"], true);
    }
}
