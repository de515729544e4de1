//! Serialisable views over engine results.
//!
//! Views own copies of what they show and never touch the values they were
//! built from. Non-finite floats become `null`.

use serde::{Deserialize, Serialize};

use crate::search::{FoundRoot, RegionSpec, SearchOutcome};
use crate::sensitivity::{LevelStatistics, SensitivityReport, SensitivityRun, StabilityClass};
use crate::solver::{ConvergenceKind, CycleStrategy, RunResult, RunState, SolverConfig};
use crate::types::ComplexNumber;

/// `Some(x)` for finite `x`, `None` otherwise.
#[inline]
pub fn finite(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}

/// A complex number as `{ "real": .., "imag": .. }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointView {
    /// Real part
    pub real: Option<f64>,
    /// Imaginary part
    pub imag: Option<f64>,
}

impl From<ComplexNumber> for PointView {
    fn from(z: ComplexNumber) -> Self {
        Self {
            real: finite(z.re),
            imag: finite(z.im),
        }
    }
}

/// Echo of a bound configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigAck {
    /// Compiled expression
    pub function_expression: String,
    /// Convergence tolerance
    pub tolerance: f64,
    /// Iteration budget
    pub max_iterations: usize,
    /// Cycle recovery strategy
    pub cycle_strategy: CycleStrategy,
    /// Newton fallback on degenerate steps
    pub use_numeric_derivative_fallback: bool,
    /// Random seed
    pub seed: u64,
}

impl From<&SolverConfig> for ConfigAck {
    fn from(config: &SolverConfig) -> Self {
        Self {
            function_expression: config.function_expression.clone(),
            tolerance: config.tolerance,
            max_iterations: config.max_iterations,
            cycle_strategy: config.cycle_strategy,
            use_numeric_derivative_fallback: config.use_numeric_derivative_fallback,
            seed: config.seed,
        }
    }
}

/// A run with its trajectory and parallel error arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunView {
    /// Converged or best point
    pub root: PointView,
    /// Tolerance met
    pub converged: bool,
    /// Steps taken
    pub iterations: usize,
    /// `|f|` at the last point
    pub final_abs_error: Option<f64>,
    /// Relative step at the last point
    pub final_rel_error: Option<f64>,
    /// Cycle guard activations
    pub cycles_detected: usize,
    /// Convergence classification
    pub convergence_kind: ConvergenceKind,
    /// Terminal state
    pub termination: RunState,
    /// Mean log-error ratio
    pub convergence_ratio: Option<f64>,
    /// Direction reversals dominate
    pub oscillating: bool,
    /// Evaluation failure message, if the run ended on one
    pub failure: Option<String>,
    /// Visited points
    pub trajectory: Vec<PointView>,
    /// `|f|` per visited point
    pub abs_errors: Vec<Option<f64>>,
    /// Relative step per visited point
    pub rel_errors: Vec<Option<f64>>,
    /// Configuration of the run
    pub config: ConfigAck,
}

impl From<&RunResult> for RunView {
    fn from(result: &RunResult) -> Self {
        Self {
            root: result.root.into(),
            converged: result.converged,
            iterations: result.iterations,
            final_abs_error: finite(result.final_abs_error),
            final_rel_error: finite(result.final_rel_error),
            cycles_detected: result.cycles_detected,
            convergence_kind: result.convergence_kind,
            termination: result.termination,
            convergence_ratio: finite(result.convergence_ratio),
            oscillating: result.oscillating,
            failure: result.failure.map(|f| f.to_string()),
            trajectory: result.trajectory.iter().map(|p| p.value.into()).collect(),
            abs_errors: result.trajectory.iter().map(|p| finite(p.abs_error)).collect(),
            rel_errors: result.trajectory.iter().map(|p| finite(p.rel_error)).collect(),
            config: (&result.config).into(),
        }
    }
}

/// A distinct root found by region search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootView {
    /// Real part
    pub real: Option<f64>,
    /// Imaginary part
    pub imag: Option<f64>,
    /// Best `|f|` among discoveries
    pub error: Option<f64>,
    /// Iterations of the representative run
    pub iterations: usize,
    /// Cycles of the representative run
    pub cycles: usize,
    /// Converged runs that landed here
    pub times_found: usize,
    /// `|root|`
    pub magnitude: Option<f64>,
}

impl From<&FoundRoot> for RootView {
    fn from(root: &FoundRoot) -> Self {
        Self {
            real: finite(root.value.re),
            imag: finite(root.value.im),
            error: finite(root.best_error),
            iterations: root.iterations,
            cycles: root.cycles,
            times_found: root.times_found,
            magnitude: finite(root.value.abs()),
        }
    }
}

/// Region search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchView {
    /// Distinct roots in key order
    pub roots: Vec<RootView>,
    /// Number of distinct roots
    pub total_roots: usize,
    /// Seed pairs run
    pub points_processed: usize,
    /// Runs that converged
    pub runs_converged: usize,
    /// Wall-clock seconds
    pub search_time_seconds: f64,
    /// Region searched
    pub region: RegionSpec,
    /// Merge radius
    pub min_distance: f64,
    /// Whether runs were fanned out
    pub parallel: bool,
}

impl From<&SearchOutcome> for SearchView {
    fn from(outcome: &SearchOutcome) -> Self {
        Self {
            roots: outcome.roots.iter().map(RootView::from).collect(),
            total_roots: outcome.total_roots,
            points_processed: outcome.points_processed,
            runs_converged: outcome.runs_converged,
            search_time_seconds: outcome.search_time_seconds,
            region: outcome.region,
            min_distance: outcome.options.min_distance,
            parallel: outcome.options.parallel,
        }
    }
}

/// One perturbed re-solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityRunView {
    /// Noise magnitude
    pub noise_level: f64,
    /// First seed of the re-solve
    pub perturbed_point: PointView,
    /// Recovered root
    pub displaced_root: PointView,
    /// Distance to the analysed root
    pub shift_magnitude: Option<f64>,
    /// Re-solve converged
    pub converged: bool,
}

impl From<&SensitivityRun> for SensitivityRunView {
    fn from(run: &SensitivityRun) -> Self {
        Self {
            noise_level: run.noise_level,
            perturbed_point: run.perturbed_point.into(),
            displaced_root: run.displaced_root.into(),
            shift_magnitude: finite(run.shift_magnitude),
            converged: run.converged,
        }
    }
}

/// Statistics for one noise level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelView {
    /// Noise magnitude
    pub noise_level: f64,
    /// Mean displacement
    pub mean_shift: Option<f64>,
    /// Population standard deviation
    pub std_shift: Option<f64>,
    /// Smallest displacement
    pub min_shift: Option<f64>,
    /// Largest displacement
    pub max_shift: Option<f64>,
    /// Converged samples
    pub converged: usize,
    /// Samples drawn
    pub samples: usize,
}

impl From<&LevelStatistics> for LevelView {
    fn from(level: &LevelStatistics) -> Self {
        Self {
            noise_level: level.noise_level,
            mean_shift: finite(level.mean_shift),
            std_shift: finite(level.std_shift),
            min_shift: finite(level.min_shift),
            max_shift: finite(level.max_shift),
            converged: level.converged,
            samples: level.samples,
        }
    }
}

/// Sensitivity analysis results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityView {
    /// Analysed root
    pub root: PointView,
    /// `|f(root)|`
    pub function_value: Option<f64>,
    /// Every re-solve
    pub runs: Vec<SensitivityRunView>,
    /// Per-level statistics
    pub levels: Vec<LevelView>,
    /// Condition-number estimate
    pub global_sensitivity: Option<f64>,
    /// Stability class
    pub stability: StabilityClass,
    /// Noise levels requested
    pub noise_levels: Vec<f64>,
    /// Samples per level requested
    pub samples_per_level: usize,
}

impl From<&SensitivityReport> for SensitivityView {
    fn from(report: &SensitivityReport) -> Self {
        Self {
            root: report.root.into(),
            function_value: report.function_value.and_then(finite),
            runs: report.runs.iter().map(SensitivityRunView::from).collect(),
            levels: report.levels.iter().map(LevelView::from).collect(),
            global_sensitivity: finite(report.global_sensitivity),
            stability: report.stability,
            noise_levels: report.options.noise_levels.clone(),
            samples_per_level: report.options.samples_per_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{Solver, SolverConfig};

    #[test]
    fn test_point_view_nulls_non_finite() {
        let view = PointView::from(ComplexNumber::new(f64::NAN, 2.0));
        assert_eq!(view.real, None);
        assert_eq!(view.imag, Some(2.0));
        let json = serde_json::to_value(view).unwrap();
        assert_eq!(json, serde_json::json!({ "real": null, "imag": 2.0 }));
    }

    #[test]
    fn test_run_view_parallel_arrays() {
        let solver = Solver::configure(SolverConfig::new("z**2 - 4")).unwrap();
        let result = solver.run(ComplexNumber::real(1.0), ComplexNumber::real(3.0));
        let before = result.clone();
        let view = RunView::from(&result);

        assert_eq!(result, before);
        assert_eq!(view.trajectory.len(), result.iterations + 1);
        assert_eq!(view.abs_errors.len(), view.trajectory.len());
        assert_eq!(view.rel_errors.len(), view.trajectory.len());
        assert_eq!(view.abs_errors[0], Some(3.0));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["convergence_kind"], serde_json::json!(result.convergence_kind.as_str()));
        assert_eq!(json["termination"], "converged");
        assert_eq!(json["config"]["cycle_strategy"], "hybrid_perturbation");
        assert_eq!(json["trajectory"][2]["real"], 1.75);
    }

    #[test]
    fn test_failed_run_view() {
        let solver = Solver::configure(SolverConfig::new("log(z)")).unwrap();
        let result = solver.run(ComplexNumber::ZERO, ComplexNumber::ONE);
        let json = serde_json::to_value(RunView::from(&result)).unwrap();
        assert_eq!(json["final_abs_error"], serde_json::Value::Null);
        assert_eq!(json["convergence_kind"], "error");
        assert!(json["failure"].as_str().unwrap().contains("log"));
    }

    #[test]
    fn test_root_view_magnitude() {
        let root = FoundRoot::new(ComplexNumber::new(3.0, 4.0), 1e-13, 6, 1);
        let view = RootView::from(&root);
        assert_eq!(view.magnitude, Some(5.0));
        assert_eq!(view.times_found, 1);
    }
}
