//! Single-session facade over the solver.
//!
//! An [`Engine`] holds at most one bound configuration. Configuring starts a
//! fresh session: run history, statistics and the root registry are cleared.
//!
//! ```
//! use secant_core::engine::Engine;
//! use secant_core::solver::SolverConfig;
//! use secant_core::types::ComplexNumber;
//!
//! let mut engine = Engine::new();
//! engine.configure(SolverConfig::new("z**2 + 1")).unwrap();
//!
//! let execution = engine
//!     .execute(ComplexNumber::new(0.5, 0.5), ComplexNumber::new(0.0, 2.0))
//!     .unwrap();
//! assert!(execution.result.converged);
//!
//! let report = engine.report(&execution.run_id).unwrap();
//! assert_eq!(report.trajectory_length, execution.result.trajectory.len());
//! ```

use std::collections::HashMap;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::{self, Example};
use crate::report::{
    ConfigAck, DetailedReport, ExecutionReport, RootView, RunView, SearchView, SensitivityView,
};
use crate::search::{search_region, FoundRoot, RegionSpec, RootSet, SearchOptions};
use crate::sensitivity::{analyse, SensitivityOptions};
use crate::solver::{RunResult, Solver, SolverConfig};
use crate::types::{ComplexNumber, EngineError};

/// Merge radius of the session root registry.
pub const SESSION_MIN_DISTANCE: f64 = 0.01;

/// Aggregate counters for the current session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatistics {
    /// Executions since the last configure
    pub total_runs: usize,
    /// Executions that converged
    pub converged_runs: usize,
    /// Mean solver wall-clock time per execution
    pub mean_run_seconds: f64,
    /// Distinct roots found by executions
    pub roots: Vec<RootView>,
}

#[derive(Debug, Clone)]
struct HistoryEntry {
    result: RunResult,
    elapsed_seconds: f64,
}

/// Session state around a bound [`Solver`].
#[derive(Debug, Default)]
pub struct Engine {
    solver: Option<Solver>,
    history: HashMap<String, HistoryEntry>,
    registry: Option<RootSet>,
    converged_runs: usize,
    total_seconds: f64,
}

impl Engine {
    /// An unconfigured engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and binds `config`, starting a new session.
    ///
    /// # Errors
    ///
    /// [`EngineError::Config`] when validation or compilation fails. The
    /// previous session is kept in that case.
    pub fn configure(&mut self, config: SolverConfig) -> Result<ConfigAck, EngineError> {
        let solver = Solver::configure(config)?;
        let ack = ConfigAck::from(solver.config());
        info!(
            expression = %ack.function_expression,
            strategy = %ack.cycle_strategy,
            tolerance = ack.tolerance,
            max_iterations = ack.max_iterations,
            "solver configured"
        );

        self.solver = Some(solver);
        self.history.clear();
        self.registry = Some(RootSet::new(SESSION_MIN_DISTANCE));
        self.converged_runs = 0;
        self.total_seconds = 0.0;
        Ok(ack)
    }

    /// The bound solver.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotConfigured`] before the first successful configure.
    pub fn solver(&self) -> Result<&Solver, EngineError> {
        self.solver.as_ref().ok_or(EngineError::NotConfigured)
    }

    /// Runs the solver from `(z0, z1)` and records the run.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotConfigured`] or [`EngineError::InvalidSeed`] for
    /// non-finite seeds. A run that fails to converge is not an error.
    pub fn execute(
        &mut self,
        z0: ComplexNumber,
        z1: ComplexNumber,
    ) -> Result<ExecutionReport, EngineError> {
        let solver = self.solver()?;
        for (name, seed) in [("z0", z0), ("z1", z1)] {
            if !seed.is_finite() {
                return Err(EngineError::InvalidSeed(format!("{name} = {seed} is not finite")));
            }
        }

        let start = Instant::now();
        let result = solver.run(z0, z1);
        let elapsed_seconds = start.elapsed().as_secs_f64();

        let run_id = Uuid::new_v4().to_string();
        info!(
            run_id = %run_id,
            converged = result.converged,
            iterations = result.iterations,
            cycles = result.cycles_detected,
            kind = %result.convergence_kind,
            elapsed_s = elapsed_seconds,
            "run complete"
        );

        if result.converged {
            self.converged_runs += 1;
            if let Some(registry) = self.registry.as_mut() {
                let is_new = registry.insert(FoundRoot::new(
                    result.root,
                    result.final_abs_error,
                    result.iterations,
                    result.cycles_detected,
                ));
                if is_new {
                    debug!(root = %result.root, "new root registered");
                }
            }
        }
        self.total_seconds += elapsed_seconds;

        let report = ExecutionReport {
            run_id: run_id.clone(),
            result: RunView::from(&result),
            elapsed_seconds,
        };
        self.history.insert(
            run_id,
            HistoryEntry {
                result,
                elapsed_seconds,
            },
        );
        Ok(report)
    }

    /// Searches `region` for distinct roots.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotConfigured`], or [`EngineError::Config`] for an
    /// invalid region or merge radius.
    pub fn search(
        &self,
        region: &RegionSpec,
        options: &SearchOptions,
    ) -> Result<SearchView, EngineError> {
        let outcome = search_region(self.solver()?, region, options)?;
        Ok(SearchView::from(&outcome))
    }

    /// Perturbation analysis around `root`.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotConfigured`], [`EngineError::NoPriorRun`] unless an
    /// execution in this session converged, or [`EngineError::Config`] for
    /// invalid options.
    pub fn analyse_sensitivity(
        &self,
        root: ComplexNumber,
        options: &SensitivityOptions,
    ) -> Result<SensitivityView, EngineError> {
        let solver = self.solver()?;
        if self.converged_runs == 0 {
            return Err(EngineError::NoPriorRun);
        }
        if !root.is_finite() {
            return Err(EngineError::InvalidSeed(format!("root = {root} is not finite")));
        }
        let report = analyse(solver, root, options)?;
        Ok(SensitivityView::from(&report))
    }

    /// The raw result of a recorded run.
    pub fn run(&self, run_id: &str) -> Option<&RunResult> {
        self.history.get(run_id).map(|entry| &entry.result)
    }

    /// Detailed report for a recorded run.
    ///
    /// # Errors
    ///
    /// [`EngineError::RunNotFound`] for an id not recorded in this session.
    pub fn report(&self, run_id: &str) -> Result<DetailedReport, EngineError> {
        let entry = self
            .history
            .get(run_id)
            .ok_or_else(|| EngineError::RunNotFound(run_id.to_string()))?;
        debug!(run_id, elapsed_s = entry.elapsed_seconds, "building report");
        Ok(DetailedReport::new(run_id, &entry.result))
    }

    /// Session counters and the root registry.
    pub fn statistics(&self) -> SessionStatistics {
        let total_runs = self.history.len();
        SessionStatistics {
            total_runs,
            converged_runs: self.converged_runs,
            mean_run_seconds: if total_runs == 0 {
                0.0
            } else {
                self.total_seconds / total_runs as f64
            },
            roots: self
                .registry
                .iter()
                .flat_map(RootSet::iter)
                .map(RootView::from)
                .collect(),
        }
    }

    /// The static example catalogue.
    pub fn examples(&self) -> Vec<Example> {
        catalog::examples()
    }
}
