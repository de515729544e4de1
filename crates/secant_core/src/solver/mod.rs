//! Secant root-finding with cycle detection and recovery.
//!
//! ## Components
//!
//! - [`SolverConfig`] / [`CycleStrategy`]: validated run configuration
//! - [`solve`]: the secant iterator, usable with any [`ComplexFunction`]
//! - [`Solver`]: a configuration bound to its compiled function, the unit
//!   shared by region search and sensitivity analysis
//! - [`RunResult`]: immutable outcome with trajectory and diagnostics
//!
//! ## Termination
//!
//! Each step checks, in order: tolerance reached, iteration budget
//! exhausted, degenerate denominator (cycle event or numerical Newton step),
//! evaluation failure. A non-finite next point aborts the run.
//!
//! ## Example
//!
//! ```
//! use secant_core::solver::{Solver, SolverConfig};
//! use secant_core::types::ComplexNumber;
//!
//! let solver = Solver::configure(SolverConfig::new("z**3 - 1")).unwrap();
//! let result = solver.run(ComplexNumber::new(0.5, 0.5), ComplexNumber::new(1.0, 0.0));
//!
//! assert!(result.converged);
//! assert!((result.root.abs() - 1.0).abs() < 1e-10);
//! ```

mod classify;
mod config;
mod cycle;
mod derivative;
mod result;
mod secant;

use std::sync::Arc;

pub use classify::{classify_converged, direction_reversals, is_oscillating, order_ratio, GOLDEN_RATIO};
pub use config::{CycleStrategy, SolverConfig};
pub use cycle::{perturbation_radius, spiral_point, CycleGuard, Recovery, GOLDEN_ANGLE, HISTORY_LEN};
pub use derivative::central_difference;
pub use result::{ConvergenceKind, IterationPoint, RunResult, RunState};
pub use secant::{solve, DENOMINATOR_FLOOR};

use crate::function::{CompiledFunction, ComplexFunction};
use crate::rng::SolverRng;
use crate::types::{ComplexNumber, ConfigError};

/// A validated configuration bound to its compiled function.
///
/// Cheap to clone; the compiled function is shared behind an `Arc` and is
/// safe to use from many threads at once.
#[derive(Debug, Clone)]
pub struct Solver {
    config: SolverConfig,
    function: Arc<CompiledFunction>,
}

impl Solver {
    /// Validates `config` and compiles its expression.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from validation or compilation. Nothing is
    /// iterated before these checks pass.
    pub fn configure(config: SolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let function = CompiledFunction::compile(&config.function_expression)?;
        Ok(Self {
            config,
            function: Arc::new(function),
        })
    }

    /// The bound configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// The compiled function.
    pub fn function(&self) -> &CompiledFunction {
        &self.function
    }

    /// Runs from `(z0, z1)` with a random source seeded from the configuration.
    pub fn run(&self, z0: ComplexNumber, z1: ComplexNumber) -> RunResult {
        let mut rng = SolverRng::from_seed(self.config.seed);
        self.run_with_rng(z0, z1, &mut rng)
    }

    /// Runs from `(z0, z1)` with an explicit random source.
    pub fn run_with_rng(
        &self,
        z0: ComplexNumber,
        z1: ComplexNumber,
        rng: &mut SolverRng,
    ) -> RunResult {
        solve(self.function.as_ref(), &self.config, z0, z1, rng)
    }

    /// Runs on an arbitrary function under this solver's configuration.
    pub fn run_on<F>(
        &self,
        f: &F,
        z0: ComplexNumber,
        z1: ComplexNumber,
        rng: &mut SolverRng,
    ) -> RunResult
    where
        F: ComplexFunction + ?Sized,
    {
        solve(f, &self.config, z0, z1, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_rejects_bad_tolerance() {
        let err = Solver::configure(SolverConfig::new("z").with_tolerance(-1.0)).unwrap_err();
        assert_eq!(err, ConfigError::InvalidTolerance(-1.0));
    }

    #[test]
    fn test_configure_rejects_zero_iterations() {
        let err = Solver::configure(SolverConfig::new("z").with_max_iterations(0)).unwrap_err();
        assert_eq!(err, ConfigError::InvalidMaxIterations);
    }

    #[test]
    fn test_configure_rejects_bad_expression() {
        let err = Solver::configure(SolverConfig::new("z +* 2")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidExpression { .. }));
    }

    #[test]
    fn test_run_is_reproducible() {
        let solver = Solver::configure(SolverConfig::new("sin(z) - z/2")).unwrap();
        let a = solver.run(ComplexNumber::new(1.0, 1.0), ComplexNumber::new(2.0, 0.5));
        let b = solver.run(ComplexNumber::new(1.0, 1.0), ComplexNumber::new(2.0, 0.5));
        assert_eq!(a, b);
        assert_eq!(a.config, *solver.config());
    }

    #[test]
    fn test_clones_share_function() {
        let solver = Solver::configure(SolverConfig::default()).unwrap();
        let clone = solver.clone();
        assert!(std::ptr::eq(solver.function(), clone.function()));
    }
}
