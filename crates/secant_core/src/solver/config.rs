//! Solver configuration types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::ConfigError;

/// Recovery applied when the cycle guard fires.
///
/// # Example
///
/// ```
/// use secant_core::solver::CycleStrategy;
///
/// let strategy: CycleStrategy = "reset".parse().unwrap();
/// assert_eq!(strategy, CycleStrategy::Reset);
/// assert_eq!(CycleStrategy::default().to_string(), "hybrid_perturbation");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStrategy {
    /// Random kick scaled to the current error.
    Perturbation,
    /// Deterministic reseed of the partner point.
    Reset,
    /// Alternates perturbation and reset.
    Hybrid,
    /// Perturbs, escalating to reset on a quick relapse.
    #[default]
    HybridPerturbation,
    /// Perturbation whose radius grows as the iteration budget runs out.
    Adaptive,
}

impl CycleStrategy {
    /// All strategies, in declaration order.
    pub const ALL: [CycleStrategy; 5] = [
        CycleStrategy::Perturbation,
        CycleStrategy::Reset,
        CycleStrategy::Hybrid,
        CycleStrategy::HybridPerturbation,
        CycleStrategy::Adaptive,
    ];

    /// Canonical `snake_case` name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleStrategy::Perturbation => "perturbation",
            CycleStrategy::Reset => "reset",
            CycleStrategy::Hybrid => "hybrid",
            CycleStrategy::HybridPerturbation => "hybrid_perturbation",
            CycleStrategy::Adaptive => "adaptive",
        }
    }
}

impl FromStr for CycleStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "perturbation" | "perturb" => Ok(CycleStrategy::Perturbation),
            "reset" => Ok(CycleStrategy::Reset),
            "hybrid" => Ok(CycleStrategy::Hybrid),
            "hybrid_perturbation" => Ok(CycleStrategy::HybridPerturbation),
            "adaptive" => Ok(CycleStrategy::Adaptive),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for CycleStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a secant run.
///
/// Validated once by [`Solver::configure`](super::Solver::configure) and
/// immutable afterwards. Every [`RunResult`](super::RunResult) carries a
/// clone of the configuration that produced it.
///
/// # Example
///
/// ```
/// use secant_core::solver::{CycleStrategy, SolverConfig};
///
/// let config = SolverConfig::new("z**3 - 1");
/// assert_eq!(config.tolerance, 1e-12);
/// assert_eq!(config.max_iterations, 200);
/// assert_eq!(config.cycle_strategy, CycleStrategy::HybridPerturbation);
/// assert!(config.validate().is_ok());
///
/// let bad = SolverConfig { tolerance: 0.0, ..config };
/// assert!(bad.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Expression in `z`, compiled against the whitelist.
    pub function_expression: String,

    /// The run converges once `|f(z)| <= tolerance`.
    pub tolerance: f64,

    /// Upper bound on iterations, recovery steps included.
    pub max_iterations: usize,

    /// Recovery applied on each detected cycle.
    pub cycle_strategy: CycleStrategy,

    /// Replace a degenerate secant step with a numerical Newton step.
    pub use_numeric_derivative_fallback: bool,

    /// Seed of the random source used by perturbation strategies.
    pub seed: u64,
}

impl Default for SolverConfig {
    /// Default values:
    /// - `function_expression`: `z**2 - 4`
    /// - `tolerance`: 1e-12
    /// - `max_iterations`: 200
    /// - `cycle_strategy`: hybrid perturbation
    /// - `use_numeric_derivative_fallback`: false
    /// - `seed`: 42
    fn default() -> Self {
        Self {
            function_expression: "z**2 - 4".to_string(),
            tolerance: 1e-12,
            max_iterations: 200,
            cycle_strategy: CycleStrategy::default(),
            use_numeric_derivative_fallback: false,
            seed: 42,
        }
    }
}

impl SolverConfig {
    /// Default configuration for `expression`.
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            function_expression: expression.into(),
            ..Self::default()
        }
    }

    /// Sets the tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the iteration limit.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the cycle strategy.
    pub fn with_strategy(mut self, strategy: CycleStrategy) -> Self {
        self.cycle_strategy = strategy;
        self
    }

    /// Enables or disables the numerical derivative fallback.
    pub fn with_derivative_fallback(mut self, enabled: bool) -> Self {
        self.use_numeric_derivative_fallback = enabled;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Checks the numeric parameters. The expression is checked when it is
    /// compiled.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidTolerance`] unless `tolerance` is finite and `> 0`
    /// - [`ConfigError::InvalidMaxIterations`] when `max_iterations == 0`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::InvalidMaxIterations);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SolverConfig::default();
        assert!((config.tolerance - 1e-12).abs() < 1e-20);
        assert_eq!(config.max_iterations, 200);
        assert!(!config.use_numeric_derivative_fallback);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_tolerance() {
        for tolerance in [0.0, -1e-8, f64::NAN, f64::INFINITY] {
            let config = SolverConfig::default().with_tolerance(tolerance);
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidTolerance(_))
            ));
        }
    }

    #[test]
    fn test_rejects_zero_iterations() {
        let config = SolverConfig::default().with_max_iterations(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidMaxIterations));
    }

    #[test]
    fn test_strategy_round_trip_names() {
        for strategy in CycleStrategy::ALL {
            assert_eq!(strategy.as_str().parse::<CycleStrategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_strategy_aliases() {
        assert_eq!(
            "perturb".parse::<CycleStrategy>().unwrap(),
            CycleStrategy::Perturbation
        );
        assert_eq!(
            "Hybrid-Perturbation".parse::<CycleStrategy>().unwrap(),
            CycleStrategy::HybridPerturbation
        );
        assert!(matches!(
            "bisection".parse::<CycleStrategy>(),
            Err(ConfigError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn test_builder() {
        let config = SolverConfig::new("sin(z)")
            .with_tolerance(1e-8)
            .with_max_iterations(50)
            .with_strategy(CycleStrategy::Reset)
            .with_derivative_fallback(true)
            .with_seed(7);
        assert_eq!(config.function_expression, "sin(z)");
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.cycle_strategy, CycleStrategy::Reset);
        assert!(config.use_numeric_derivative_fallback);
        assert_eq!(config.seed, 7);
    }
}
