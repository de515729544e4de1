//! Perturbation-based stability analysis of a found root.
//!
//! For each noise level the analyser draws random complex noise `η` of that
//! magnitude, moves the root by `η`, and re-solves the noisy problem
//! `f(z) − η` from there. The displacement of the recovered root, divided
//! by the noise level, estimates the root's condition number.
//!
//! ## Classification
//!
//! | Global score      | Class                 |
//! |-------------------|-----------------------|
//! | `< 0.5`           | very stable           |
//! | `< 5`             | stable                |
//! | `< 50`            | moderately sensitive  |
//! | otherwise, or NaN | very sensitive        |

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::function::{ComplexFunction, ShiftedFunction};
use crate::rng::SolverRng;
use crate::solver::Solver;
use crate::types::{ComplexNumber, ConfigError};

/// Default noise magnitudes.
pub const DEFAULT_NOISE_LEVELS: [f64; 5] = [1e-15, 1e-12, 1e-9, 1e-6, 1e-3];

/// Default samples drawn per noise level.
pub const DEFAULT_SAMPLES_PER_LEVEL: usize = 5;

/// Offset between the two seeds relative to the root's magnitude.
const MIN_SEED_SPREAD: f64 = 1e-7;

/// Sub-stream of the configured seed reserved for sensitivity analysis.
const SENSITIVITY_STREAM: u64 = u64::MAX;

/// Stability class derived from the global sensitivity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityClass {
    /// Score below 0.5.
    VeryStable,
    /// Score below 5.
    Stable,
    /// Score below 50.
    ModeratelySensitive,
    /// Score of 50 or more, or undefined.
    VerySensitive,
}

impl StabilityClass {
    /// Maps a score onto the ladder. Total over all `f64`, NaN included.
    pub fn from_score(score: f64) -> Self {
        if score < 0.5 {
            StabilityClass::VeryStable
        } else if score < 5.0 {
            StabilityClass::Stable
        } else if score < 50.0 {
            StabilityClass::ModeratelySensitive
        } else {
            StabilityClass::VerySensitive
        }
    }

    /// Canonical `snake_case` name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StabilityClass::VeryStable => "very_stable",
            StabilityClass::Stable => "stable",
            StabilityClass::ModeratelySensitive => "moderately_sensitive",
            StabilityClass::VerySensitive => "very_sensitive",
        }
    }
}

impl std::fmt::Display for StabilityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sensitivity analysis parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityOptions {
    /// Noise magnitudes, each finite and `>= 0`.
    pub noise_levels: Vec<f64>,
    /// Samples per level, at least 1.
    pub samples_per_level: usize,
}

impl Default for SensitivityOptions {
    fn default() -> Self {
        Self {
            noise_levels: DEFAULT_NOISE_LEVELS.to_vec(),
            samples_per_level: DEFAULT_SAMPLES_PER_LEVEL,
        }
    }
}

impl SensitivityOptions {
    /// Checks levels and sample count.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.noise_levels.is_empty() {
            return Err(ConfigError::InvalidSensitivity(
                "at least one noise level is required".to_string(),
            ));
        }
        if let Some(bad) = self
            .noise_levels
            .iter()
            .find(|level| !(level.is_finite() && **level >= 0.0))
        {
            return Err(ConfigError::InvalidSensitivity(format!(
                "noise levels must be finite and non-negative, got {}",
                bad
            )));
        }
        if self.samples_per_level == 0 {
            return Err(ConfigError::InvalidSensitivity(
                "samples_per_level must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// One perturbed re-solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRun {
    /// Noise magnitude.
    pub noise_level: f64,
    /// `r0 + η`, the first seed.
    pub perturbed_point: ComplexNumber,
    /// Root recovered for `f(z) − η`.
    pub displaced_root: ComplexNumber,
    /// `|displaced_root − r0|`
    pub shift_magnitude: f64,
    /// Whether the re-solve converged.
    pub converged: bool,
}

/// Displacement statistics for one noise level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelStatistics {
    /// Noise magnitude.
    pub noise_level: f64,
    /// Mean displacement.
    pub mean_shift: f64,
    /// Population standard deviation of the displacement.
    pub std_shift: f64,
    /// Smallest displacement.
    pub min_shift: f64,
    /// Largest displacement.
    pub max_shift: f64,
    /// Samples whose re-solve converged.
    pub converged: usize,
    /// Samples drawn.
    pub samples: usize,
}

impl LevelStatistics {
    fn from_runs(noise_level: f64, runs: &[SensitivityRun]) -> Self {
        let shifts: Vec<f64> = runs.iter().map(|r| r.shift_magnitude).collect();
        let n = shifts.len() as f64;
        let mean = shifts.iter().sum::<f64>() / n;
        let variance = shifts.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

        Self {
            noise_level,
            mean_shift: mean,
            std_shift: variance.sqrt(),
            min_shift: shifts.iter().copied().fold(f64::INFINITY, f64::min),
            max_shift: shifts.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            converged: runs.iter().filter(|r| r.converged).count(),
            samples: runs.len(),
        }
    }
}

/// Result of a sensitivity analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityReport {
    /// Root analysed.
    pub root: ComplexNumber,
    /// `|f(root)|`, `None` if `f` is undefined at the root.
    pub function_value: Option<f64>,
    /// Every perturbed re-solve, level by level.
    pub runs: Vec<SensitivityRun>,
    /// Per-level statistics in input order.
    pub levels: Vec<LevelStatistics>,
    /// Mean of `mean_shift / noise_level` over positive levels.
    pub global_sensitivity: f64,
    /// Class derived from `global_sensitivity`.
    pub stability: StabilityClass,
    /// Options used.
    pub options: SensitivityOptions,
}

/// Analyses how far `root` moves under noise of each level.
///
/// # Errors
///
/// [`ConfigError::InvalidSensitivity`] for empty or invalid noise levels or
/// a zero sample count.
///
/// # Example
///
/// ```
/// use secant_core::sensitivity::{analyse, SensitivityOptions, StabilityClass};
/// use secant_core::solver::{Solver, SolverConfig};
/// use secant_core::types::ComplexNumber;
///
/// let solver = Solver::configure(SolverConfig::new("z - 3")).unwrap();
/// let report = analyse(&solver, ComplexNumber::real(3.0), &SensitivityOptions::default()).unwrap();
///
/// // A simple root of a unit-slope function moves by exactly the noise.
/// assert_eq!(report.levels.len(), 5);
/// assert_eq!(report.stability, StabilityClass::Stable);
/// ```
pub fn analyse(
    solver: &Solver,
    root: ComplexNumber,
    options: &SensitivityOptions,
) -> Result<SensitivityReport, ConfigError> {
    options.validate()?;

    let f = solver.function();
    let mut rng = SolverRng::from_seed(solver.config().seed).derive(SENSITIVITY_STREAM);
    let spread_floor = MIN_SEED_SPREAD * (1.0 + root.abs());

    let mut runs = Vec::with_capacity(options.noise_levels.len() * options.samples_per_level);
    let mut levels = Vec::with_capacity(options.noise_levels.len());

    for &level in &options.noise_levels {
        let start = runs.len();
        for _ in 0..options.samples_per_level {
            let noise = rng.unit_direction().scale(level);
            let perturbed = root + noise;
            let spread = (0.5 * level).max(spread_floor);
            let partner = perturbed + rng.unit_direction().scale(spread);

            let noisy = ShiftedFunction::new(f, noise);
            let mut run_rng = rng.derive(runs.len() as u64);
            let result = solver.run_on(&noisy, perturbed, partner, &mut run_rng);

            runs.push(SensitivityRun {
                noise_level: level,
                perturbed_point: perturbed,
                displaced_root: result.root,
                shift_magnitude: result.root.distance(root),
                converged: result.converged,
            });
        }
        levels.push(LevelStatistics::from_runs(level, &runs[start..]));
    }

    let global_sensitivity = global_score(&levels);
    let stability = StabilityClass::from_score(global_sensitivity);
    info!(
        root = %root,
        score = global_sensitivity,
        stability = %stability,
        samples = runs.len(),
        "sensitivity analysis complete"
    );

    Ok(SensitivityReport {
        root,
        function_value: f.evaluate(root).ok().map(ComplexNumber::abs),
        runs,
        levels,
        global_sensitivity,
        stability,
        options: options.clone(),
    })
}

/// Mean amplification `mean_shift / level` over positive levels.
///
/// NaN when no level is positive, which classifies as very sensitive.
fn global_score(levels: &[LevelStatistics]) -> f64 {
    let amplifications: Vec<f64> = levels
        .iter()
        .filter(|l| l.noise_level > 0.0)
        .map(|l| l.mean_shift / l.noise_level)
        .collect();
    if amplifications.is_empty() {
        return f64::NAN;
    }
    amplifications.iter().sum::<f64>() / amplifications.len() as f64
}
