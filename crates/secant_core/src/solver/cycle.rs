//! Cycle guard and recovery strategies.
//!
//! The guard watches three signals: revisiting a recently seen point,
//! stagnating error, and degenerate secant steps (reported by the iterator).
//! When it fires, the configured [`CycleStrategy`] chooses a recovery move.

use std::collections::VecDeque;

use super::config::CycleStrategy;
use crate::rng::SolverRng;
use crate::types::ComplexNumber;

/// Number of recent points remembered for repeat detection.
pub const HISTORY_LEN: usize = 25;

/// Points are compared after rounding to this many decimals.
const QUANTISE_SCALE: f64 = 1e12;

/// Steps over which the error must improve.
pub const STAGNATION_WINDOW: usize = 10;

/// Minimum relative improvement across the stagnation window.
const STAGNATION_THRESHOLD: f64 = 0.01;

/// A relapse within this many iterations escalates hybrid perturbation to a reset.
const ESCALATION_WINDOW: usize = 5;

/// Cap on the adaptive radius multiplier.
const ADAPTIVE_CAP: f64 = 100.0;

/// `π (3 − √5)`
pub const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

type PointKey = (u64, u64);

fn quantise(z: ComplexNumber) -> PointKey {
    // `+ 0.0` folds -0.0 into 0.0 so both hash the same.
    let re = (z.re * QUANTISE_SCALE).round() + 0.0;
    let im = (z.im * QUANTISE_SCALE).round() + 0.0;
    (re.to_bits(), im.to_bits())
}

/// Recovery chosen for a detected cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Recovery {
    /// Move the current point to `point`; the old current point becomes the partner.
    Perturb {
        /// Perturbed location
        point: ComplexNumber,
    },
    /// Keep the current point as anchor and pair it with `partner`.
    Reset {
        /// Fresh partner point
        partner: ComplexNumber,
    },
}

impl Recovery {
    /// The new point the iterator must evaluate.
    pub fn point(&self) -> ComplexNumber {
        match *self {
            Recovery::Perturb { point } => point,
            Recovery::Reset { partner } => partner,
        }
    }
}

/// Per-run cycle detection state.
#[derive(Debug, Clone)]
pub struct CycleGuard {
    strategy: CycleStrategy,
    max_iterations: usize,
    seed_midpoint: ComplexNumber,
    seed_spread: f64,
    history: VecDeque<PointKey>,
    errors: VecDeque<f64>,
    last_recovery: Option<usize>,
    recoveries: usize,
    resets: usize,
}

impl CycleGuard {
    /// Creates a guard for a run seeded at `(z0, z1)`.
    pub fn new(
        strategy: CycleStrategy,
        max_iterations: usize,
        z0: ComplexNumber,
        z1: ComplexNumber,
    ) -> Self {
        Self {
            strategy,
            max_iterations,
            seed_midpoint: (z0 + z1).scale(0.5),
            seed_spread: z0.distance(z1).max(1.0),
            history: VecDeque::with_capacity(HISTORY_LEN),
            errors: VecDeque::with_capacity(STAGNATION_WINDOW + 1),
            last_recovery: None,
            recoveries: 0,
            resets: 0,
        }
    }

    /// Records a visited point without checking it. Used for the seeds.
    pub fn record(&mut self, z: ComplexNumber, abs_error: f64) {
        self.remember(quantise(z));
        self.push_error(abs_error);
    }

    /// Records a freshly computed iterate.
    ///
    /// Returns `true` when the point repeats a remembered one or the error has
    /// stagnated over the last [`STAGNATION_WINDOW`] steps.
    pub fn observe(&mut self, z: ComplexNumber, abs_error: f64) -> bool {
        let key = quantise(z);
        let repeated = self.history.contains(&key);
        self.remember(key);
        self.push_error(abs_error);
        repeated || self.stagnated()
    }

    fn remember(&mut self, key: PointKey) {
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(key);
    }

    fn push_error(&mut self, abs_error: f64) {
        if self.errors.len() == STAGNATION_WINDOW + 1 {
            self.errors.pop_front();
        }
        self.errors.push_back(abs_error);
    }

    fn stagnated(&self) -> bool {
        if self.errors.len() <= STAGNATION_WINDOW {
            return false;
        }
        let (Some(&oldest), Some(&newest)) = (self.errors.front(), self.errors.back()) else {
            return false;
        };
        if !(oldest > 0.0) {
            return false;
        }
        (oldest - newest) / oldest < STAGNATION_THRESHOLD
    }

    /// Chooses a recovery move for a cycle detected at `iteration`.
    ///
    /// `current` is the latest iterate and `current_error` its `|f|`.
    pub fn recover(
        &mut self,
        iteration: usize,
        current: ComplexNumber,
        current_error: f64,
        rng: &mut SolverRng,
    ) -> Recovery {
        let relapsed = self
            .last_recovery
            .is_some_and(|last| iteration.saturating_sub(last) <= ESCALATION_WINDOW);

        let recovery = match self.strategy {
            CycleStrategy::Perturbation => self.perturb(current, current_error, 1.0, rng),
            CycleStrategy::Reset => self.reset(current),
            CycleStrategy::Hybrid => {
                if self.recoveries % 2 == 0 {
                    self.perturb(current, current_error, 1.0, rng)
                } else {
                    self.reset(current)
                }
            }
            CycleStrategy::HybridPerturbation => {
                if relapsed {
                    self.reset(current)
                } else {
                    self.perturb(current, current_error, 1.0, rng)
                }
            }
            CycleStrategy::Adaptive => {
                let remaining = self.max_iterations.saturating_sub(iteration).max(1);
                let growth = (self.max_iterations as f64 / remaining as f64).min(ADAPTIVE_CAP);
                self.perturb(current, current_error, growth, rng)
            }
        };

        self.recoveries += 1;
        self.last_recovery = Some(iteration);
        self.errors.clear();
        recovery
    }

    fn perturb(
        &self,
        current: ComplexNumber,
        current_error: f64,
        growth: f64,
        rng: &mut SolverRng,
    ) -> Recovery {
        let radius = perturbation_radius(current, current_error) * growth;
        let direction = rng.unit_direction();
        Recovery::Perturb {
            point: current + direction.scale(radius),
        }
    }

    fn reset(&mut self, current: ComplexNumber) -> Recovery {
        self.resets += 1;
        self.history.clear();
        self.history.push_back(quantise(current));
        Recovery::Reset {
            partner: spiral_point(self.seed_midpoint, self.seed_spread, self.resets),
        }
    }
}

/// Perturbation radius: a tenth of the clamped error, scaled to `|z|`.
pub fn perturbation_radius(current: ComplexNumber, current_error: f64) -> f64 {
    let error = if current_error.is_finite() {
        current_error.clamp(1e-8, 1.0)
    } else {
        1.0
    };
    0.1 * error * (1.0 + current.abs())
}

/// `k`-th point of the golden-angle spiral around `centre`.
pub fn spiral_point(centre: ComplexNumber, spread: f64, k: usize) -> ComplexNumber {
    let k = k as f64;
    let radius = spread * (1.0 + k / 2.0);
    centre + ComplexNumber::from_polar(radius, k * GOLDEN_ANGLE)
}
