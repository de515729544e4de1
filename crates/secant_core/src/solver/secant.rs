//! Secant recurrence with cycle guard.
//!
//! `z_{n+1} = z_n − f(z_n)(z_n − z_{n−1}) / (f(z_n) − f(z_{n−1}))`
//!
//! The iterator keeps a two-deep window of `(z, f(z))` and performs exactly
//! one fresh evaluation per step. It never fails: every terminal state,
//! evaluation failures included, is reported through [`RunResult`].

use tracing::{debug, trace, warn};

use super::classify::{classify_converged, is_oscillating, order_ratio};
use super::cycle::{CycleGuard, Recovery};
use super::derivative::central_difference;
use super::result::{ConvergenceKind, IterationPoint, RunResult, RunState};
use super::SolverConfig;
use crate::function::ComplexFunction;
use crate::rng::SolverRng;
use crate::types::{ComplexNumber, EvalFailure, DIVISION_EPSILON};

/// Secant denominators below this modulus are degenerate.
pub const DENOMINATOR_FLOOR: f64 = 1e-15;

/// `(z, f(z))`
#[derive(Debug, Clone, Copy)]
struct Sample {
    z: ComplexNumber,
    fz: ComplexNumber,
}

/// Outcome of trying to take one secant step.
enum Step {
    Next(ComplexNumber),
    Degenerate,
    NonFinite,
}

/// Mutable state of a single run.
struct SecantRun<'a, F: ComplexFunction + ?Sized> {
    f: &'a F,
    config: &'a SolverConfig,
    rng: &'a mut SolverRng,
    guard: CycleGuard,
    trajectory: Vec<IterationPoint>,
    previous: Sample,
    current: Sample,
    cycles: usize,
    failure: Option<EvalFailure>,
}

/// Runs the secant method on `f` from the seed pair `(z0, z1)`.
///
/// `config` must already be validated. The random source is used only by
/// perturbation-based recoveries.
///
/// # Example
///
/// ```
/// use secant_core::function::CompiledFunction;
/// use secant_core::rng::SolverRng;
/// use secant_core::solver::{solve, RunState, SolverConfig};
/// use secant_core::types::ComplexNumber;
///
/// let config = SolverConfig::new("z**2 - 4");
/// let f = CompiledFunction::compile(&config.function_expression).unwrap();
/// let mut rng = SolverRng::from_seed(config.seed);
///
/// let result = solve(&f, &config, ComplexNumber::real(1.0), ComplexNumber::real(3.0), &mut rng);
/// assert_eq!(result.termination, RunState::Converged);
/// assert!((result.root.re - 2.0).abs() < 1e-10);
/// assert_eq!(result.trajectory.len(), result.iterations + 1);
/// ```
pub fn solve<F>(
    f: &F,
    config: &SolverConfig,
    z0: ComplexNumber,
    z1: ComplexNumber,
    rng: &mut SolverRng,
) -> RunResult
where
    F: ComplexFunction + ?Sized,
{
    let f0 = match f.evaluate(z0) {
        Ok(value) => value,
        Err(failure) => {
            warn!(z = %z0, error = %failure, "first seed is not evaluable");
            let point = IterationPoint {
                value: z0,
                abs_error: f64::INFINITY,
                rel_error: 0.0,
            };
            return finish_seed_failure(config, point, failure);
        }
    };
    let seed0 = IterationPoint {
        value: z0,
        abs_error: f0.abs(),
        rel_error: 0.0,
    };

    let f1 = match f.evaluate(z1) {
        Ok(value) => value,
        Err(failure) => {
            if seed0.abs_error <= config.tolerance {
                return finish_at_seed(config, seed0);
            }
            warn!(z = %z1, error = %failure, "second seed is not evaluable");
            return finish_seed_failure(config, seed0, failure);
        }
    };

    if f1.abs() > config.tolerance && seed0.abs_error <= config.tolerance {
        return finish_at_seed(config, seed0);
    }

    let mut run = SecantRun {
        f,
        config,
        rng,
        guard: CycleGuard::new(config.cycle_strategy, config.max_iterations, z0, z1),
        trajectory: Vec::with_capacity(config.max_iterations.min(1024) + 1),
        previous: Sample { z: z0, fz: f0 },
        current: Sample { z: z1, fz: f1 },
        cycles: 0,
        failure: None,
    };
    run.trajectory.push(seed0);
    run.guard.record(z0, seed0.abs_error);
    run.push(z1, f1);
    run.guard.record(z1, f1.abs());

    let state = run.iterate();
    run.finish(state)
}

impl<F: ComplexFunction + ?Sized> SecantRun<'_, F> {
    fn iterations(&self) -> usize {
        self.trajectory.len() - 1
    }

    fn push(&mut self, z: ComplexNumber, fz: ComplexNumber) {
        let rel_error = match self.trajectory.last() {
            Some(last) => relative_step(z, last.value),
            None => 0.0,
        };
        self.trajectory.push(IterationPoint {
            value: z,
            abs_error: fz.abs(),
            rel_error,
        });
    }

    fn converged(&self) -> bool {
        self.current.fz.abs() <= self.config.tolerance
    }

    fn iterate(&mut self) -> RunState {
        if self.converged() {
            return RunState::Converged;
        }

        while self.iterations() < self.config.max_iterations {
            let cycle = match self.step() {
                Step::NonFinite => {
                    debug!(iteration = self.iterations(), "secant step left the finite plane");
                    return RunState::DegenerateAborted;
                }
                Step::Degenerate => {
                    debug!(iteration = self.iterations(), z = %self.current.z, "degenerate secant step");
                    true
                }
                Step::Next(next) => {
                    let fz = match self.evaluate(next) {
                        Ok(value) => value,
                        Err(state) => return state,
                    };
                    self.advance(next, fz);
                    if self.converged() {
                        return RunState::Converged;
                    }
                    self.guard.observe(next, fz.abs())
                }
            };

            if cycle {
                self.cycles += 1;
                if self.iterations() >= self.config.max_iterations {
                    break;
                }
                if let Err(state) = self.recover() {
                    return state;
                }
                if self.converged() {
                    return RunState::Converged;
                }
            }
        }

        RunState::MaxIterExhausted
    }

    fn step(&self) -> Step {
        let Sample { z: z_prev, fz: f_prev } = self.previous;
        let Sample { z, fz } = self.current;

        let denominator = fz - f_prev;
        let next = if denominator.abs() >= DENOMINATOR_FLOOR {
            (fz * (z - z_prev)).checked_div(denominator).map(|delta| z - delta)
        } else if self.config.use_numeric_derivative_fallback {
            match central_difference(self.f, z) {
                Some(derivative) if derivative.abs() >= DENOMINATOR_FLOOR => {
                    trace!(z = %z, "newton fallback step");
                    fz.checked_div(derivative).map(|delta| z - delta)
                }
                _ => return Step::Degenerate,
            }
        } else {
            return Step::Degenerate;
        };

        // Both parts may be finite while the modulus overflows.
        match next {
            Ok(next) if next.abs().is_finite() => Step::Next(next),
            _ => Step::NonFinite,
        }
    }

    fn evaluate(&mut self, z: ComplexNumber) -> Result<ComplexNumber, RunState> {
        self.f.evaluate(z).map_err(|failure| {
            warn!(
                iteration = self.iterations() + 1,
                z = %z,
                error = %failure,
                "function evaluation failed"
            );
            self.failure = Some(failure);
            RunState::Error
        })
    }

    fn advance(&mut self, z: ComplexNumber, fz: ComplexNumber) {
        self.push(z, fz);
        self.previous = self.current;
        self.current = Sample { z, fz };
    }

    fn recover(&mut self) -> Result<(), RunState> {
        let iteration = self.iterations();
        let anchor = self.current;
        let recovery = self
            .guard
            .recover(iteration, anchor.z, anchor.fz.abs(), self.rng);
        debug!(
            iteration,
            cycles = self.cycles,
            strategy = %self.config.cycle_strategy,
            recovery = ?recovery,
            "cycle detected"
        );

        let point = recovery.point();
        if !point.abs().is_finite() {
            debug!(iteration, "recovery point left the finite plane");
            return Err(RunState::DegenerateAborted);
        }
        let fz = self.evaluate(point)?;
        match recovery {
            Recovery::Perturb { .. } => self.advance(point, fz),
            Recovery::Reset { .. } => {
                self.push(point, fz);
                self.previous = anchor;
                self.current = Sample { z: point, fz };
            }
        }
        Ok(())
    }

    fn finish(self, state: RunState) -> RunResult {
        let errors: Vec<f64> = self.trajectory.iter().map(|p| p.abs_error).collect();
        let (convergence_kind, convergence_ratio) = match state {
            RunState::Converged => classify_converged(&errors),
            RunState::Error => (ConvergenceKind::Error, order_ratio(&errors).unwrap_or(0.0)),
            _ => (
                ConvergenceKind::SlowOrDivergent,
                order_ratio(&errors).unwrap_or(0.0),
            ),
        };

        let converged = state == RunState::Converged;
        let root = if converged {
            self.current.z
        } else {
            best_point(&self.trajectory)
        };

        let result = build_result(
            self.config,
            self.trajectory,
            root,
            state,
            self.cycles,
            convergence_kind,
            convergence_ratio,
            self.failure,
        );
        debug!(
            state = ?result.termination,
            iterations = result.iterations,
            cycles = result.cycles_detected,
            root = %result.root,
            "secant run finished"
        );
        result
    }
}

/// Converged on the first seed before any step was taken.
fn finish_at_seed(config: &SolverConfig, seed: IterationPoint) -> RunResult {
    build_result(
        config,
        vec![seed],
        seed.value,
        RunState::Converged,
        0,
        ConvergenceKind::Superlinear,
        0.0,
        None,
    )
}

fn finish_seed_failure(
    config: &SolverConfig,
    seed: IterationPoint,
    failure: EvalFailure,
) -> RunResult {
    build_result(
        config,
        vec![seed],
        seed.value,
        RunState::Error,
        0,
        ConvergenceKind::Error,
        0.0,
        Some(failure),
    )
}

#[allow(clippy::too_many_arguments)]
fn build_result(
    config: &SolverConfig,
    trajectory: Vec<IterationPoint>,
    root: ComplexNumber,
    termination: RunState,
    cycles_detected: usize,
    convergence_kind: ConvergenceKind,
    convergence_ratio: f64,
    failure: Option<EvalFailure>,
) -> RunResult {
    let (final_abs_error, final_rel_error) = trajectory
        .last()
        .map_or((f64::INFINITY, 0.0), |p| (p.abs_error, p.rel_error));

    RunResult {
        root,
        converged: termination == RunState::Converged,
        iterations: trajectory.len().saturating_sub(1),
        final_abs_error,
        final_rel_error,
        cycles_detected,
        convergence_kind,
        oscillating: is_oscillating(&trajectory),
        trajectory,
        config: config.clone(),
        termination,
        convergence_ratio,
        failure,
    }
}

/// `|z − previous| / |z|`, or the absolute step when `z` is at the origin.
///
/// Never NaN: an overflowing ratio is reported as infinite.
fn relative_step(z: ComplexNumber, previous: ComplexNumber) -> f64 {
    let step = z.distance(previous);
    let modulus = z.abs();
    let ratio = if modulus < DIVISION_EPSILON {
        step
    } else {
        step / modulus
    };
    if ratio.is_nan() {
        f64::INFINITY
    } else {
        ratio
    }
}

/// Visited point with the smallest finite `|f|`.
fn best_point(trajectory: &[IterationPoint]) -> ComplexNumber {
    trajectory
        .iter()
        .filter(|p| p.abs_error.is_finite())
        .min_by(|a, b| a.abs_error.total_cmp(&b.abs_error))
        .or_else(|| trajectory.first())
        .map_or(ComplexNumber::ZERO, |p| p.value)
}
