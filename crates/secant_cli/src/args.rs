//! Argument types shared by several subcommands.

use clap::Args;
use secant_core::catalog::PathologicalKind;
use secant_core::solver::{CycleStrategy, SolverConfig};
use secant_core::types::{ComplexNumber, ConfigError};

/// Function and solver overrides.
#[derive(Debug, Clone, Args)]
pub struct SolverArgs {
    /// Function of z, e.g. "z**3 - 1" or "sin(z) - z/2"
    #[arg(short, long = "function", value_name = "EXPR")]
    pub function: String,

    /// Convergence tolerance on |f(z)|
    #[arg(short, long)]
    pub tolerance: Option<f64>,

    /// Iteration budget per run
    #[arg(short, long)]
    pub max_iterations: Option<usize>,

    /// Cycle recovery strategy
    #[arg(short, long, value_parser = parse_strategy)]
    pub strategy: Option<CycleStrategy>,

    /// Take a numerical Newton step when the secant denominator vanishes
    #[arg(long)]
    pub derivative_fallback: bool,

    /// Seed for perturbation and sensitivity noise
    #[arg(long)]
    pub seed: Option<u64>,
}

impl SolverArgs {
    /// `base` with this command's function and overrides applied.
    pub fn apply(&self, base: &SolverConfig) -> SolverConfig {
        let mut config = base.clone();
        config.function_expression = self.function.clone();
        if let Some(tolerance) = self.tolerance {
            config.tolerance = tolerance;
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }
        if let Some(strategy) = self.strategy {
            config.cycle_strategy = strategy;
        }
        if self.derivative_fallback {
            config.use_numeric_derivative_fallback = true;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config
    }
}

/// clap value parser for [`CycleStrategy`].
pub fn parse_strategy(s: &str) -> Result<CycleStrategy, ConfigError> {
    s.parse()
}

/// clap value parser for [`PathologicalKind`].
pub fn parse_kind(s: &str) -> Result<PathologicalKind, ConfigError> {
    s.parse()
}

/// Parses a complex number written as `a,b`, `a+bi`, `a-bj`, `bi` or `a`.
pub fn parse_complex(input: &str) -> Result<ComplexNumber, String> {
    let s: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if s.is_empty() {
        return Err("empty complex number".to_string());
    }

    let number = |part: &str| -> Result<f64, String> {
        let value: f64 = part
            .parse()
            .map_err(|_| format!("'{part}' is not a number in '{input}'"))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(format!("'{input}' is not finite"))
        }
    };

    if let Some((re, im)) = s.split_once(',') {
        return Ok(ComplexNumber::new(number(re)?, number(im)?));
    }

    let Some(body) = s.strip_suffix(['i', 'j']) else {
        return number(&s).map(ComplexNumber::real);
    };

    // Sign that starts the imaginary part: not leading, not an exponent sign.
    let bytes = body.as_bytes();
    let split = (1..bytes.len())
        .rev()
        .find(|&k| matches!(bytes[k], b'+' | b'-') && !matches!(bytes[k - 1], b'e' | b'E'));

    let coefficient = |part: &str| match part {
        "" | "+" => Ok(1.0),
        "-" => Ok(-1.0),
        _ => number(part),
    };

    match split {
        Some(k) => Ok(ComplexNumber::new(
            number(&body[..k])?,
            coefficient(&body[k..])?,
        )),
        None => Ok(ComplexNumber::new(0.0, coefficient(body)?)),
    }
}
