//! Generators for functions that stress the secant method.
//!
//! Every generator returns an expression in the compiler's grammar together
//! with a description and a characteristics block. Parameters are validated;
//! the returned expression always compiles.

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::examples::Difficulty;
use crate::types::ConfigError;

/// Pathological function families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathologicalKind {
    /// Truncated Weierstrass cosine sum
    Weierstrass,
    /// `a·sin(k z)/(z + 1e-10)`
    Oscillatory,
    /// Product over the n-th roots of unity
    Multimodal,
    /// Two roots separated by `1/condition`
    IllConditioned,
}

impl PathologicalKind {
    /// All families.
    pub const ALL: [PathologicalKind; 4] = [
        Self::Weierstrass,
        Self::Oscillatory,
        Self::Multimodal,
        Self::IllConditioned,
    ];

    /// Canonical `snake_case` name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weierstrass => "weierstrass",
            Self::Oscillatory => "oscillatory",
            Self::Multimodal => "multimodal",
            Self::IllConditioned => "ill_conditioned",
        }
    }

    /// Generates the family member with default parameters.
    pub fn generate_default(&self) -> Result<PathologicalFunction, ConfigError> {
        match self {
            Self::Weierstrass => weierstrass(0.5, 7, 10),
            Self::Oscillatory => oscillatory(20.0, 1.0),
            Self::Multimodal => multimodal(5),
            Self::IllConditioned => ill_conditioned(1e12),
        }
    }
}

impl FromStr for PathologicalKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "weierstrass" => Ok(Self::Weierstrass),
            "oscillatory" => Ok(Self::Oscillatory),
            "multimodal" => Ok(Self::Multimodal),
            "ill_conditioned" | "illconditioned" => Ok(Self::IllConditioned),
            _ => Err(ConfigError::UnknownPathological(s.to_string())),
        }
    }
}

impl std::fmt::Display for PathologicalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Analytic properties of a generated function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Characteristics {
    /// Continuous on its domain
    pub continuous: bool,
    /// Complex-differentiable on its domain
    pub differentiable: bool,
    /// Rapidly oscillating
    pub oscillatory: bool,
    /// Known number of roots, when finite and known
    pub root_count: Option<usize>,
    /// Condition number of the root pair, when applicable
    pub condition_number: Option<f64>,
    /// Expected difficulty
    pub difficulty: Difficulty,
}

/// A generated function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathologicalFunction {
    /// Family
    pub kind: PathologicalKind,
    /// Compilable expression
    pub expression: String,
    /// One-line description
    pub description: String,
    /// Analytic properties
    pub characteristics: Characteristics,
    /// Parameters used, by name
    pub parameters: BTreeMap<&'static str, f64>,
}

fn positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            value,
            reason: "must be a finite positive number",
        })
    }
}

fn count(name: &'static str, value: usize, max: usize) -> Result<usize, ConfigError> {
    if (1..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            value: value as f64,
            reason: "out of range",
        })
    }
}

/// Weierstrass-type sum `Σ aⁿ·cos(bⁿ·π·z)` for `n = 0..terms`.
///
/// # Errors
///
/// `a` must lie in `(0, 1)`, `b` in `1..=99` and `terms` in `1..=20`.
pub fn weierstrass(a: f64, b: u32, terms: usize) -> Result<PathologicalFunction, ConfigError> {
    if !(a > 0.0 && a < 1.0) {
        return Err(ConfigError::InvalidParameter {
            name: "a",
            value: a,
            reason: "must lie in (0, 1)",
        });
    }
    count("b", b as usize, 99)?;
    count("terms", terms, 20)?;

    let expression = (0..terms)
        .map(|n| format!("{}*cos({}**{}*pi*z)", a.powi(n as i32), b, n))
        .collect::<Vec<_>>()
        .join(" + ");

    Ok(PathologicalFunction {
        kind: PathologicalKind::Weierstrass,
        expression,
        description: format!("Weierstrass function (a={a}, b={b}, {terms} terms)"),
        characteristics: Characteristics {
            continuous: true,
            differentiable: false,
            oscillatory: true,
            root_count: None,
            condition_number: None,
            difficulty: Difficulty::High,
        },
        parameters: BTreeMap::from([("a", a), ("b", b as f64), ("terms", terms as f64)]),
    })
}

/// `amplitude·sin(frequency·z)/(z + 1e-10)`.
///
/// # Errors
///
/// Both parameters must be finite and positive.
pub fn oscillatory(frequency: f64, amplitude: f64) -> Result<PathologicalFunction, ConfigError> {
    positive("frequency", frequency)?;
    positive("amplitude", amplitude)?;

    Ok(PathologicalFunction {
        kind: PathologicalKind::Oscillatory,
        expression: format!("{amplitude}*sin({frequency}*z)/(z + 1e-10)"),
        description: format!(
            "Oscillatory function (frequency={frequency}, amplitude={amplitude})"
        ),
        characteristics: Characteristics {
            continuous: true,
            differentiable: true,
            oscillatory: true,
            root_count: None,
            condition_number: None,
            difficulty: Difficulty::MediumHigh,
        },
        parameters: BTreeMap::from([("frequency", frequency), ("amplitude", amplitude)]),
    })
}

/// `Π (z − ωₖ)` over the `modes`-th roots of unity.
///
/// # Errors
///
/// `modes` must lie in `1..=32`.
pub fn multimodal(modes: usize) -> Result<PathologicalFunction, ConfigError> {
    count("modes", modes, 32)?;

    let expression = (0..modes)
        .map(|k| {
            let angle = 2.0 * PI * k as f64 / modes as f64;
            let (im, re) = angle.sin_cos();
            let sign = if im < 0.0 { '-' } else { '+' };
            format!("(z - ({re} {sign} {}j))", im.abs())
        })
        .collect::<Vec<_>>()
        .join("*");

    Ok(PathologicalFunction {
        kind: PathologicalKind::Multimodal,
        expression,
        description: format!("Multimodal function with {modes} roots (roots of unity)"),
        characteristics: Characteristics {
            continuous: true,
            differentiable: true,
            oscillatory: false,
            root_count: Some(modes),
            condition_number: None,
            difficulty: Difficulty::Medium,
        },
        parameters: BTreeMap::from([("modes", modes as f64)]),
    })
}

/// `(z − 1)(z − (1 + 1/condition))`, a near-double root.
///
/// # Errors
///
/// `condition` must be finite and at least 1.
pub fn ill_conditioned(condition: f64) -> Result<PathologicalFunction, ConfigError> {
    if !(condition.is_finite() && condition >= 1.0) {
        return Err(ConfigError::InvalidParameter {
            name: "condition",
            value: condition,
            reason: "must be finite and >= 1",
        });
    }
    let delta = 1.0 / condition;

    Ok(PathologicalFunction {
        kind: PathologicalKind::IllConditioned,
        expression: format!("(z - 1.0)*(z - (1.0 + {delta}))"),
        description: format!("Ill-conditioned function (condition ~{condition:.0e})"),
        characteristics: Characteristics {
            continuous: true,
            differentiable: true,
            oscillatory: false,
            root_count: Some(2),
            condition_number: Some(condition),
            difficulty: Difficulty::VeryHigh,
        },
        parameters: BTreeMap::from([("condition", condition)]),
    })
}
