//! Built-in example functions with suggested seed pairs.

use serde::{Deserialize, Serialize};

use crate::types::ComplexNumber;

/// Rough difficulty for the secant method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Converges from most seeds
    Low,
    /// Seed choice matters
    Medium,
    /// Frequent cycling
    MediumHigh,
    /// Frequent cycling or non-smooth behaviour
    High,
    /// Numerically ill-posed
    VeryHigh,
}

impl Difficulty {
    /// Canonical `snake_case` name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::MediumHigh => "medium_high",
            Self::High => "high",
            Self::VeryHigh => "very_high",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two starting points for a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeedPair {
    /// First seed
    pub z0: ComplexNumber,
    /// Second seed
    pub z1: ComplexNumber,
}

impl SeedPair {
    const fn new(re0: f64, im0: f64, re1: f64, im1: f64) -> Self {
        Self {
            z0: ComplexNumber::new(re0, im0),
            z1: ComplexNumber::new(re1, im1),
        }
    }
}

/// A catalogue entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Example {
    /// Display name
    pub name: &'static str,
    /// Expression accepted by the function compiler
    pub expression: &'static str,
    /// Where the roots are
    pub description: &'static str,
    /// Difficulty rating
    pub difficulty: Difficulty,
    /// Seed pairs known to converge
    pub suggested_seed_pairs: Vec<SeedPair>,
}

/// The static example catalogue.
///
/// ```
/// use secant_core::catalog::examples;
///
/// let catalogue = examples();
/// assert_eq!(catalogue.len(), 4);
/// assert_eq!(catalogue[0].expression, "z**3 - 1");
/// ```
pub fn examples() -> Vec<Example> {
    vec![
        Example {
            name: "Cube roots of unity",
            expression: "z**3 - 1",
            description: "Cubic polynomial with roots at 1 and -0.5±0.866i",
            difficulty: Difficulty::Low,
            suggested_seed_pairs: vec![
                SeedPair::new(0.5, 0.5, 1.0, 0.0),
                SeedPair::new(-0.5, 0.5, -1.0, 0.0),
            ],
        },
        Example {
            name: "Complex sine",
            expression: "cmath.sin(z) - z/2",
            description: "Complex sine with a linear term",
            difficulty: Difficulty::Medium,
            suggested_seed_pairs: vec![
                SeedPair::new(1.0, 1.0, 2.0, 0.5),
                SeedPair::new(-1.0, -1.0, -2.0, -0.5),
            ],
        },
        Example {
            name: "Complex exponential",
            expression: "cmath.exp(z) - 1",
            description: "Complex exponential with a root at 0",
            difficulty: Difficulty::Low,
            suggested_seed_pairs: vec![
                SeedPair::new(0.5, 0.5, 1.0, 0.0),
                SeedPair::new(-0.5, -0.5, -1.0, 0.0),
            ],
        },
        Example {
            name: "Quartic polynomial",
            expression: "z**4 - 5*z**2 + 4",
            description: "Quartic polynomial with four real roots at ±1 and ±2",
            difficulty: Difficulty::Medium,
            suggested_seed_pairs: vec![
                SeedPair::new(0.5, 0.5, 1.5, 0.0),
                SeedPair::new(-0.5, 0.5, -1.5, 0.0),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{Solver, SolverConfig};

    #[test]
    fn test_every_example_compiles_and_converges() {
        for example in examples() {
            let solver = Solver::configure(SolverConfig::new(example.expression))
                .unwrap_or_else(|e| panic!("{}: {}", example.name, e));
            for pair in &example.suggested_seed_pairs {
                let result = solver.run(pair.z0, pair.z1);
                assert!(
                    result.converged,
                    "{} from {} / {} did not converge",
                    example.name, pair.z0, pair.z1
                );
            }
        }
    }

    #[test]
    fn test_serialised_shape() {
        let json = serde_json::to_value(&examples()[1]).unwrap();
        assert_eq!(json["difficulty"], "medium");
        assert_eq!(json["suggested_seed_pairs"][0]["z1"]["re"], 2.0);
        assert_eq!(json["suggested_seed_pairs"][0]["z1"]["im"], 0.5);
    }
}
