//! Examples command implementation

use std::io::Write;

use clap::Args;
use secant_core::catalog::{Example, SeedPair};
use secant_core::engine::Engine;
use secant_core::report::PointView;
use secant_core::solver::SolverConfig;
use serde::Serialize;

use super::configured_engine;
use crate::config::{OutputFormat, Settings};
use crate::output::{opt, point, write_json, write_table};
use crate::Result;

/// Arguments of `secant examples`.
#[derive(Debug, Clone, Args)]
pub struct ExamplesArgs {
    /// Solve every example from its suggested seed pairs
    #[arg(long)]
    pub solve: bool,
}

/// Result of solving one example from one seed pair.
#[derive(Debug, Clone, Serialize)]
pub struct ExampleRun {
    /// Example name
    pub name: &'static str,
    /// Seeds used
    pub seeds: SeedPair,
    /// Whether the run converged
    pub converged: bool,
    /// Root reached
    pub root: PointView,
    /// Iterations taken
    pub iterations: usize,
    /// Final |f(root)|
    pub final_abs_error: Option<f64>,
}

#[derive(Serialize)]
struct ExamplesOutput<'a> {
    examples: &'a [Example],
    #[serde(skip_serializing_if = "Option::is_none")]
    runs: Option<&'a [ExampleRun]>,
}

/// Run the examples command
pub fn run(args: &ExamplesArgs, settings: &Settings, out: &mut dyn Write) -> Result<()> {
    let catalogue = Engine::new().examples();
    let runs = if args.solve {
        Some(solve_all(&catalogue, &settings.solver)?)
    } else {
        None
    };

    match settings.format {
        OutputFormat::Json => write_json(
            out,
            &ExamplesOutput {
                examples: &catalogue,
                runs: runs.as_deref(),
            },
        ),
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = catalogue
                .iter()
                .map(|e| {
                    vec![
                        e.name.to_string(),
                        e.expression.to_string(),
                        e.difficulty.to_string(),
                        e.description.to_string(),
                    ]
                })
                .collect();
            write_table(out, &["Name", "f(z)", "Difficulty", "Description"], &rows)?;

            if let Some(runs) = &runs {
                let rows: Vec<Vec<String>> = runs
                    .iter()
                    .map(|r| {
                        vec![
                            r.name.to_string(),
                            format!("{} / {}", r.seeds.z0, r.seeds.z1),
                            r.converged.to_string(),
                            point(&r.root),
                            r.iterations.to_string(),
                            opt(r.final_abs_error),
                        ]
                    })
                    .collect();
                write_table(
                    out,
                    &["Name", "Seeds", "Converged", "Root", "Iter", "|f(root)|"],
                    &rows,
                )?;
            }
            Ok(())
        }
    }
}

/// Solves each example from each of its suggested seed pairs.
pub fn solve_all(catalogue: &[Example], base: &SolverConfig) -> Result<Vec<ExampleRun>> {
    let mut runs = Vec::new();
    for example in catalogue {
        let mut config = base.clone();
        config.function_expression = example.expression.to_string();
        let mut engine = configured_engine(config)?;

        for seeds in &example.suggested_seed_pairs {
            let execution = engine.execute(seeds.z0, seeds.z1)?;
            runs.push(ExampleRun {
                name: example.name,
                seeds: *seeds,
                converged: execution.result.converged,
                root: execution.result.root,
                iterations: execution.result.iterations,
                final_abs_error: execution.result.final_abs_error,
            });
        }
    }
    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_json() {
        let settings = Settings {
            format: OutputFormat::Json,
            ..Default::default()
        };
        let mut buf = Vec::new();
        run(&ExamplesArgs { solve: false }, &settings, &mut buf).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["examples"].as_array().unwrap().len(), 4);
        assert!(json.get("runs").is_none());
        assert_eq!(json["examples"][0]["difficulty"], "low");
    }

    #[test]
    fn test_solve_all_converges() {
        let catalogue = Engine::new().examples();
        let runs = solve_all(&catalogue, &SolverConfig::default()).unwrap();
        assert_eq!(runs.len(), 8);
        assert!(runs.iter().all(|r| r.converged), "{runs:?}");
    }

    #[test]
    fn test_solve_table() {
        let mut buf = Vec::new();
        run(&ExamplesArgs { solve: true }, &Settings::default(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Quartic polynomial"));
        assert!(text.contains("│ Converged "));
    }
}
