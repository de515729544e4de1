//! Solve command implementation
//!
//! Runs the secant solver once from a seed pair.

use std::io::Write;

use clap::Args;
use secant_core::report::{DetailedReport, ExecutionReport, RunView};
use secant_core::types::ComplexNumber;
use tracing::info;

use super::configured_engine;
use crate::args::{parse_complex, SolverArgs};
use crate::config::{OutputFormat, Settings};
use crate::output::{opt, point, write_fields, write_json, write_table};
use crate::Result;

/// Arguments of `secant solve`.
#[derive(Debug, Clone, Args)]
pub struct SolveArgs {
    #[command(flatten)]
    pub solver: SolverArgs,

    /// First seed, e.g. "1+2i" or "1,2"
    #[arg(long, value_parser = parse_complex, allow_hyphen_values = true)]
    pub z0: ComplexNumber,

    /// Second seed
    #[arg(long, value_parser = parse_complex, allow_hyphen_values = true)]
    pub z1: ComplexNumber,

    /// Include convergence analysis and recommendations
    #[arg(long)]
    pub report: bool,

    /// Print every trajectory point in table output
    #[arg(long)]
    pub trajectory: bool,
}

/// Run the solve command
pub fn run(args: &SolveArgs, settings: &Settings, out: &mut dyn Write) -> Result<()> {
    let mut engine = configured_engine(args.solver.apply(&settings.solver))?;
    let execution = engine.execute(args.z0, args.z1)?;
    info!(run_id = %execution.run_id, "solve complete");

    let detailed = if args.report {
        Some(engine.report(&execution.run_id)?)
    } else {
        None
    };

    match (settings.format, &detailed) {
        (OutputFormat::Json, Some(report)) => write_json(out, report),
        (OutputFormat::Json, None) => write_json(out, &execution),
        (OutputFormat::Table, _) => {
            write_execution(out, &execution)?;
            if let Some(report) = &detailed {
                write_recommendations(out, report)?;
            }
            if args.trajectory {
                write_trajectory(out, &execution.result)?;
            }
            Ok(())
        }
    }
}

pub(crate) fn write_execution(out: &mut dyn Write, execution: &ExecutionReport) -> Result<()> {
    let result = &execution.result;
    let ratio = result
        .convergence_ratio
        .map_or_else(|| "-".to_string(), |r| format!("{r:.3}"));
    write_fields(
        out,
        &format!("Run {}", execution.run_id),
        &[
            ("Function", result.config.function_expression.clone()),
            ("Strategy", result.config.cycle_strategy.to_string()),
            ("Converged", result.converged.to_string()),
            ("Root", point(&result.root)),
            ("|f(root)|", opt(result.final_abs_error)),
            ("Iterations", result.iterations.to_string()),
            ("Cycles", result.cycles_detected.to_string()),
            ("Convergence", format!("{} (ratio {ratio})", result.convergence_kind)),
            ("Oscillating", result.oscillating.to_string()),
            ("Failure", result.failure.clone().unwrap_or_else(|| "-".to_string())),
            ("Elapsed", format!("{:.6} s", execution.elapsed_seconds)),
        ],
    )
}

fn write_recommendations(out: &mut dyn Write, report: &DetailedReport) -> Result<()> {
    writeln!(out, "Recommendations (generated {})", report.generated_at.to_rfc3339())?;
    if report.recommendations.is_empty() {
        writeln!(out, "  none")?;
    }
    for note in &report.recommendations {
        writeln!(out, "  - {note}")?;
    }
    Ok(())
}

fn write_trajectory(out: &mut dyn Write, result: &RunView) -> Result<()> {
    let rows: Vec<Vec<String>> = result
        .trajectory
        .iter()
        .zip(result.abs_errors.iter().zip(&result.rel_errors))
        .enumerate()
        .map(|(k, (p, (abs, rel)))| vec![k.to_string(), point(p), opt(*abs), opt(*rel)])
        .collect();
    write_table(out, &["k", "z", "|f(z)|", "rel. step"], &rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(function: &str, z0: ComplexNumber, z1: ComplexNumber) -> SolveArgs {
        SolveArgs {
            solver: SolverArgs {
                function: function.to_string(),
                tolerance: None,
                max_iterations: None,
                strategy: None,
                derivative_fallback: false,
                seed: None,
            },
            z0,
            z1,
            report: false,
            trajectory: false,
        }
    }

    #[test]
    fn test_solve_json() {
        let settings = Settings {
            format: OutputFormat::Json,
            ..Default::default()
        };
        let mut buf = Vec::new();
        run(
            &args("z**2 - 4", ComplexNumber::real(1.0), ComplexNumber::real(3.0)),
            &settings,
            &mut buf,
        )
        .unwrap();

        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["result"]["converged"], true);
        assert_eq!(json["result"]["trajectory"][2]["real"], 1.75);
        assert!(json["run_id"].as_str().unwrap().len() >= 32);
    }

    #[test]
    fn test_solve_table_with_report() {
        let mut solve = args("exp(z)", ComplexNumber::ZERO, ComplexNumber::ONE);
        solve.solver.max_iterations = Some(5);
        solve.report = true;
        solve.trajectory = true;

        let mut buf = Vec::new();
        run(&solve, &Settings::default(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Converged"));
        assert!(text.contains("false"));
        assert!(text.contains("Increase max_iterations"));
        assert!(text.contains("│ k "));
    }

    #[test]
    fn test_solve_rejects_bad_expression() {
        let mut buf = Vec::new();
        let err = run(
            &args("z +", ComplexNumber::ZERO, ComplexNumber::ONE),
            &Settings::default(),
            &mut buf,
        )
        .unwrap_err();
        assert!(err.to_string().contains("z +"));
        assert!(buf.is_empty());
    }
}
