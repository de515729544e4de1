//! Check command implementation
//!
//! Prints the resolved settings and, optionally, whether an expression
//! compiles and what it evaluates to at a evaluation point.

use std::io::Write;

use clap::Args;
use secant_core::function::{CompiledFunction, ComplexFunction};
use secant_core::report::PointView;
use secant_core::solver::SolverConfig;
use secant_core::types::ComplexNumber;
use serde::Serialize;

use crate::args::parse_complex;
use crate::config::{OutputFormat, Settings, ENV_VARS};
use crate::output::{point, write_fields, write_json};
use crate::Result;

/// Arguments of `secant check`.
#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    /// Expression to validate
    #[arg(short, long = "function", value_name = "EXPR")]
    pub function: Option<String>,

    /// Point at which to evaluate the expression
    #[arg(long, value_parser = parse_complex, allow_hyphen_values = true, default_value = "1")]
    pub at: ComplexNumber,
}

/// Compilation and evaluation outcome for one expression.
#[derive(Debug, Clone, Serialize)]
pub struct ExpressionCheck {
    /// The expression checked
    pub expression: String,
    /// Whether it compiled
    pub valid: bool,
    /// Compile error, if any
    pub error: Option<String>,
    /// Evaluation point
    pub at: PointView,
    /// Value at the evaluation point
    pub value: Option<PointView>,
    /// Evaluation failure at the evaluation point
    pub evaluation_error: Option<String>,
}

/// Everything `check` reports.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// Crate version
    pub version: &'static str,
    /// Log level after layering
    pub log_level: String,
    /// Output format after layering
    pub format: String,
    /// Solver defaults after layering
    pub solver: SolverConfig,
    /// Search region bounds `[x_min, x_max, y_min, y_max]`
    pub search_region: [f64; 4],
    /// Grid points per axis
    pub points_per_axis: usize,
    /// Root merge radius
    pub min_distance: f64,
    /// Parallel search
    pub parallel: bool,
    /// Sensitivity noise levels
    pub noise_levels: Vec<f64>,
    /// Sensitivity samples per level
    pub samples_per_level: usize,
    /// `SECANT_*` variables present in the environment
    pub env_overrides: Vec<&'static str>,
    /// Expression check, when requested
    pub expression: Option<ExpressionCheck>,
}

/// Compiles `expression` and evaluates it at `at`.
pub fn check_expression(expression: &str, at: ComplexNumber) -> ExpressionCheck {
    let mut check = ExpressionCheck {
        expression: expression.to_string(),
        valid: false,
        error: None,
        at: at.into(),
        value: None,
        evaluation_error: None,
    };
    match CompiledFunction::compile(expression) {
        Ok(function) => {
            check.valid = true;
            match function.evaluate(at) {
                Ok(value) => check.value = Some(value.into()),
                Err(e) => check.evaluation_error = Some(e.to_string()),
            }
        }
        Err(e) => check.error = Some(e.to_string()),
    }
    check
}

/// Builds the report; `lookup` decides which variables count as set.
pub fn build_report<L>(args: &CheckArgs, settings: &Settings, lookup: L) -> CheckReport
where
    L: Fn(&str) -> Option<String>,
{
    let s = &settings.search;
    CheckReport {
        version: crate::VERSION,
        log_level: settings.log_level.to_string(),
        format: settings.format.to_string(),
        solver: settings.solver.clone(),
        search_region: [s.x_min, s.x_max, s.y_min, s.y_max],
        points_per_axis: s.points_per_axis,
        min_distance: s.min_distance,
        parallel: s.parallel,
        noise_levels: settings.sensitivity.noise_levels.clone(),
        samples_per_level: settings.sensitivity.samples_per_level,
        env_overrides: ENV_VARS
            .iter()
            .copied()
            .filter(|name| lookup(name).is_some())
            .collect(),
        expression: args
            .function
            .as_deref()
            .map(|expr| check_expression(expr, args.at)),
    }
}

/// Run the check command
pub fn run(args: &CheckArgs, settings: &Settings, out: &mut dyn Write) -> Result<()> {
    let report = build_report(args, settings, |name| std::env::var(name).ok());

    match settings.format {
        OutputFormat::Json => write_json(out, &report),
        OutputFormat::Table => {
            let r = report.search_region;
            let env = if report.env_overrides.is_empty() {
                "none".to_string()
            } else {
                report.env_overrides.join(", ")
            };
            write_fields(
                out,
                &format!("secant {}", report.version),
                &[
                    ("Log level", report.log_level.clone()),
                    ("Format", report.format.clone()),
                    ("Tolerance", format!("{:e}", report.solver.tolerance)),
                    ("Max iterations", report.solver.max_iterations.to_string()),
                    ("Strategy", report.solver.cycle_strategy.to_string()),
                    (
                        "Derivative fallback",
                        report.solver.use_numeric_derivative_fallback.to_string(),
                    ),
                    ("Seed", report.solver.seed.to_string()),
                    ("Region", format!("[{}, {}] x [{}, {}]", r[0], r[1], r[2], r[3])),
                    ("Points/axis", report.points_per_axis.to_string()),
                    ("Min distance", report.min_distance.to_string()),
                    ("Parallel", report.parallel.to_string()),
                    ("Noise levels", format!("{:?}", report.noise_levels)),
                    ("Samples/level", report.samples_per_level.to_string()),
                    ("Environment", env),
                ],
            )?;

            if let Some(check) = &report.expression {
                let mut fields = vec![
                    ("Expression", check.expression.clone()),
                    ("Valid", check.valid.to_string()),
                ];
                if let Some(error) = &check.error {
                    fields.push(("Error", error.clone()));
                }
                if let Some(value) = &check.value {
                    fields.push(("Value", format!("f({}) = {}", point(&check.at), point(value))));
                }
                if let Some(error) = &check.evaluation_error {
                    fields.push(("Evaluation", error.clone()));
                }
                write_fields(out, "Expression check", &fields)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(function: Option<&str>) -> CheckArgs {
        CheckArgs {
            function: function.map(str::to_string),
            at: ComplexNumber::ONE,
        }
    }

    #[test]
    fn test_valid_expression() {
        let check = check_expression("z**2 - 4", ComplexNumber::real(3.0));
        assert!(check.valid);
        let value = check.value.unwrap();
        assert_eq!(value.real, Some(5.0));
        assert_eq!(value.imag, Some(0.0));
    }

    #[test]
    fn test_invalid_expression() {
        let check = check_expression("z +* 1", ComplexNumber::ONE);
        assert!(!check.valid);
        assert!(check.error.is_some());
        assert!(check.value.is_none());
    }

    #[test]
    fn test_evaluation_failure_at_pole() {
        let check = check_expression("1/z", ComplexNumber::ZERO);
        assert!(check.valid);
        assert!(check.value.is_none());
        assert!(check.evaluation_error.is_some());
    }

    #[test]
    fn test_env_overrides_listed() {
        let lookup = |name: &str| (name == "SECANT_SEED").then(|| "1".to_string());
        let report = build_report(&args(None), &Settings::default(), lookup);
        assert_eq!(report.env_overrides, vec!["SECANT_SEED"]);
        assert!(report.expression.is_none());
        assert_eq!(report.log_level, "warn");
    }

    #[test]
    fn test_table_output() {
        let mut buf = Vec::new();
        run(&args(Some("sin(z)")), &Settings::default(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Max iterations"));
        assert!(text.contains("Expression check"));
        assert!(text.contains("Valid"));
    }
}
