//! Pathological command implementation
//!
//! Generates a member of one of the hard function families and optionally
//! runs the solver on it.

use std::io::Write;

use clap::Args;
use secant_core::catalog::{
    ill_conditioned, multimodal, oscillatory, weierstrass, PathologicalFunction, PathologicalKind,
};
use secant_core::report::ExecutionReport;
use secant_core::types::ComplexNumber;
use serde::Serialize;

use super::configured_engine;
use super::solve::write_execution;
use crate::args::{parse_complex, parse_kind};
use crate::config::{OutputFormat, Settings};
use crate::output::{write_fields, write_json};
use crate::{CliError, Result};

/// Arguments of `secant pathological`.
#[derive(Debug, Clone, Args)]
pub struct PathologicalArgs {
    /// Family: weierstrass, oscillatory, multimodal or ill_conditioned
    #[arg(value_parser = parse_kind)]
    pub kind: PathologicalKind,

    /// Weierstrass amplitude ratio in (0, 1)
    #[arg(long)]
    pub a: Option<f64>,

    /// Weierstrass frequency base
    #[arg(long)]
    pub b: Option<u32>,

    /// Weierstrass term count
    #[arg(long)]
    pub terms: Option<usize>,

    /// Oscillation frequency
    #[arg(long)]
    pub frequency: Option<f64>,

    /// Oscillation amplitude
    #[arg(long)]
    pub amplitude: Option<f64>,

    /// Number of roots for the multimodal family
    #[arg(long)]
    pub modes: Option<usize>,

    /// Condition number for the ill-conditioned family
    #[arg(long)]
    pub condition: Option<f64>,

    /// Run the solver on the generated function
    #[arg(long)]
    pub solve: bool,

    /// First seed when solving
    #[arg(long, value_parser = parse_complex, allow_hyphen_values = true, default_value = "0.5+0.5i")]
    pub z0: ComplexNumber,

    /// Second seed when solving
    #[arg(long, value_parser = parse_complex, allow_hyphen_values = true, default_value = "1")]
    pub z1: ComplexNumber,
}

impl PathologicalArgs {
    /// Generates the requested function, defaults filling unset parameters.
    pub fn generate(&self) -> Result<PathologicalFunction> {
        let defaults = self.kind.generate_default()?;
        let param = |name: &str| defaults.parameters.get(name).copied().unwrap_or_default();

        let generated = match self.kind {
            PathologicalKind::Weierstrass => weierstrass(
                self.a.unwrap_or_else(|| param("a")),
                self.b.unwrap_or(param("b") as u32),
                self.terms.unwrap_or(param("terms") as usize),
            )?,
            PathologicalKind::Oscillatory => oscillatory(
                self.frequency.unwrap_or_else(|| param("frequency")),
                self.amplitude.unwrap_or_else(|| param("amplitude")),
            )?,
            PathologicalKind::Multimodal => {
                multimodal(self.modes.unwrap_or(param("modes") as usize))?
            }
            PathologicalKind::IllConditioned => {
                ill_conditioned(self.condition.unwrap_or_else(|| param("condition")))?
            }
        };
        self.reject_foreign_parameters()?;
        Ok(generated)
    }

    fn reject_foreign_parameters(&self) -> Result<()> {
        let given: [(&str, bool, PathologicalKind); 7] = [
            ("a", self.a.is_some(), PathologicalKind::Weierstrass),
            ("b", self.b.is_some(), PathologicalKind::Weierstrass),
            ("terms", self.terms.is_some(), PathologicalKind::Weierstrass),
            ("frequency", self.frequency.is_some(), PathologicalKind::Oscillatory),
            ("amplitude", self.amplitude.is_some(), PathologicalKind::Oscillatory),
            ("modes", self.modes.is_some(), PathologicalKind::Multimodal),
            ("condition", self.condition.is_some(), PathologicalKind::IllConditioned),
        ];
        match given
            .iter()
            .find(|(_, set, owner)| *set && *owner != self.kind)
        {
            Some((name, _, owner)) => Err(CliError::InvalidArgument(format!(
                "--{name} applies to {owner}, not {}",
                self.kind
            ))),
            None => Ok(()),
        }
    }
}

#[derive(Serialize)]
struct PathologicalOutput<'a> {
    function: &'a PathologicalFunction,
    #[serde(skip_serializing_if = "Option::is_none")]
    execution: Option<&'a ExecutionReport>,
}

/// Run the pathological command
pub fn run(args: &PathologicalArgs, settings: &Settings, out: &mut dyn Write) -> Result<()> {
    let function = args.generate()?;

    let execution = if args.solve {
        let mut config = settings.solver.clone();
        config.function_expression = function.expression.clone();
        let mut engine = configured_engine(config)?;
        Some(engine.execute(args.z0, args.z1)?)
    } else {
        None
    };

    match settings.format {
        OutputFormat::Json => write_json(
            out,
            &PathologicalOutput {
                function: &function,
                execution: execution.as_ref(),
            },
        ),
        OutputFormat::Table => {
            let c = &function.characteristics;
            let parameters = function
                .parameters
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(", ");
            write_fields(
                out,
                &format!("Pathological function: {}", function.kind),
                &[
                    ("Description", function.description.clone()),
                    ("Parameters", parameters),
                    ("f(z)", function.expression.clone()),
                    ("Continuous", c.continuous.to_string()),
                    ("Differentiable", c.differentiable.to_string()),
                    ("Oscillatory", c.oscillatory.to_string()),
                    (
                        "Roots",
                        c.root_count.map_or_else(|| "unknown".to_string(), |n| n.to_string()),
                    ),
                    ("Difficulty", c.difficulty.to_string()),
                ],
            )?;
            if let Some(execution) = &execution {
                write_execution(out, execution)?;
            }
            Ok(())
        }
    }
}
