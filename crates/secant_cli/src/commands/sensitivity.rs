//! Sensitivity command implementation
//!
//! Solves once, then re-solves from noisy starting points around the root
//! and classifies how far the root moves.

use std::io::Write;

use clap::Args;
use secant_core::report::SensitivityView;
use secant_core::sensitivity::SensitivityOptions;
use secant_core::types::ComplexNumber;
use tracing::warn;

use super::configured_engine;
use crate::args::{parse_complex, SolverArgs};
use crate::config::{OutputFormat, Settings};
use crate::output::{opt, point, write_fields, write_json, write_table};
use crate::{CliError, Result};

/// Arguments of `secant sensitivity`.
#[derive(Debug, Clone, Args)]
pub struct SensitivityArgs {
    #[command(flatten)]
    pub solver: SolverArgs,

    /// First seed of the reference run
    #[arg(long, value_parser = parse_complex, allow_hyphen_values = true)]
    pub z0: ComplexNumber,

    /// Second seed of the reference run
    #[arg(long, value_parser = parse_complex, allow_hyphen_values = true)]
    pub z1: ComplexNumber,

    /// Analyse this point instead of the reference root
    #[arg(long, value_parser = parse_complex, allow_hyphen_values = true)]
    pub root: Option<ComplexNumber>,

    /// Comma-separated noise magnitudes
    #[arg(long, value_delimiter = ',')]
    pub noise_levels: Option<Vec<f64>>,

    /// Samples per noise level
    #[arg(long)]
    pub samples: Option<usize>,
}

impl SensitivityArgs {
    fn options(&self, base: &SensitivityOptions) -> SensitivityOptions {
        SensitivityOptions {
            noise_levels: self
                .noise_levels
                .clone()
                .unwrap_or_else(|| base.noise_levels.clone()),
            samples_per_level: self.samples.unwrap_or(base.samples_per_level),
        }
    }
}

/// Run the sensitivity command
pub fn run(args: &SensitivityArgs, settings: &Settings, out: &mut dyn Write) -> Result<()> {
    let mut engine = configured_engine(args.solver.apply(&settings.solver))?;
    let execution = engine.execute(args.z0, args.z1)?;
    if !execution.result.converged {
        return Err(CliError::InvalidArgument(format!(
            "reference run from z0={} z1={} did not converge; try other seeds",
            args.z0, args.z1
        )));
    }

    let root = match args.root {
        Some(root) => root,
        None => engine
            .run(&execution.run_id)
            .map(|result| result.root)
            .ok_or_else(|| CliError::InvalidArgument("reference run was not recorded".into()))?,
    };

    let view = engine.analyse_sensitivity(root, &args.options(&settings.sensitivity))?;
    if view.levels.iter().any(|level| level.converged < level.samples) {
        warn!("some perturbed runs did not converge");
    }

    match settings.format {
        OutputFormat::Json => write_json(out, &view),
        OutputFormat::Table => write_sensitivity(out, &view),
    }
}

fn write_sensitivity(out: &mut dyn Write, view: &SensitivityView) -> Result<()> {
    write_fields(
        out,
        "Sensitivity analysis",
        &[
            ("Root", point(&view.root)),
            ("|f(root)|", opt(view.function_value)),
            ("Samples/level", view.samples_per_level.to_string()),
            ("Global sensitivity", opt(view.global_sensitivity)),
            ("Stability", view.stability.to_string()),
        ],
    )?;

    let rows: Vec<Vec<String>> = view
        .levels
        .iter()
        .map(|level| {
            vec![
                format!("{:e}", level.noise_level),
                opt(level.mean_shift),
                opt(level.std_shift),
                opt(level.min_shift),
                opt(level.max_shift),
                format!("{}/{}", level.converged, level.samples),
            ]
        })
        .collect();
    write_table(
        out,
        &["Noise", "Mean shift", "Std", "Min", "Max", "Converged"],
        &rows,
    )
}
