//! Search command implementation
//!
//! Samples a rectangle of seed pairs and reports the distinct roots found.

use std::io::Write;

use clap::Args;
use secant_core::report::SearchView;
use secant_core::search::{RegionSpec, SearchOptions};

use super::configured_engine;
use crate::args::SolverArgs;
use crate::config::{OutputFormat, Settings};
use crate::output::{opt, write_fields, write_json, write_table};
use crate::Result;

/// Arguments of `secant search`.
#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    #[command(flatten)]
    pub solver: SolverArgs,

    /// Search the square [-W, W]² (overrides the configured bounds)
    #[arg(long, value_name = "W")]
    pub half_width: Option<f64>,

    /// Lower real bound
    #[arg(long, allow_hyphen_values = true)]
    pub x_min: Option<f64>,

    /// Upper real bound
    #[arg(long, allow_hyphen_values = true)]
    pub x_max: Option<f64>,

    /// Lower imaginary bound
    #[arg(long, allow_hyphen_values = true)]
    pub y_min: Option<f64>,

    /// Upper imaginary bound
    #[arg(long, allow_hyphen_values = true)]
    pub y_max: Option<f64>,

    /// Grid points per axis
    #[arg(short = 'n', long)]
    pub points: Option<usize>,

    /// Roots closer than this are merged
    #[arg(long)]
    pub min_distance: Option<f64>,

    /// Run seed pairs sequentially
    #[arg(long)]
    pub serial: bool,
}

impl SearchArgs {
    /// Region and options after applying overrides to the settings.
    pub fn resolve(&self, settings: &Settings) -> (RegionSpec, SearchOptions) {
        let mut region = settings.search.region();
        let mut options = settings.search.options();

        if let Some(w) = self.half_width {
            region = RegionSpec::square(w, region.points_per_axis);
        }
        region.x_min = self.x_min.unwrap_or(region.x_min);
        region.x_max = self.x_max.unwrap_or(region.x_max);
        region.y_min = self.y_min.unwrap_or(region.y_min);
        region.y_max = self.y_max.unwrap_or(region.y_max);
        region.points_per_axis = self.points.unwrap_or(region.points_per_axis);

        options.min_distance = self.min_distance.unwrap_or(options.min_distance);
        if self.serial {
            options.parallel = false;
        }
        (region, options)
    }
}

/// Run the search command
pub fn run(args: &SearchArgs, settings: &Settings, out: &mut dyn Write) -> Result<()> {
    let engine = configured_engine(args.solver.apply(&settings.solver))?;
    let (region, options) = args.resolve(settings);
    let view = engine.search(&region, &options)?;

    match settings.format {
        OutputFormat::Json => write_json(out, &view),
        OutputFormat::Table => write_search(out, &args.solver.function, &view),
    }
}

fn write_search(out: &mut dyn Write, function: &str, view: &SearchView) -> Result<()> {
    let r = &view.region;
    write_fields(
        out,
        "Region search",
        &[
            ("Function", function.to_string()),
            (
                "Region",
                format!("[{}, {}] x [{}, {}]", r.x_min, r.x_max, r.y_min, r.y_max),
            ),
            ("Seed pairs", view.points_processed.to_string()),
            ("Converged", view.runs_converged.to_string()),
            ("Distinct roots", view.total_roots.to_string()),
            ("Min distance", view.min_distance.to_string()),
            ("Parallel", view.parallel.to_string()),
            ("Elapsed", format!("{:.3} s", view.search_time_seconds)),
        ],
    )?;

    let rows: Vec<Vec<String>> = view
        .roots
        .iter()
        .enumerate()
        .map(|(k, root)| {
            vec![
                (k + 1).to_string(),
                root.real.map_or_else(|| "-".to_string(), |v| format!("{v:.10}")),
                root.imag.map_or_else(|| "-".to_string(), |v| format!("{v:.10}")),
                opt(root.magnitude),
                opt(root.error),
                root.times_found.to_string(),
            ]
        })
        .collect();
    write_table(out, &["#", "Re", "Im", "|z|", "|f(z)|", "Found"], &rows)
}
