//! secant - complex root finding from the command line
//!
//! Settings are layered: defaults, then the `--config` TOML file, then
//! `SECANT_*` environment variables, then global flags. Logs go to stderr so
//! JSON on stdout stays machine-readable.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use secant_cli::commands::{
    self, check::CheckArgs, examples::ExamplesArgs, pathological::PathologicalArgs,
    search::SearchArgs, sensitivity::SensitivityArgs, solve::SolveArgs,
};
use secant_cli::config::{build_settings, CliArgs, LogLevel};

/// Complex secant root-finding engine
#[derive(Parser)]
#[command(name = "secant")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (TOML)
    #[arg(short, long, global = true, env = "SECANT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short = 'l', long, global = true)]
    log_level: Option<String>,

    /// Output format (table, json)
    #[arg(short = 'o', long, global = true)]
    format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the solver once from a seed pair
    Solve(SolveArgs),

    /// Find distinct roots over a rectangular region
    Search(SearchArgs),

    /// Solve, then measure root stability under noise
    Sensitivity(SensitivityArgs),

    /// List the example catalogue
    Examples(ExamplesArgs),

    /// Generate a function that is hard for the secant method
    Pathological(PathologicalArgs),

    /// Show resolved settings and validate an expression
    Check(CheckArgs),
}

fn init_tracing(level: LogLevel) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.as_filter_str())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = build_settings(&CliArgs {
        config_file: cli.config.clone(),
        log_level: cli.log_level.clone(),
        format: cli.format.clone(),
    })
    .context("failed to resolve settings")?;

    init_tracing(settings.log_level);
    tracing::debug!(
        version = secant_cli::VERSION,
        log_level = %settings.log_level,
        format = %settings.format,
        "settings resolved"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let (name, outcome) = match &cli.command {
        Commands::Solve(args) => ("solve", commands::solve::run(args, &settings, &mut out)),
        Commands::Search(args) => ("search", commands::search::run(args, &settings, &mut out)),
        Commands::Sensitivity(args) => (
            "sensitivity",
            commands::sensitivity::run(args, &settings, &mut out),
        ),
        Commands::Examples(args) => (
            "examples",
            commands::examples::run(args, &settings, &mut out),
        ),
        Commands::Pathological(args) => (
            "pathological",
            commands::pathological::run(args, &settings, &mut out),
        ),
        Commands::Check(args) => ("check", commands::check::run(args, &settings, &mut out)),
    };
    outcome.with_context(|| format!("{name} failed"))?;
    out.flush().context("failed to flush output")?;
    Ok(())
}
