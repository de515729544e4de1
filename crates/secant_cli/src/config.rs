//! CLI settings management
//!
//! Settings are resolved from defaults, an optional TOML file, `SECANT_*`
//! environment variables and command-line flags, in increasing priority.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use secant_core::search::{RegionSpec, SearchOptions};
use secant_core::sensitivity::SensitivityOptions;
use secant_core::solver::{CycleStrategy, SolverConfig};
use serde::Deserialize;
use thiserror::Error;

/// Settings error types
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Unknown log level name.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Unknown output format name.
    #[error("Invalid output format: {0}. Must be one of: json, table")]
    InvalidFormat(String),

    /// The settings file could not be read or parsed.
    #[error("Configuration file error: {0}")]
    FileError(String),

    /// An environment variable held an unusable value.
    #[error("Environment variable {name}: {reason}")]
    EnvError {
        /// Variable name
        name: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// Resolved solver, search or sensitivity settings are invalid.
    #[error("Invalid settings: {0}")]
    Invalid(#[from] secant_core::types::ConfigError),
}

/// Log levels accepted by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Every recovery and step
    Trace,
    /// Cycle events and run summaries
    Debug,
    /// Run and search summaries
    Info,
    /// Evaluation failures only
    #[default]
    Warn,
    /// Errors only
    Error,
}

impl FromStr for LogLevel {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(SettingsError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Output formats for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

impl FromStr for OutputFormat {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(SettingsError::InvalidFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Default region and deduplication settings for `search`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Lower real bound
    pub x_min: f64,
    /// Upper real bound
    pub x_max: f64,
    /// Lower imaginary bound
    pub y_min: f64,
    /// Upper imaginary bound
    pub y_max: f64,
    /// Grid points per axis
    pub points_per_axis: usize,
    /// Merge radius for distinct roots
    pub min_distance: f64,
    /// Fan runs out over the thread pool
    pub parallel: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        let region = RegionSpec::default();
        let options = SearchOptions::default();
        Self {
            x_min: region.x_min,
            x_max: region.x_max,
            y_min: region.y_min,
            y_max: region.y_max,
            points_per_axis: region.points_per_axis,
            min_distance: options.min_distance,
            parallel: options.parallel,
        }
    }
}

impl SearchSettings {
    /// The configured region.
    pub fn region(&self) -> RegionSpec {
        RegionSpec {
            x_min: self.x_min,
            x_max: self.x_max,
            y_min: self.y_min,
            y_max: self.y_max,
            points_per_axis: self.points_per_axis,
        }
    }

    /// The configured search options.
    pub fn options(&self) -> SearchOptions {
        SearchOptions {
            min_distance: self.min_distance,
            parallel: self.parallel,
        }
    }
}

/// Resolved CLI settings
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log level
    #[serde(deserialize_with = "deserialise_log_level")]
    pub log_level: LogLevel,
    /// Output format
    #[serde(deserialize_with = "deserialise_format")]
    pub format: OutputFormat,
    /// Solver defaults; the expression is usually given per command
    pub solver: SolverConfig,
    /// Region search defaults
    pub search: SearchSettings,
    /// Sensitivity analysis defaults
    pub sensitivity: SensitivityOptions,
}

fn deserialise_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s).map_err(serde::de::Error::custom)
}

fn deserialise_format<'de, D>(deserializer: D) -> Result<OutputFormat, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    OutputFormat::from_str(&s).map_err(serde::de::Error::custom)
}

/// Environment variables read by [`Settings::apply_env`].
pub const ENV_VARS: [&str; 9] = [
    "SECANT_LOG_LEVEL",
    "SECANT_FORMAT",
    "SECANT_TOLERANCE",
    "SECANT_MAX_ITERATIONS",
    "SECANT_STRATEGY",
    "SECANT_SEED",
    "SECANT_DERIVATIVE_FALLBACK",
    "SECANT_PARALLEL",
    "SECANT_MIN_DISTANCE",
];

fn parse_env<T: FromStr>(name: &'static str, value: &str) -> Result<T, SettingsError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| SettingsError::EnvError {
        name,
        reason: e.to_string(),
    })
}

impl Settings {
    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::FileError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        toml::from_str(content)
            .map_err(|e| SettingsError::FileError(format!("Failed to parse TOML: {}", e)))
    }

    /// Override fields from `SECANT_*` variables found by `lookup`.
    ///
    /// Unset variables leave the field untouched; set but unparsable ones
    /// are errors rather than silently ignored.
    pub fn apply_env<L>(&mut self, lookup: L) -> Result<(), SettingsError>
    where
        L: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SECANT_LOG_LEVEL") {
            self.log_level = LogLevel::from_str(&v)?;
        }
        if let Some(v) = lookup("SECANT_FORMAT") {
            self.format = OutputFormat::from_str(&v)?;
        }
        if let Some(v) = lookup("SECANT_TOLERANCE") {
            self.solver.tolerance = parse_env("SECANT_TOLERANCE", &v)?;
        }
        if let Some(v) = lookup("SECANT_MAX_ITERATIONS") {
            self.solver.max_iterations = parse_env("SECANT_MAX_ITERATIONS", &v)?;
        }
        if let Some(v) = lookup("SECANT_STRATEGY") {
            self.solver.cycle_strategy = parse_env::<CycleStrategy>("SECANT_STRATEGY", &v)?;
        }
        if let Some(v) = lookup("SECANT_SEED") {
            self.solver.seed = parse_env("SECANT_SEED", &v)?;
        }
        if let Some(v) = lookup("SECANT_DERIVATIVE_FALLBACK") {
            self.solver.use_numeric_derivative_fallback =
                parse_env("SECANT_DERIVATIVE_FALLBACK", &v.to_lowercase())?;
        }
        if let Some(v) = lookup("SECANT_PARALLEL") {
            self.search.parallel = parse_env("SECANT_PARALLEL", &v.to_lowercase())?;
        }
        if let Some(v) = lookup("SECANT_MIN_DISTANCE") {
            self.search.min_distance = parse_env("SECANT_MIN_DISTANCE", &v)?;
        }
        Ok(())
    }

    /// Validate the numeric settings
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.solver.validate()?;
        self.search.region().validate()?;
        self.search.options().validate()?;
        self.sensitivity.validate()?;
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), SettingsError> {
        if let Some(level) = &cli.log_level {
            self.log_level = LogLevel::from_str(level)?;
        }
        if let Some(format) = &cli.format {
            self.format = OutputFormat::from_str(format)?;
        }
        Ok(())
    }
}

/// Global CLI arguments that feed settings resolution
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Settings file path
    pub config_file: Option<PathBuf>,
    /// Log level override
    pub log_level: Option<String>,
    /// Output format override
    pub format: Option<String>,
}

/// Build settings from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Settings file
/// 4. Default values
pub fn build_settings(cli: &CliArgs) -> Result<Settings, SettingsError> {
    build_settings_with_env(cli, |name| std::env::var(name).ok())
}

/// [`build_settings`] with an explicit environment lookup.
pub fn build_settings_with_env<L>(cli: &CliArgs, lookup: L) -> Result<Settings, SettingsError>
where
    L: Fn(&str) -> Option<String>,
{
    let mut settings = match &cli.config_file {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    settings.apply_env(lookup)?;
    settings.merge_with_cli(cli)?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.log_level, LogLevel::Warn);
        assert_eq!(settings.format, OutputFormat::Table);
        assert_eq!(settings.solver.tolerance, 1e-12);
        assert_eq!(settings.solver.max_iterations, 200);
        assert_eq!(settings.solver.cycle_strategy, CycleStrategy::HybridPerturbation);
        assert_eq!(settings.search.points_per_axis, 30);
        assert_eq!(settings.search.min_distance, 0.05);
        assert!(settings.search.parallel);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("Info").unwrap(), LogLevel::Info);
        assert!(LogLevel::from_str("loud").is_err());
    }

    #[test]
    fn test_format_parsing_and_display() {
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Table);
        assert!(OutputFormat::from_str("csv").is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_toml_deserialisation() {
        let settings = Settings::from_toml(
            r#"
            log_level = "debug"
            format = "json"

            [solver]
            tolerance = 1e-10
            max_iterations = 500
            cycle_strategy = "adaptive"
            seed = 7

            [search]
            points_per_axis = 12
            parallel = false

            [sensitivity]
            noise_levels = [1e-6, 1e-3]
            samples_per_level = 3
            "#,
        )
        .unwrap();

        assert_eq!(settings.log_level, LogLevel::Debug);
        assert_eq!(settings.format, OutputFormat::Json);
        assert_eq!(settings.solver.tolerance, 1e-10);
        assert_eq!(settings.solver.max_iterations, 500);
        assert_eq!(settings.solver.cycle_strategy, CycleStrategy::Adaptive);
        assert_eq!(settings.solver.seed, 7);
        assert_eq!(settings.search.points_per_axis, 12);
        assert!(!settings.search.parallel);
        assert_eq!(settings.search.min_distance, 0.05);
        assert_eq!(settings.sensitivity.noise_levels, vec![1e-6, 1e-3]);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml("[solver]\nseed = 9\n").unwrap();
        assert_eq!(settings.solver.seed, 9);
        assert_eq!(settings.solver.tolerance, 1e-12);
        assert_eq!(settings.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_bad_toml_value() {
        assert!(matches!(
            Settings::from_toml("log_level = \"loud\""),
            Err(SettingsError::FileError(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings
            .apply_env(env(&[
                ("SECANT_TOLERANCE", "1e-8"),
                ("SECANT_STRATEGY", "reset"),
                ("SECANT_PARALLEL", "FALSE"),
                ("SECANT_FORMAT", "json"),
            ]))
            .unwrap();
        assert_eq!(settings.solver.tolerance, 1e-8);
        assert_eq!(settings.solver.cycle_strategy, CycleStrategy::Reset);
        assert!(!settings.search.parallel);
        assert_eq!(settings.format, OutputFormat::Json);
    }

    #[test]
    fn test_bad_env_value_is_an_error() {
        let mut settings = Settings::default();
        let err = settings
            .apply_env(env(&[("SECANT_MAX_ITERATIONS", "many")]))
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::EnvError {
                name: "SECANT_MAX_ITERATIONS",
                ..
            }
        ));
    }

    #[test]
    fn test_cli_takes_precedence_over_env() {
        let cli = CliArgs {
            config_file: None,
            log_level: Some("error".to_string()),
            format: None,
        };
        let settings = build_settings_with_env(
            &cli,
            env(&[("SECANT_LOG_LEVEL", "trace"), ("SECANT_FORMAT", "json")]),
        )
        .unwrap();
        assert_eq!(settings.log_level, LogLevel::Error);
        assert_eq!(settings.format, OutputFormat::Json);
    }

    #[test]
    fn test_invalid_resolved_settings() {
        let err = build_settings_with_env(&CliArgs::default(), env(&[("SECANT_TOLERANCE", "0")]))
            .unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));
    }

    #[test]
    fn test_missing_file() {
        let cli = CliArgs {
            config_file: Some(PathBuf::from("/nonexistent/secant.toml")),
            ..Default::default()
        };
        assert!(matches!(
            build_settings_with_env(&cli, |_| None),
            Err(SettingsError::FileError(_))
        ));
    }
}
