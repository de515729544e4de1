//! Drives the command implementations the way `main` does, with settings
//! resolved from TOML and an explicit environment.

use approx::assert_abs_diff_eq;
use secant_cli::args::{parse_complex, SolverArgs};
use secant_cli::commands::{search, sensitivity, solve};
use secant_cli::config::{build_settings_with_env, CliArgs, OutputFormat, Settings};
use secant_core::solver::CycleStrategy;

fn solver_args(function: &str) -> SolverArgs {
    SolverArgs {
        function: function.to_string(),
        tolerance: None,
        max_iterations: None,
        strategy: None,
        derivative_fallback: false,
        seed: None,
    }
}

fn json(settings: &Settings) -> Settings {
    Settings {
        format: OutputFormat::Json,
        ..settings.clone()
    }
}

#[test]
fn test_settings_layering_reaches_the_solver() {
    let dir = std::env::temp_dir().join(format!("secant-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("settings.toml");
    std::fs::write(
        &path,
        r#"
log_level = "info"

[solver]
max_iterations = 7
cycle_strategy = "hybrid"
"#,
    )
    .unwrap();

    let cli = CliArgs {
        config_file: Some(path),
        log_level: None,
        format: Some("json".to_string()),
    };
    let env = |name: &str| (name == "SECANT_MAX_ITERATIONS").then(|| "9".to_string());
    let settings = build_settings_with_env(&cli, env).unwrap();
    std::fs::remove_dir_all(&dir).ok();

    assert_eq!(settings.solver.max_iterations, 9);
    assert_eq!(settings.solver.cycle_strategy, CycleStrategy::Hybrid);
    assert_eq!(settings.format, OutputFormat::Json);

    let args = solve::SolveArgs {
        solver: solver_args("exp(z)"),
        z0: parse_complex("0").unwrap(),
        z1: parse_complex("1").unwrap(),
        report: false,
        trajectory: false,
    };
    let mut buf = Vec::new();
    solve::run(&args, &settings, &mut buf).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    assert_eq!(value["result"]["converged"], false);
    assert!(value["result"]["iterations"].as_u64().unwrap() <= 9);
    assert_eq!(value["result"]["config"]["max_iterations"], 9);
    assert_eq!(value["result"]["config"]["cycle_strategy"], "hybrid");
}

#[test]
fn test_solve_finds_complex_root() {
    let args = solve::SolveArgs {
        solver: solver_args("z**2 + 1"),
        z0: parse_complex("0.5+0.5i").unwrap(),
        z1: parse_complex("1,1").unwrap(),
        report: true,
        trajectory: false,
    };
    let mut buf = Vec::new();
    solve::run(&args, &json(&Settings::default()), &mut buf).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

    let root = &value["result"]["root"];
    assert_abs_diff_eq!(root["real"].as_f64().unwrap(), 0.0, epsilon = 1e-8);
    assert_abs_diff_eq!(root["imag"].as_f64().unwrap(), 1.0, epsilon = 1e-8);
    assert!(value["recommendations"].is_array());
    assert!(value["generated_at"].is_string());
}

#[test]
fn test_search_roots_lie_on_unit_circle() {
    let args = search::SearchArgs {
        solver: solver_args("z**4 - 1"),
        half_width: Some(1.5),
        x_min: None,
        x_max: None,
        y_min: None,
        y_max: None,
        points: Some(12),
        min_distance: None,
        serial: false,
    };
    let mut buf = Vec::new();
    search::run(&args, &json(&Settings::default()), &mut buf).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

    let roots = value["roots"].as_array().unwrap();
    assert_eq!(roots.len(), 4);
    for root in roots {
        assert_abs_diff_eq!(root["magnitude"].as_f64().unwrap(), 1.0, epsilon = 1e-8);
    }
}

#[test]
fn test_sensitivity_of_double_root_exceeds_simple_root() {
    let run = |function: &str| {
        let args = sensitivity::SensitivityArgs {
            solver: solver_args(function),
            z0: parse_complex("0.5").unwrap(),
            z1: parse_complex("1.2").unwrap(),
            root: Some(parse_complex("1").unwrap()),
            noise_levels: Some(vec![1e-4]),
            samples: Some(10),
        };
        let mut buf = Vec::new();
        sensitivity::run(&args, &json(&Settings::default()), &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        value["global_sensitivity"].as_f64().unwrap()
    };

    let simple = run("z - 1");
    let double = run("(z - 1)**2");
    assert!(double > simple, "double {double} <= simple {simple}");
}
