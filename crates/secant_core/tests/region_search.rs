//! Integration tests for multi-root region search.

use approx::assert_relative_eq;
use secant_core::prelude::*;
use secant_core::search::FoundRoot;

fn cubic_solver() -> Solver {
    Solver::configure(SolverConfig::new("z**3 - 1")).unwrap()
}

fn locations(roots: &[FoundRoot]) -> Vec<(f64, f64, usize)> {
    roots
        .iter()
        .map(|r| (r.value.re, r.value.im, r.times_found))
        .collect()
}

/// Cube roots of unity over [-2, 2]²: exactly three distinct roots.
#[test]
fn test_cubic_finds_three_roots() {
    let outcome = search_region(
        &cubic_solver(),
        &RegionSpec::square(2.0, 30),
        &SearchOptions {
            min_distance: 0.05,
            parallel: true,
        },
    )
    .unwrap();

    assert_eq!(outcome.points_processed, 900);
    assert_eq!(outcome.total_roots, 3);
    for root in &outcome.roots {
        assert!(root.times_found >= 1);
        assert_relative_eq!(root.value.abs(), 1.0, epsilon = 1e-9);
        assert!(root.best_error <= 1e-12);
    }

    let mut args: Vec<f64> = outcome.roots.iter().map(|r| r.value.arg()).collect();
    args.sort_by(f64::total_cmp);
    let third = 2.0 * std::f64::consts::PI / 3.0;
    assert_relative_eq!(args[0], -third, epsilon = 1e-9);
    assert_relative_eq!(args[1], 0.0, epsilon = 1e-9);
    assert_relative_eq!(args[2], third, epsilon = 1e-9);
}

/// Parallel and serial searches fold in grid order and agree exactly.
#[test]
fn test_parallel_matches_serial() {
    let solver = cubic_solver();
    let region = RegionSpec::square(2.0, 30);

    let parallel = search_region(
        &solver,
        &region,
        &SearchOptions {
            min_distance: 0.05,
            parallel: true,
        },
    )
    .unwrap();
    let serial = search_region(
        &solver,
        &region,
        &SearchOptions {
            min_distance: 0.05,
            parallel: false,
        },
    )
    .unwrap();

    assert_eq!(locations(&parallel.roots), locations(&serial.roots));
    assert_eq!(parallel.runs_converged, serial.runs_converged);
}

/// A quartic with four real roots, searched on a rectangle.
#[test]
fn test_quartic_on_rectangle() {
    let solver = Solver::configure(SolverConfig::new("z**4 - 5*z**2 + 4")).unwrap();
    let region = RegionSpec {
        x_min: -3.0,
        x_max: 3.0,
        y_min: -1.0,
        y_max: 1.0,
        points_per_axis: 20,
    };
    let outcome = search_region(&solver, &region, &SearchOptions::default()).unwrap();

    let mut reals: Vec<f64> = outcome.roots.iter().map(|r| r.value.re).collect();
    reals.sort_by(f64::total_cmp);
    assert_eq!(reals.len(), 4);
    for (found, expected) in reals.iter().zip([-2.0, -1.0, 1.0, 2.0]) {
        assert_relative_eq!(*found, expected, epsilon = 1e-9);
    }
    for root in &outcome.roots {
        assert!(root.value.im.abs() < 1e-9);
    }
}

/// A larger merge radius collapses more discoveries.
#[test]
fn test_min_distance_controls_merging() {
    let solver = cubic_solver();
    let region = RegionSpec::square(2.0, 12);
    let coarse = search_region(
        &solver,
        &region,
        &SearchOptions {
            min_distance: 5.0,
            parallel: false,
        },
    )
    .unwrap();
    assert_eq!(coarse.total_roots, 1);
    assert_eq!(coarse.roots[0].times_found, coarse.runs_converged);
}
