//! Criterion benchmarks for the secant solver and region search.
//!
//! Measures expression compilation, single runs across recovery strategies,
//! and serial versus parallel region search at increasing grid sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use secant_core::prelude::*;

/// Benchmark expression compilation and evaluation.
fn bench_function_adapter(c: &mut Criterion) {
    let mut group = c.benchmark_group("function_adapter");

    for expression in ["z**3 - 1", "sin(z) - z/2", "z**4 - 5*z**2 + 4"] {
        group.bench_with_input(
            BenchmarkId::new("compile", expression),
            &expression,
            |b, expression| {
                b.iter(|| CompiledFunction::compile(black_box(expression)).unwrap());
            },
        );

        let f = CompiledFunction::compile(expression).unwrap();
        group.bench_with_input(BenchmarkId::new("evaluate", expression), &f, |b, f| {
            let z = ComplexNumber::new(0.3, 0.7);
            b.iter(|| f.evaluate(black_box(z)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark a single run under each cycle strategy.
fn bench_single_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_run");

    for strategy in CycleStrategy::ALL {
        let solver =
            Solver::configure(SolverConfig::new("z**3 - 1").with_strategy(strategy)).unwrap();
        group.bench_with_input(
            BenchmarkId::new("cubic", strategy.as_str()),
            &solver,
            |b, solver| {
                let z0 = ComplexNumber::new(-0.5, 0.5);
                let z1 = ComplexNumber::new(-1.0, 0.0);
                b.iter(|| solver.run(black_box(z0), black_box(z1)));
            },
        );
    }

    // Forced zero denominator exercises the cycle guard.
    let solver = Solver::configure(SolverConfig::new("z**2 + 1")).unwrap();
    group.bench_function("zero_denominator", |b| {
        b.iter(|| solver.run(black_box(ComplexNumber::real(-1.0)), ComplexNumber::ONE));
    });

    group.finish();
}

/// Benchmark serial vs parallel region search.
fn bench_region_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("region_search");
    group.sample_size(10);

    let solver = Solver::configure(SolverConfig::new("z**3 - 1")).unwrap();
    for points in [10, 20, 30] {
        let region = RegionSpec::square(2.0, points);
        for parallel in [false, true] {
            let options = SearchOptions {
                min_distance: 0.05,
                parallel,
            };
            let label = if parallel { "parallel" } else { "serial" };
            group.bench_with_input(BenchmarkId::new(label, points), &region, |b, region| {
                b.iter(|| search_region(&solver, black_box(region), &options).unwrap());
            });
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_function_adapter,
    bench_single_run,
    bench_region_search
);
criterion_main!(benches);
