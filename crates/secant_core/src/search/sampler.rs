//! Fan-out / fan-in region search.

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::region::RegionSpec;
use super::root_set::{FoundRoot, RootSet};
use crate::rng::SolverRng;
use crate::solver::Solver;
use crate::types::{ComplexNumber, ConfigError};

/// Region search options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Converged roots closer than this are the same root.
    pub min_distance: f64,
    /// Run seed pairs on the rayon thread pool.
    pub parallel: bool,
}

impl Default for SearchOptions {
    /// `min_distance = 0.05`, parallel.
    fn default() -> Self {
        Self {
            min_distance: 0.05,
            parallel: true,
        }
    }
}

impl SearchOptions {
    /// Checks the merge radius.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_distance.is_finite() && self.min_distance > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidMinDistance(self.min_distance))
        }
    }
}

/// Outcome of a region search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Distinct roots in key order.
    pub roots: Vec<FoundRoot>,
    /// `roots.len()`
    pub total_roots: usize,
    /// Seed pairs run.
    pub points_processed: usize,
    /// Seed pairs whose run converged.
    pub runs_converged: usize,
    /// Wall-clock duration of the search.
    pub search_time_seconds: f64,
    /// Region searched.
    pub region: RegionSpec,
    /// Options used.
    pub options: SearchOptions,
}

/// Searches `region` for distinct roots.
///
/// Every grid point `p` is paired with `p + 0.02 + 0.02i` and solved
/// independently with a random source derived from the configured seed and
/// the point's grid index. Results are folded in grid order, so parallel and
/// serial searches return the same roots.
///
/// # Errors
///
/// [`ConfigError::InvalidRegion`] or [`ConfigError::InvalidMinDistance`].
pub fn search_region(
    solver: &Solver,
    region: &RegionSpec,
    options: &SearchOptions,
) -> Result<SearchOutcome, ConfigError> {
    region.validate()?;
    options.validate()?;

    let start = Instant::now();
    let base = SolverRng::from_seed(solver.config().seed);
    let seeds = region.seed_pairs();

    // Only converged runs contribute; trajectories are dropped on the worker.
    let run_one = |(index, &(z0, z1)): (usize, &(ComplexNumber, ComplexNumber))| {
        let mut rng = base.derive(index as u64);
        let result = solver.run_with_rng(z0, z1, &mut rng);
        result.converged.then(|| {
            FoundRoot::new(
                result.root,
                result.final_abs_error,
                result.iterations,
                result.cycles_detected,
            )
        })
    };

    let runs: Vec<Option<FoundRoot>> = if options.parallel {
        seeds.par_iter().enumerate().map(run_one).collect()
    } else {
        seeds.iter().enumerate().map(run_one).collect()
    };

    let mut roots = RootSet::new(options.min_distance);
    let mut runs_converged = 0;
    for found in runs.into_iter().flatten() {
        runs_converged += 1;
        roots.insert(found);
    }

    let search_time_seconds = start.elapsed().as_secs_f64();
    let roots = roots.into_vec();
    info!(
        expression = %solver.config().function_expression,
        points = seeds.len(),
        converged = runs_converged,
        distinct = roots.len(),
        parallel = options.parallel,
        elapsed_s = search_time_seconds,
        "region search complete"
    );

    Ok(SearchOutcome {
        total_roots: roots.len(),
        roots,
        points_processed: seeds.len(),
        runs_converged,
        search_time_seconds,
        region: *region,
        options: *options,
    })
}
