//! Multi-root search over a rectangular region.
//!
//! This module provides:
//! - [`RegionSpec`]: the sampled rectangle and its seed grid
//! - [`RootSet`] / [`FoundRoot`]: near-duplicate collapsing of converged roots
//! - [`search_region`]: independent runs per grid point, optionally on rayon
//!
//! Discovery is heuristic. A root whose basin of attraction misses every
//! grid point is not reported.

mod region;
mod root_set;
mod sampler;

pub use region::{RegionSpec, SEED_OFFSET};
pub use root_set::{FoundRoot, RootKey, RootSet};
pub use sampler::{search_region, SearchOptions, SearchOutcome};
