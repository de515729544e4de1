//! # secant_core: Complex Secant Root-Finding Engine
//!
//! ## Layers
//!
//! secant_core is organised bottom-up, each layer depending only on the ones
//! above it in this list:
//! - Value and error types: `ComplexNumber`, `EvalFailure`, `ConfigError` (`types`)
//! - Function adapter: whitelisted expression compiler and the `ComplexFunction` seam (`function`)
//! - Seeded random source (`rng`)
//! - Secant iterator with cycle detection and recovery (`solver`)
//! - Multi-root region search with deduplication (`search`)
//! - Perturbation-based sensitivity analysis (`sensitivity`)
//! - Serialisable views and detailed reports (`report`)
//! - Example catalogue and pathological generators (`catalog`)
//! - Session facade with history and statistics (`engine`)
//!
//! ## Error Model
//!
//! Only configuration and session misuse are errors. A run that fails to
//! converge, hits a cycle, or evaluates the function outside its domain
//! still yields a complete `RunResult` describing what happened.
//!
//! ## Usage Examples
//!
//! ```rust
//! use secant_core::prelude::*;
//!
//! let solver = Solver::configure(SolverConfig::new("z**3 - 1")).unwrap();
//!
//! // Single run
//! let result = solver.run(ComplexNumber::new(-0.5, 0.5), ComplexNumber::new(-1.0, 0.0));
//! assert!(result.converged);
//! assert_eq!(result.trajectory.len(), result.iterations + 1);
//!
//! // Region search
//! let outcome = search_region(&solver, &RegionSpec::square(2.0, 10), &SearchOptions::default()).unwrap();
//! assert!(outcome.total_roots <= 3);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod catalog;
pub mod engine;
pub mod function;
pub mod report;
pub mod rng;
pub mod search;
pub mod sensitivity;
pub mod solver;
pub mod types;

/// Commonly used items.
pub mod prelude {
    pub use crate::engine::Engine;
    pub use crate::function::{CompiledFunction, ComplexFunction};
    pub use crate::rng::SolverRng;
    pub use crate::search::{search_region, RegionSpec, SearchOptions};
    pub use crate::sensitivity::{analyse, SensitivityOptions, StabilityClass};
    pub use crate::solver::{ConvergenceKind, CycleStrategy, RunResult, Solver, SolverConfig};
    pub use crate::types::{ComplexNumber, ConfigError, EngineError, EvalFailure};
}
