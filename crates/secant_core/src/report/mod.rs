//! Externally consumed records.
//!
//! Every view is built from a borrowed result and copies what it needs, so
//! reporting never mutates solver output. Non-finite floats serialise as
//! `null`.

mod detailed;
mod views;

pub use detailed::{
    recommendations, ConvergenceAnalysis, DetailedReport, LONG_TRAJECTORY,
    PRECISION_NOTE_THRESHOLD,
};
pub use views::{
    finite, ConfigAck, LevelView, PointView, RootView, RunView, SearchView, SensitivityRunView,
    SensitivityView,
};

use serde::Serialize;

/// Outcome of a single session execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionReport {
    /// Identifier for later `report` lookups
    pub run_id: String,
    /// The run
    pub result: RunView,
    /// Wall-clock seconds spent in the solver
    pub elapsed_seconds: f64,
}
