//! CLI command implementations
//!
//! Each submodule implements a specific CLI command.

pub mod check;
pub mod examples;
pub mod pathological;
pub mod search;
pub mod sensitivity;
pub mod solve;

use secant_core::engine::Engine;
use secant_core::solver::SolverConfig;
use tracing::debug;

use crate::Result;

/// A fresh engine bound to `config`.
pub(crate) fn configured_engine(config: SolverConfig) -> Result<Engine> {
    let mut engine = Engine::new();
    let ack = engine.configure(config)?;
    debug!(expression = %ack.function_expression, "engine ready");
    Ok(engine)
}
