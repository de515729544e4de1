//! # secant_cli: Command Line Interface for the Secant Engine
//!
//! Library half of the `secant` binary. Commands write to any
//! [`std::io::Write`], so they can be driven from tests as well as `main`.
//!
//! # Commands
//!
//! - `secant solve` - Run the solver from one seed pair
//! - `secant search` - Find distinct roots over a rectangular region
//! - `secant sensitivity` - Solve, then measure root stability under noise
//! - `secant examples` - List (and optionally solve) the example catalogue
//! - `secant pathological` - Generate a hard test function
//! - `secant check` - Show resolved settings and validate an expression

pub mod args;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use error::{CliError, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
