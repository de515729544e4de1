//! Core value and error types.
//!
//! This module provides:
//! - `complex`: the [`ComplexNumber`] value type with checked division
//! - `error`: structured error types for evaluation, configuration and the session API
//!
//! # Re-exports
//!
//! For convenience, commonly used types are re-exported at this module level:
//! - [`ComplexNumber`] from `complex`
//! - [`EvalFailure`], [`ExpressionError`], [`ConfigError`], [`EngineError`] from `error`

pub mod complex;
pub mod error;

pub use complex::{ComplexNumber, DIVISION_EPSILON};
pub use error::{ConfigError, EngineError, EvalFailure, ExpressionError};
