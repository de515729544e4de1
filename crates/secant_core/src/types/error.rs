//! Error types for structured error handling.
//!
//! This module provides:
//! - `EvalFailure`: the function is undefined at a requested point
//! - `ExpressionError`: an expression failed lexing, parsing or whitelisting
//! - `ConfigError`: configuration-time validation failures
//! - `EngineError`: misuse of the session API (missing configure, unknown run)
//!
//! Only `ConfigError` and `EngineError` ever reach a caller as `Err`. An
//! `EvalFailure` inside a run is captured in the run's result.

use thiserror::Error;

/// The function could not be evaluated at a point.
///
/// Produced by the function adapter whenever an internal numerical fault
/// occurs. Callers treat it as "function undefined here".
///
/// # Examples
/// ```
/// use secant_core::types::EvalFailure;
///
/// let err = EvalFailure::Domain { function: "log" };
/// assert_eq!(format!("{}", err), "log is undefined at this point");
/// ```
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum EvalFailure {
    /// Divisor modulus below the division floor.
    #[error("division by near-zero value (|divisor| = {modulus:.3e})")]
    DivisionByZero {
        /// Modulus of the rejected divisor
        modulus: f64,
    },

    /// A function was applied outside its domain.
    #[error("{function} is undefined at this point")]
    Domain {
        /// Function name
        function: &'static str,
    },

    /// An intermediate or final value overflowed or became NaN.
    #[error("non-finite value produced by {operation}")]
    NonFinite {
        /// Operation that produced the value
        operation: &'static str,
    },
}

/// Expression rejected while compiling.
///
/// `position` is the byte offset into the source text.
///
/// # Examples
/// ```
/// use secant_core::types::ExpressionError;
///
/// let err = ExpressionError::UnknownIdentifier { name: "os".to_string(), position: 0 };
/// assert!(format!("{}", err).contains("'os'"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    /// The expression is empty or whitespace only.
    #[error("expression is empty")]
    Empty,

    /// A character outside the grammar.
    #[error("unexpected character '{found}' at position {position}")]
    UnexpectedCharacter {
        /// The character
        found: char,
        /// Byte offset
        position: usize,
    },

    /// A numeric literal that does not parse.
    #[error("malformed number '{text}' at position {position}")]
    MalformedNumber {
        /// Literal text
        text: String,
        /// Byte offset
        position: usize,
    },

    /// An identifier that is not a whitelisted variable, constant or function.
    #[error("unknown identifier '{name}' at position {position}")]
    UnknownIdentifier {
        /// Identifier text
        name: String,
        /// Byte offset
        position: usize,
    },

    /// A token in a place the grammar does not allow it.
    #[error("unexpected {found} at position {position}, expected {expected}")]
    UnexpectedToken {
        /// Description of the token found
        found: String,
        /// What the parser was looking for
        expected: &'static str,
        /// Byte offset
        position: usize,
    },

    /// The expression nests deeper than the compiler allows.
    #[error("expression nesting exceeds {limit} levels")]
    TooDeep {
        /// Maximum nesting depth
        limit: usize,
    },

    /// The expression chains more binary operators than the compiler allows.
    #[error("expression has more than {limit} binary operators")]
    TooManyOperators {
        /// Maximum operator count
        limit: usize,
    },
}

/// Configuration-time validation failure.
///
/// Rejected before any iteration runs.
///
/// # Examples
/// ```
/// use secant_core::types::ConfigError;
///
/// let err = ConfigError::InvalidTolerance(0.0);
/// assert!(format!("{}", err).contains("tolerance"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The function expression failed to compile.
    #[error("invalid function expression '{expression}': {source}")]
    InvalidExpression {
        /// Offending expression text
        expression: String,
        /// Compiler diagnostic
        #[source]
        source: ExpressionError,
    },

    /// Tolerance is not a finite positive number.
    #[error("tolerance must be a finite positive number, got {0}")]
    InvalidTolerance(f64),

    /// Maximum iteration count is zero.
    #[error("max_iterations must be > 0")]
    InvalidMaxIterations,

    /// Unknown cycle strategy name.
    #[error("unknown cycle strategy '{0}'")]
    UnknownStrategy(String),

    /// A search region whose bounds are empty or non-finite.
    #[error("invalid region: {0}")]
    InvalidRegion(String),

    /// A non-positive or non-finite deduplication distance.
    #[error("min_distance must be a finite positive number, got {0}")]
    InvalidMinDistance(f64),

    /// A sensitivity request with unusable noise levels or sample count.
    #[error("invalid sensitivity request: {0}")]
    InvalidSensitivity(String),

    /// Unknown pathological function family.
    #[error("unknown pathological function '{0}'")]
    UnknownPathological(String),

    /// A generator parameter outside its accepted range.
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Rejected value
        value: f64,
        /// Accepted range
        reason: &'static str,
    },
}

/// Session-level API misuse.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Execute/Search called before Configure.
    #[error("solver not configured; call configure first")]
    NotConfigured,

    /// Sensitivity analysis requested before a successful Execute.
    #[error("no converged run available; execute a run before analysing sensitivity")]
    NoPriorRun,

    /// Report requested for an unknown run id.
    #[error("run '{0}' not found")]
    RunNotFound(String),

    /// Seed values that are NaN or infinite.
    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    /// Wrapped configuration failure.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
