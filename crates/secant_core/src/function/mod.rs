//! Complex function adapter.
//!
//! Turns a textual expression in `z` into a callable that never panics and
//! never returns a non-finite value. The expression is validated against a
//! fixed whitelist and compiled once; evaluation afterwards is a walk over a
//! tree of boxed closures.
//!
//! ## Accepted grammar
//!
//! - Literals: `2`, `0.5`, `1e-3`, imaginary literals `2j` / `3.5i`
//! - Variable: `z`
//! - Constants: `pi`, `e`, `i`, `j`
//! - Operators: `+ - * /`, unary `±`, `^` and `**` (right-associative)
//! - Functions: `sin cos tan sinh cosh tanh exp log ln sqrt abs conj`,
//!   optionally prefixed with `cmath.`, `np.` or `numpy.`
//!
//! ## Examples
//!
//! ```
//! use secant_core::function::{CompiledFunction, ComplexFunction};
//! use secant_core::types::ComplexNumber;
//!
//! let f = CompiledFunction::compile("z**2 - 4").unwrap();
//! assert_eq!(f.evaluate(ComplexNumber::real(3.0)).unwrap(), ComplexNumber::real(5.0));
//!
//! // Anything outside the whitelist is rejected up front.
//! assert!(CompiledFunction::compile("__import__('os')").is_err());
//! ```

mod compiler;
mod lexer;
mod parser;

use std::fmt;

use crate::types::{ComplexNumber, ConfigError, EvalFailure};

pub use parser::{MAX_DEPTH, MAX_OPERATORS};

/// A complex-valued function of one complex variable.
///
/// Implemented by [`CompiledFunction`] and by any closure
/// `Fn(ComplexNumber) -> Result<ComplexNumber, EvalFailure>`, so tests and
/// wrappers such as [`ShiftedFunction`] plug into the iterator directly.
pub trait ComplexFunction: Send + Sync {
    /// Evaluates the function at `z`.
    fn evaluate(&self, z: ComplexNumber) -> Result<ComplexNumber, EvalFailure>;
}

impl<F> ComplexFunction for F
where
    F: Fn(ComplexNumber) -> Result<ComplexNumber, EvalFailure> + Send + Sync,
{
    #[inline]
    fn evaluate(&self, z: ComplexNumber) -> Result<ComplexNumber, EvalFailure> {
        self(z)
    }
}

/// An expression compiled against the whitelist.
///
/// Immutable after construction. Share it across threads behind an `Arc`.
pub struct CompiledFunction {
    expression: String,
    root: compiler::Node,
}

impl CompiledFunction {
    /// Validates and compiles `expression`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidExpression`] naming the offending token
    /// and its byte position.
    pub fn compile(expression: &str) -> Result<Self, ConfigError> {
        let invalid = |source| ConfigError::InvalidExpression {
            expression: expression.to_string(),
            source,
        };

        let tokens = lexer::tokenize(expression).map_err(invalid)?;
        let tree = parser::parse(&tokens, expression.len()).map_err(invalid)?;

        Ok(Self {
            expression: expression.to_string(),
            root: compiler::compile(&tree),
        })
    }

    /// Source text the function was compiled from.
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl ComplexFunction for CompiledFunction {
    #[inline]
    fn evaluate(&self, z: ComplexNumber) -> Result<ComplexNumber, EvalFailure> {
        (self.root)(z)
    }
}

impl fmt::Debug for CompiledFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFunction")
            .field("expression", &self.expression)
            .finish_non_exhaustive()
    }
}

/// `f(z) - offset`, the noisy problem solved during sensitivity analysis.
pub struct ShiftedFunction<'a, F: ComplexFunction + ?Sized> {
    inner: &'a F,
    offset: ComplexNumber,
}

impl<'a, F: ComplexFunction + ?Sized> ShiftedFunction<'a, F> {
    /// Wraps `inner`, subtracting `offset` from every value.
    pub fn new(inner: &'a F, offset: ComplexNumber) -> Self {
        Self { inner, offset }
    }
}

impl<F: ComplexFunction + ?Sized> ComplexFunction for ShiftedFunction<'_, F> {
    fn evaluate(&self, z: ComplexNumber) -> Result<ComplexNumber, EvalFailure> {
        let value = self.inner.evaluate(z)? - self.offset;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvalFailure::NonFinite {
                operation: "shift",
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExpressionError;
    use approx::assert_relative_eq;

    #[test]
    fn test_compile_and_evaluate() {
        let f = CompiledFunction::compile("z**3 - 1").unwrap();
        assert_eq!(f.expression(), "z**3 - 1");
        assert_eq!(f.evaluate(ComplexNumber::ONE).unwrap(), ComplexNumber::ZERO);

        let w = ComplexNumber::from_polar(1.0, 2.0 * std::f64::consts::PI / 3.0);
        let v = f.evaluate(w).unwrap();
        assert!(v.abs() < 1e-14);
    }

    #[test]
    fn test_catalogue_style_prefixes() {
        let f = CompiledFunction::compile("cmath.sin(z) - z/2").unwrap();
        let v = f.evaluate(ComplexNumber::ZERO).unwrap();
        assert_eq!(v, ComplexNumber::ZERO);

        let g = CompiledFunction::compile("np.exp(z) - 1").unwrap();
        assert_relative_eq!(g.evaluate(ComplexNumber::ONE).unwrap().re, std::f64::consts::E - 1.0);
    }

    #[test]
    fn test_invalid_expression_reports_position() {
        let err = CompiledFunction::compile("z + os.system").unwrap_err();
        match err {
            ConfigError::InvalidExpression { expression, source } => {
                assert_eq!(expression, "z + os.system");
                assert_eq!(
                    source,
                    ExpressionError::UnknownIdentifier {
                        name: "os.system".to_string(),
                        position: 4
                    }
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_expression() {
        assert!(matches!(
            CompiledFunction::compile("   ").unwrap_err(),
            ConfigError::InvalidExpression {
                source: ExpressionError::Empty,
                ..
            }
        ));
    }

    #[test]
    fn test_long_chain_rejected_as_config_error() {
        let expression = format!("z{}", " - 0.0001".repeat(3000));
        assert!(matches!(
            CompiledFunction::compile(&expression).unwrap_err(),
            ConfigError::InvalidExpression {
                source: ExpressionError::TooManyOperators { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_moderate_chain_compiles() {
        let expression = format!("z{}", " - 0.0001".repeat(500));
        let f = CompiledFunction::compile(&expression).unwrap();
        let v = f.evaluate(ComplexNumber::ONE).unwrap();
        assert!((v.re - 0.95).abs() < 1e-9, "v = {}", v);
        assert_eq!(v.im, 0.0);
    }

    #[test]
    fn test_closure_implements_trait() {
        let f = |z: ComplexNumber| -> Result<ComplexNumber, EvalFailure> { Ok(z * z) };
        let v = f.evaluate(ComplexNumber::I).unwrap();
        assert_eq!(v, ComplexNumber::real(-1.0));
    }

    #[test]
    fn test_shifted_function() {
        let f = CompiledFunction::compile("z - 2").unwrap();
        let shifted = ShiftedFunction::new(&f, ComplexNumber::new(0.5, 0.5));
        assert_eq!(
            shifted.evaluate(ComplexNumber::real(2.0)).unwrap(),
            ComplexNumber::new(-0.5, -0.5)
        );
    }

    #[test]
    fn test_compiled_function_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompiledFunction>();
    }
}
