//! Complex value type used throughout the engine.
//!
//! [`ComplexNumber`] is a plain `(re, im)` pair of `f64`. Addition,
//! subtraction, multiplication and negation are ordinary operator impls;
//! division is deliberately *not* an operator. Use
//! [`ComplexNumber::checked_div`], which reports a near-zero divisor as
//! [`EvalFailure::DivisionByZero`] instead of producing infinities.
//!
//! Conversions to and from `num_complex::Complex64` let the expression
//! compiler reuse its transcendental functions.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::error::EvalFailure;

/// Divisors with a modulus below this value are treated as zero.
pub const DIVISION_EPSILON: f64 = 1e-300;

/// Immutable complex number `re + im·i`.
///
/// # Examples
///
/// ```
/// use secant_core::types::ComplexNumber;
///
/// let a = ComplexNumber::new(3.0, 4.0);
/// assert_eq!(a.abs(), 5.0);
///
/// let b = ComplexNumber::new(1.0, -1.0);
/// let sum = a + b;
/// assert_eq!(sum, ComplexNumber::new(4.0, 3.0));
///
/// assert!(a.checked_div(ComplexNumber::ZERO).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ComplexNumber {
    /// Real part
    pub re: f64,
    /// Imaginary part
    pub im: f64,
}

impl ComplexNumber {
    /// `0 + 0i`
    pub const ZERO: Self = Self { re: 0.0, im: 0.0 };
    /// `1 + 0i`
    pub const ONE: Self = Self { re: 1.0, im: 0.0 };
    /// `0 + 1i`
    pub const I: Self = Self { re: 0.0, im: 1.0 };

    /// Creates a complex number from its parts.
    #[inline]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Creates a purely real number.
    #[inline]
    pub const fn real(re: f64) -> Self {
        Self { re, im: 0.0 }
    }

    /// Creates a number from modulus and argument.
    #[inline]
    pub fn from_polar(modulus: f64, angle: f64) -> Self {
        Self::new(modulus * angle.cos(), modulus * angle.sin())
    }

    /// Modulus `|z|`, computed without intermediate overflow.
    #[inline]
    pub fn abs(self) -> f64 {
        self.re.hypot(self.im)
    }

    /// Argument in `(-π, π]`.
    #[inline]
    pub fn arg(self) -> f64 {
        self.im.atan2(self.re)
    }

    /// Complex conjugate.
    #[inline]
    pub fn conj(self) -> Self {
        Self::new(self.re, -self.im)
    }

    /// Multiplies both parts by a real factor.
    #[inline]
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.re * factor, self.im * factor)
    }

    /// True when both parts are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).abs()
    }

    /// Divides by `rhs`, failing when `|rhs|` is below [`DIVISION_EPSILON`].
    ///
    /// Uses Smith's algorithm so that well-scaled operands do not overflow
    /// in the intermediate products. Purely real operands divide exactly.
    pub fn checked_div(self, rhs: Self) -> Result<Self, EvalFailure> {
        let modulus = rhs.abs();
        if !(modulus >= DIVISION_EPSILON) {
            return Err(EvalFailure::DivisionByZero { modulus });
        }

        let (a, b, c, d) = (self.re, self.im, rhs.re, rhs.im);
        let quotient = if c.abs() >= d.abs() {
            let r = d / c;
            let den = c + d * r;
            Self::new((a + b * r) / den, (b - a * r) / den)
        } else {
            let r = c / d;
            let den = c * r + d;
            Self::new((a * r + b) / den, (b * r - a) / den)
        };

        if quotient.is_finite() {
            Ok(quotient)
        } else {
            Err(EvalFailure::NonFinite {
                operation: "division",
            })
        }
    }

    /// Reciprocal `1 / self`.
    #[inline]
    pub fn checked_recip(self) -> Result<Self, EvalFailure> {
        Self::ONE.checked_div(self)
    }

    /// Integer power by repeated squaring. Negative exponents go through
    /// [`checked_recip`](Self::checked_recip).
    pub fn powi(self, exponent: i32) -> Result<Self, EvalFailure> {
        let mut base = if exponent < 0 {
            self.checked_recip()?
        } else {
            self
        };
        let mut n = exponent.unsigned_abs();
        let mut acc = Self::ONE;
        while n > 0 {
            if n & 1 == 1 {
                acc = acc * base;
            }
            n >>= 1;
            if n > 0 {
                base = base * base;
            }
        }
        Ok(acc)
    }
}

impl From<Complex64> for ComplexNumber {
    #[inline]
    fn from(value: Complex64) -> Self {
        Self::new(value.re, value.im)
    }
}

impl From<ComplexNumber> for Complex64 {
    #[inline]
    fn from(value: ComplexNumber) -> Self {
        Complex64::new(value.re, value.im)
    }
}

impl From<f64> for ComplexNumber {
    #[inline]
    fn from(value: f64) -> Self {
        Self::real(value)
    }
}

impl Add for ComplexNumber {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for ComplexNumber {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for ComplexNumber {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Neg for ComplexNumber {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.re, -self.im)
    }
}

impl fmt::Display for ComplexNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im.is_sign_negative() {
            write!(f, "{}-{}i", self.re, -self.im)
        } else {
            write!(f, "{}+{}i", self.re, self.im)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_arithmetic() {
        let a = ComplexNumber::new(1.0, 2.0);
        let b = ComplexNumber::new(3.0, -1.0);

        assert_eq!(a + b, ComplexNumber::new(4.0, 1.0));
        assert_eq!(a - b, ComplexNumber::new(-2.0, 3.0));
        assert_eq!(a * b, ComplexNumber::new(5.0, 5.0));
        assert_eq!(-a, ComplexNumber::new(-1.0, -2.0));
    }

    #[test]
    fn test_checked_div_real_is_exact() {
        let q = ComplexNumber::real(10.0)
            .checked_div(ComplexNumber::real(8.0))
            .unwrap();
        assert_eq!(q, ComplexNumber::real(1.25));
    }

    #[test]
    fn test_checked_div_complex() {
        let a = ComplexNumber::new(5.0, 5.0);
        let b = ComplexNumber::new(3.0, -1.0);
        let q = a.checked_div(b).unwrap();
        assert_relative_eq!(q.re, 1.0, epsilon = 1e-15);
        assert_relative_eq!(q.im, 2.0, epsilon = 1e-15);
    }

    #[test]
    fn test_checked_div_by_zero_fails() {
        let err = ComplexNumber::ONE
            .checked_div(ComplexNumber::ZERO)
            .unwrap_err();
        assert!(matches!(err, EvalFailure::DivisionByZero { .. }));
    }

    #[test]
    fn test_checked_div_nan_divisor_fails() {
        let nan = ComplexNumber::new(f64::NAN, 0.0);
        assert!(ComplexNumber::ONE.checked_div(nan).is_err());
    }

    #[test]
    fn test_powi() {
        let z = ComplexNumber::new(0.0, 1.0);
        assert_eq!(z.powi(2).unwrap(), ComplexNumber::new(-1.0, 0.0));
        assert_eq!(ComplexNumber::real(3.0).powi(3).unwrap(), ComplexNumber::real(27.0));
        assert_eq!(ComplexNumber::real(2.0).powi(-1).unwrap(), ComplexNumber::real(0.5));
        assert_eq!(ComplexNumber::real(7.0).powi(0).unwrap(), ComplexNumber::ONE);
        assert!(ComplexNumber::ZERO.powi(-2).is_err());
    }

    #[test]
    fn test_modulus_and_polar() {
        let z = ComplexNumber::from_polar(2.0, std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(z.abs(), 2.0, epsilon = 1e-15);
        assert_relative_eq!(z.arg(), std::f64::consts::FRAC_PI_2, epsilon = 1e-15);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ComplexNumber::new(1.5, -2.0)), "1.5-2i");
        assert_eq!(format!("{}", ComplexNumber::new(0.0, 3.0)), "0+3i");
    }

    #[test]
    fn test_complex64_round_trip() {
        let z = ComplexNumber::new(0.25, -4.0);
        let c: Complex64 = z.into();
        assert_eq!(ComplexNumber::from(c), z);
    }
}
