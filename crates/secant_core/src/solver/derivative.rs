//! Central-difference derivative used when a secant step degenerates.

use crate::function::ComplexFunction;
use crate::types::ComplexNumber;

/// Relative difference step.
const DIFFERENCE_STEP: f64 = 1e-8;

/// Estimates `f'(z)` with the Wirtinger form `(∂f/∂x − i·∂f/∂y) / 2`.
///
/// Returns `None` if any sample fails to evaluate or the estimate is not
/// finite.
pub fn central_difference<F>(f: &F, z: ComplexNumber) -> Option<ComplexNumber>
where
    F: ComplexFunction + ?Sized,
{
    let h = DIFFERENCE_STEP * (1.0 + z.abs());
    let dx = ComplexNumber::real(h);
    let dy = ComplexNumber::new(0.0, h);

    let sample = |offset: ComplexNumber| f.evaluate(z + offset).ok();
    let df_dx = (sample(dx)? - sample(-dx)?).scale(0.5 / h);
    let df_dy = (sample(dy)? - sample(-dy)?).scale(0.5 / h);

    let derivative = (df_dx - ComplexNumber::I * df_dy).scale(0.5);
    derivative.is_finite().then_some(derivative)
}
