//! Lowers a parsed [`Expr`] into a tree of closures.
//!
//! Constant subtrees are folded once at compile time. Every node checks its
//! own output, so an overflow is reported by the operation that caused it.

use num_complex::Complex64;

use super::parser::{BinaryOp, Expr, Function};
use crate::types::{ComplexNumber, EvalFailure};

/// A compiled node: pure function of `z`.
pub(crate) type Node = Box<dyn Fn(ComplexNumber) -> Result<ComplexNumber, EvalFailure> + Send + Sync>;

/// Integer exponents up to this magnitude use repeated multiplication.
const MAX_INTEGER_EXPONENT: f64 = 1024.0;

pub(crate) fn compile(expr: &Expr) -> Node {
    lower(expr).node
}

/// A compiled subtree and whether it is free of `z`.
struct Lowered {
    node: Node,
    constant: bool,
}

fn lower(expr: &Expr) -> Lowered {
    let lowered = match expr {
        Expr::Const(value) => {
            let value = *value;
            return Lowered {
                node: Box::new(move |_| Ok(value)),
                constant: true,
            };
        }
        Expr::Var => {
            return Lowered {
                node: Box::new(Ok),
                constant: false,
            };
        }
        Expr::Neg(inner) => {
            let Lowered { node, constant } = lower(inner);
            Lowered {
                node: Box::new(move |z| node(z).map(|v| -v)),
                constant,
            }
        }
        Expr::Call(function, argument) => {
            let function = *function;
            let Lowered { node, constant } = lower(argument);
            Lowered {
                node: Box::new(move |z| apply_function(function, node(z)?)),
                constant,
            }
        }
        Expr::Binary(BinaryOp::Pow, base, exponent) => lower_power(base, exponent),
        Expr::Binary(op, lhs, rhs) => {
            let op = *op;
            let lhs = lower(lhs);
            let rhs = lower(rhs);
            let constant = lhs.constant && rhs.constant;
            let (lhs, rhs) = (lhs.node, rhs.node);
            Lowered {
                node: Box::new(move |z| apply_binary(op, lhs(z)?, rhs(z)?)),
                constant,
            }
        }
    };

    // Children are already folded, so this evaluation is constant time.
    // An undefined constant stays unfolded and fails at evaluation time.
    if lowered.constant {
        if let Ok(value) = (lowered.node)(ComplexNumber::ZERO) {
            return Lowered {
                node: Box::new(move |_| Ok(value)),
                constant: true,
            };
        }
    }
    lowered
}

fn lower_power(base: &Expr, exponent: &Expr) -> Lowered {
    let base = lower(base);
    let exponent = lower(exponent);
    let constant = base.constant && exponent.constant;
    let base_node = base.node;

    if exponent.constant {
        if let Some(n) = (exponent.node)(ComplexNumber::ZERO)
            .ok()
            .and_then(as_small_integer)
        {
            return Lowered {
                node: Box::new(move |z| {
                    let result = base_node(z)?.powi(n)?;
                    finite(result, "power")
                }),
                constant,
            };
        }
    }

    let exponent_node = exponent.node;
    Lowered {
        node: Box::new(move |z| complex_power(base_node(z)?, exponent_node(z)?)),
        constant,
    }
}

fn as_small_integer(value: ComplexNumber) -> Option<i32> {
    let integral = value.im == 0.0
        && value.re.fract() == 0.0
        && value.re.abs() <= MAX_INTEGER_EXPONENT;
    // Range checked above, so the cast is exact.
    integral.then_some(value.re as i32)
}

/// Direct tree walk, the reference the compiled closures are checked against.
#[cfg(test)]
pub(crate) fn evaluate_tree(expr: &Expr, z: ComplexNumber) -> Result<ComplexNumber, EvalFailure> {
    match expr {
        Expr::Const(value) => Ok(*value),
        Expr::Var => Ok(z),
        Expr::Neg(inner) => evaluate_tree(inner, z).map(|v| -v),
        Expr::Call(function, argument) => apply_function(*function, evaluate_tree(argument, z)?),
        Expr::Binary(BinaryOp::Pow, base, exponent) => {
            let base = evaluate_tree(base, z)?;
            let exponent = evaluate_tree(exponent, z)?;
            match as_small_integer(exponent) {
                Some(n) => finite(base.powi(n)?, "power"),
                None => complex_power(base, exponent),
            }
        }
        Expr::Binary(op, lhs, rhs) => {
            apply_binary(*op, evaluate_tree(lhs, z)?, evaluate_tree(rhs, z)?)
        }
    }
}

fn apply_binary(
    op: BinaryOp,
    lhs: ComplexNumber,
    rhs: ComplexNumber,
) -> Result<ComplexNumber, EvalFailure> {
    match op {
        BinaryOp::Add => finite(lhs + rhs, "addition"),
        BinaryOp::Sub => finite(lhs - rhs, "subtraction"),
        BinaryOp::Mul => finite(lhs * rhs, "multiplication"),
        BinaryOp::Div => lhs.checked_div(rhs),
        BinaryOp::Pow => complex_power(lhs, rhs),
    }
}

fn complex_power(base: ComplexNumber, exponent: ComplexNumber) -> Result<ComplexNumber, EvalFailure> {
    if base == ComplexNumber::ZERO {
        // 0^w is 0 for Re(w) > 0 and undefined otherwise.
        return if exponent.re > 0.0 {
            Ok(ComplexNumber::ZERO)
        } else {
            Err(EvalFailure::Domain { function: "power" })
        };
    }
    let value = Complex64::from(base).powc(Complex64::from(exponent));
    finite(value.into(), "power")
}

fn apply_function(function: Function, arg: ComplexNumber) -> Result<ComplexNumber, EvalFailure> {
    let c = Complex64::from(arg);
    let value: ComplexNumber = match function {
        Function::Sin => c.sin().into(),
        Function::Cos => c.cos().into(),
        Function::Tan => c.tan().into(),
        Function::Sinh => c.sinh().into(),
        Function::Cosh => c.cosh().into(),
        Function::Tanh => c.tanh().into(),
        Function::Exp => c.exp().into(),
        Function::Log => {
            if arg == ComplexNumber::ZERO {
                return Err(EvalFailure::Domain { function: "log" });
            }
            c.ln().into()
        }
        Function::Sqrt => c.sqrt().into(),
        Function::Abs => ComplexNumber::real(arg.abs()),
        Function::Conj => arg.conj(),
    };
    finite(value, function.name())
}

#[inline]
fn finite(value: ComplexNumber, operation: &'static str) -> Result<ComplexNumber, EvalFailure> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalFailure::NonFinite { operation })
    }
}
