//! Recursive-descent parser producing the whitelisted expression tree.
//!
//! Grammar (lowest to highest precedence):
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary ('^' unary)?          right-associative
//! primary := NUMBER | IMAGINARY | constant | 'z'
//!          | function '(' expr ')' | '(' expr ')'
//! ```

use super::lexer::{Token, TokenKind};
use crate::types::{ComplexNumber, ExpressionError};

/// Maximum nesting depth accepted by the parser.
pub const MAX_DEPTH: usize = 64;

/// Maximum number of binary operators in one expression.
///
/// Chains like `a - b - c` parse iteratively but lower to a tree whose depth
/// grows with every operator.
pub const MAX_OPERATORS: usize = 512;

/// Whitelisted unary functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Log,
    Sqrt,
    Abs,
    Conj,
}

impl Function {
    /// Looks up a function by name, accepting `cmath.`, `np.` and `numpy.` prefixes.
    pub fn lookup(name: &str) -> Option<Self> {
        let bare = ["cmath.", "numpy.", "np."]
            .iter()
            .find_map(|prefix| name.strip_prefix(prefix))
            .unwrap_or(name);

        match bare {
            "sin" => Some(Function::Sin),
            "cos" => Some(Function::Cos),
            "tan" => Some(Function::Tan),
            "sinh" => Some(Function::Sinh),
            "cosh" => Some(Function::Cosh),
            "tanh" => Some(Function::Tanh),
            "exp" => Some(Function::Exp),
            "log" | "ln" => Some(Function::Log),
            "sqrt" => Some(Function::Sqrt),
            "abs" => Some(Function::Abs),
            "conj" | "conjugate" => Some(Function::Conj),
            _ => None,
        }
    }

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Sinh => "sinh",
            Function::Cosh => "cosh",
            Function::Tanh => "tanh",
            Function::Exp => "exp",
            Function::Log => "log",
            Function::Sqrt => "sqrt",
            Function::Abs => "abs",
            Function::Conj => "conj",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(ComplexNumber),
    Var,
    Neg(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(Function, Box<Expr>),
}

fn constant(name: &str) -> Option<ComplexNumber> {
    let bare = ["cmath.", "numpy.", "np."]
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name);

    match bare {
        "pi" => Some(ComplexNumber::real(std::f64::consts::PI)),
        "e" => Some(ComplexNumber::real(std::f64::consts::E)),
        "i" | "j" | "I" => Some(ComplexNumber::I),
        _ => None,
    }
}

/// Parses a token stream into an [`Expr`].
pub(crate) fn parse(tokens: &[Token], source_len: usize) -> Result<Expr, ExpressionError> {
    if tokens.is_empty() {
        return Err(ExpressionError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        operators: 0,
        source_len,
    };
    let expr = parser.expr()?;

    if let Some(token) = parser.peek() {
        return Err(ExpressionError::UnexpectedToken {
            found: token.kind.describe(),
            expected: "operator or end of input",
            position: token.position,
        });
    }

    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    operators: usize,
    source_len: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().map(|t| &t.kind) == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn enter(&mut self) -> Result<(), ExpressionError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExpressionError::TooDeep { limit: MAX_DEPTH });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn binary(&mut self, op: BinaryOp, lhs: Expr, rhs: Expr) -> Result<Expr, ExpressionError> {
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            return Err(ExpressionError::TooManyOperators {
                limit: MAX_OPERATORS,
            });
        }
        Ok(Expr::Binary(op, Box::new(lhs), Box::new(rhs)))
    }

    fn unexpected(&self, expected: &'static str) -> ExpressionError {
        match self.peek() {
            Some(token) => ExpressionError::UnexpectedToken {
                found: token.kind.describe(),
                expected,
                position: token.position,
            },
            None => ExpressionError::UnexpectedToken {
                found: "end of input".to_string(),
                expected,
                position: self.source_len,
            },
        }
    }

    fn expr(&mut self) -> Result<Expr, ExpressionError> {
        self.enter()?;
        let mut lhs = self.term()?;
        loop {
            let op = if self.eat(&TokenKind::Plus) {
                BinaryOp::Add
            } else if self.eat(&TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let rhs = self.term()?;
            lhs = self.binary(op, lhs, rhs)?;
        }
        self.leave();
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, ExpressionError> {
        let mut lhs = self.unary()?;
        loop {
            let op = if self.eat(&TokenKind::Star) {
                BinaryOp::Mul
            } else if self.eat(&TokenKind::Slash) {
                BinaryOp::Div
            } else {
                break;
            };
            let rhs = self.unary()?;
            lhs = self.binary(op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ExpressionError> {
        self.enter()?;
        let expr = if self.eat(&TokenKind::Minus) {
            Expr::Neg(Box::new(self.unary()?))
        } else if self.eat(&TokenKind::Plus) {
            self.unary()?
        } else {
            self.power()?
        };
        self.leave();
        Ok(expr)
    }

    fn power(&mut self) -> Result<Expr, ExpressionError> {
        let base = self.primary()?;
        if self.eat(&TokenKind::Power) {
            let exponent = self.unary()?;
            return self.binary(BinaryOp::Pow, base, exponent);
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, ExpressionError> {
        let Some(token) = self.peek() else {
            return Err(self.unexpected("operand"));
        };

        match &token.kind {
            TokenKind::Number(value) => {
                self.next();
                Ok(Expr::Const(ComplexNumber::real(*value)))
            }
            TokenKind::Imaginary(value) => {
                self.next();
                Ok(Expr::Const(ComplexNumber::new(0.0, *value)))
            }
            TokenKind::LParen => {
                self.next();
                let inner = self.expr()?;
                if !self.eat(&TokenKind::RParen) {
                    return Err(self.unexpected("')'"));
                }
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                self.next();
                if name == "z" {
                    return Ok(Expr::Var);
                }
                if let Some(function) = Function::lookup(name) {
                    if !self.eat(&TokenKind::LParen) {
                        return Err(self.unexpected("'(' after function name"));
                    }
                    let argument = self.expr()?;
                    if !self.eat(&TokenKind::RParen) {
                        return Err(self.unexpected("')'"));
                    }
                    return Ok(Expr::Call(function, Box::new(argument)));
                }
                if let Some(value) = constant(name) {
                    return Ok(Expr::Const(value));
                }
                Err(ExpressionError::UnknownIdentifier {
                    name: name.clone(),
                    position: token.position,
                })
            }
            _ => Err(self.unexpected("operand")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    fn parse_str(source: &str) -> Result<Expr, ExpressionError> {
        parse(&tokenize(source)?, source.len())
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * z  ->  Add(1, Mul(2, z))
        let expr = parse_str("1 + 2 * z").unwrap();
        match expr {
            Expr::Binary(BinaryOp::Add, lhs, rhs) => {
                assert_eq!(*lhs, Expr::Const(ComplexNumber::real(1.0)));
                assert!(matches!(*rhs, Expr::Binary(BinaryOp::Mul, _, _)));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_power_binds_tighter_than_negation() {
        let expr = parse_str("-z^2").unwrap();
        assert!(matches!(expr, Expr::Neg(inner) if matches!(*inner, Expr::Binary(BinaryOp::Pow, _, _))));
    }

    #[test]
    fn test_power_is_right_associative() {
        let expr = parse_str("z^2^3").unwrap();
        match expr {
            Expr::Binary(BinaryOp::Pow, base, exponent) => {
                assert_eq!(*base, Expr::Var);
                assert!(matches!(*exponent, Expr::Binary(BinaryOp::Pow, _, _)));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_function_call_with_prefix() {
        let expr = parse_str("cmath.sin(z) - z/2").unwrap();
        assert!(matches!(expr, Expr::Binary(BinaryOp::Sub, lhs, _) if matches!(*lhs, Expr::Call(Function::Sin, _))));
    }

    #[test]
    fn test_constants() {
        assert_eq!(parse_str("pi").unwrap(), Expr::Const(ComplexNumber::real(std::f64::consts::PI)));
        assert_eq!(parse_str("j").unwrap(), Expr::Const(ComplexNumber::I));
    }

    #[test]
    fn test_unknown_identifier_rejected() {
        let err = parse_str("__import__(z)").unwrap_err();
        assert!(matches!(err, ExpressionError::UnknownIdentifier { ref name, .. } if name == "__import__"));
    }

    #[test]
    fn test_missing_operand() {
        let err = parse_str("z +").unwrap_err();
        assert!(matches!(
            err,
            ExpressionError::UnexpectedToken { position: 3, .. }
        ));
    }

    #[test]
    fn test_unbalanced_parenthesis() {
        assert!(parse_str("(z + 1").is_err());
        assert!(parse_str("z + 1)").is_err());
    }

    #[test]
    fn test_function_requires_parenthesis() {
        assert!(parse_str("sin z").is_err());
    }

    #[test]
    fn test_depth_limit() {
        let source = format!("{}z{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(
            parse_str(&source).unwrap_err(),
            ExpressionError::TooDeep { limit: MAX_DEPTH }
        );
    }

    #[test]
    fn test_operator_limit() {
        let at_limit = format!("z{}", " - 1".repeat(MAX_OPERATORS));
        assert!(parse_str(&at_limit).is_ok());

        let flat = format!("z{}", " - 0.0001".repeat(3000));
        assert_eq!(
            parse_str(&flat).unwrap_err(),
            ExpressionError::TooManyOperators { limit: MAX_OPERATORS }
        );

        let products = format!("z{}", " * z".repeat(MAX_OPERATORS + 1));
        assert!(parse_str(&products).is_err());
    }
}
