//! Expression compilation: recursive-descent parser and public entry points.
//!
//! The grammar, highest to lowest precedence:
//!
//! ```text
//! list   := expr ("," expr)*             comma keeps the right value
//! expr   := term (("+" | "-") term)*
//! term   := factor (("*" | "/" | "%" | "&" | "|") factor)*
//! factor := power ("^" power)*           left-assoc by default; the
//!                                        pow-from-right feature selects
//!                                        a^b^c = a^(b^c) and -a^b = -(a^b)
//! power  := ("+" | "-")* base            net sign by parity
//! base   := NUMBER
//!         | VARIABLE
//!         | ARRAY ("[" list "]")?
//!         | CALL0 ("(" ")")?
//!         | CALL1 power
//!         | CALLn "(" expr ("," expr)* ")"   exactly n arguments
//!         | "(" list ")"
//! ```
//!
//! Arity-1 calls take their argument by juxtaposition, so `sin x` and
//! `sin(x)` are the same parse. An odd number of leading `-` signs wraps the
//! base in a pure negation call, which the optimizer can fold. Indexing is
//! the only postfix operator, applies only to a plain array binding, and is
//! not chainable (an index result is a scalar).

extern crate alloc;
use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use crate::Real;
use crate::context::Binding;
use crate::error::{ExprError, Result};
use crate::eval::eval;
use crate::functions;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::optimize::optimize;
use crate::types::{BinaryOp, Callable, Expr};

/// Compile an expression against the given bindings and constant-fold the
/// result.
///
/// The returned tree borrows every bound cell, slice, and closure for its
/// lifetime and may be evaluated any number of times with [`eval`]. Dropping
/// the tree releases it.
///
/// Exponentiation is left-associative (`2^3^2 == 64`) unless the
/// `pow-from-right` feature is enabled.
pub fn compile<'a>(expression: &str, bindings: &[Binding<'a>]) -> Result<Expr<'a>> {
    let mut root = parse_expression(expression, bindings)?;
    optimize(&mut root);
    Ok(root)
}

/// Parse without the constant-folding pass.
///
/// Useful for inspecting the raw tree; [`compile`] is this plus
/// optimization.
pub fn parse_expression<'a>(expression: &str, bindings: &[Binding<'a>]) -> Result<Expr<'a>> {
    let mut parser = Parser::new(expression, bindings);
    let root = parser.list()?;
    match parser.current.kind {
        TokenKind::End => Ok(root),
        TokenKind::Error(ref err) => Err(err.clone()),
        _ => Err(ExprError::TrailingInput {
            position: parser.current.position + 1,
        }),
    }
}

/// Compile, evaluate once, and drop the tree.
///
/// Returns NaN when compilation fails; use [`compile`] to observe the error.
pub fn interp(expression: &str, bindings: &[Binding<'_>]) -> Real {
    match compile(expression, bindings) {
        Ok(tree) => eval(&tree),
        Err(_) => Real::NAN,
    }
}

/// Cap on operand nesting. Bounds stack use in the parser and, since tree
/// depth can never exceed parse depth, in evaluation and drop as well.
const MAX_RECURSION_DEPTH: usize = 512;

struct Parser<'s, 'a> {
    lexer: Lexer<'s, 'a>,
    current: Token<'a>,
    depth: usize,
}

fn negate(inner: Expr<'_>) -> Expr<'_> {
    Expr::Call {
        fun: Callable::Native1(functions::neg),
        pure: true,
        args: vec![inner],
    }
}

fn binary<'a>(op: BinaryOp, lhs: Expr<'a>, rhs: Expr<'a>) -> Expr<'a> {
    Expr::Call {
        fun: Callable::Native2(op.native()),
        pure: true,
        args: vec![lhs, rhs],
    }
}

impl<'s, 'a> Parser<'s, 'a> {
    fn new(expression: &'s str, bindings: &'s [Binding<'a>]) -> Self {
        let mut lexer = Lexer::new(expression, bindings);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            depth: 0,
        }
    }

    fn bump(&mut self) {
        self.current = self.lexer.next_token();
    }

    /// 1-based offset of the token parsing stopped on.
    fn here(&self) -> usize {
        self.current.position + 1
    }

    /// The error for an operand position that holds no operand.
    fn unexpected(&self) -> ExprError {
        match self.current.kind {
            TokenKind::Error(ref err) => err.clone(),
            _ => ExprError::Syntax {
                position: self.here(),
            },
        }
    }

    fn list(&mut self) -> Result<Expr<'a>> {
        let mut ret = self.expr()?;
        while matches!(self.current.kind, TokenKind::Separator) {
            self.bump();
            let rhs = self.expr()?;
            ret = Expr::Call {
                fun: Callable::Native2(functions::comma),
                pure: true,
                args: vec![ret, rhs],
            };
        }
        Ok(ret)
    }

    fn expr(&mut self) -> Result<Expr<'a>> {
        let mut ret = self.term()?;
        while let TokenKind::Infix(op @ (BinaryOp::Add | BinaryOp::Sub)) = self.current.kind {
            self.bump();
            let rhs = self.term()?;
            ret = binary(op, ret, rhs);
        }
        Ok(ret)
    }

    fn term(&mut self) -> Result<Expr<'a>> {
        let mut ret = self.factor()?;
        while let TokenKind::Infix(
            op @ (BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem | BinaryOp::And | BinaryOp::Or),
        ) = self.current.kind
        {
            self.bump();
            let rhs = self.factor()?;
            ret = binary(op, ret, rhs);
        }
        Ok(ret)
    }

    #[cfg(not(feature = "pow-from-right"))]
    fn factor(&mut self) -> Result<Expr<'a>> {
        let mut ret = self.power()?;
        while matches!(self.current.kind, TokenKind::Infix(BinaryOp::Pow)) {
            self.bump();
            let rhs = self.power()?;
            ret = binary(BinaryOp::Pow, ret, rhs);
        }
        Ok(ret)
    }

    /// Right-associative exponentiation with negate hoisting: `-a^b^c`
    /// parses as `-(a^(b^c))`.
    #[cfg(feature = "pow-from-right")]
    fn factor(&mut self) -> Result<Expr<'a>> {
        let mut sign = 1;
        while let TokenKind::Infix(op @ (BinaryOp::Add | BinaryOp::Sub)) = self.current.kind {
            if op == BinaryOp::Sub {
                sign = -sign;
            }
            self.bump();
        }

        let mut chain = vec![self.base()?];
        while matches!(self.current.kind, TokenKind::Infix(BinaryOp::Pow)) {
            self.bump();
            chain.push(self.power()?);
        }

        let mut ret = chain.pop().unwrap();
        while let Some(lhs) = chain.pop() {
            ret = binary(BinaryOp::Pow, lhs, ret);
        }
        if sign == -1 {
            ret = negate(ret);
        }
        Ok(ret)
    }

    fn power(&mut self) -> Result<Expr<'a>> {
        let mut sign = 1;
        while let TokenKind::Infix(op @ (BinaryOp::Add | BinaryOp::Sub)) = self.current.kind {
            if op == BinaryOp::Sub {
                sign = -sign;
            }
            self.bump();
        }
        let ret = self.base()?;
        if sign == 1 {
            Ok(ret)
        } else {
            Ok(negate(ret))
        }
    }

    /// Depth-guarded wrapper around [`Parser::base_inner`]. Every level of
    /// operand nesting passes through here, so the counter tracks the depth
    /// of the tree being built.
    fn base(&mut self) -> Result<Expr<'a>> {
        if self.depth >= MAX_RECURSION_DEPTH {
            return Err(ExprError::RecursionLimit {
                position: self.here(),
            });
        }
        self.depth += 1;
        let ret = self.base_inner();
        self.depth -= 1;
        ret
    }

    fn base_inner(&mut self) -> Result<Expr<'a>> {
        match self.current.kind.clone() {
            TokenKind::Number(value) => {
                self.bump();
                Ok(Expr::Constant(value))
            }

            TokenKind::Scalar(cell) => {
                self.bump();
                if matches!(self.current.kind, TokenKind::OpenBracket) {
                    // Only array bindings may be indexed.
                    return Err(ExprError::IndexTarget {
                        position: self.here(),
                    });
                }
                Ok(Expr::Variable(cell))
            }

            TokenKind::Array(cells) => {
                self.bump();
                if matches!(self.current.kind, TokenKind::OpenBracket) {
                    self.index(cells)
                } else {
                    Ok(Expr::ArrayVariable(cells))
                }
            }

            TokenKind::Call { name, fun, pure } => {
                self.bump();
                let arity = fun.arity();
                match arity {
                    0 => {
                        // An optional empty pair of parentheses is allowed:
                        // `pi` and `pi()` are the same call.
                        if matches!(self.current.kind, TokenKind::Open) {
                            self.bump();
                            if !matches!(self.current.kind, TokenKind::Close) {
                                return Err(ExprError::ArityMismatch {
                                    name,
                                    expected: 0,
                                    position: self.here(),
                                });
                            }
                            self.bump();
                        }
                        Ok(Expr::Call {
                            fun,
                            pure,
                            args: Vec::new(),
                        })
                    }
                    1 => {
                        let arg = self.power()?;
                        Ok(Expr::Call {
                            fun,
                            pure,
                            args: vec![arg],
                        })
                    }
                    _ => {
                        if !matches!(self.current.kind, TokenKind::Open) {
                            return Err(ExprError::ArityMismatch {
                                name,
                                expected: arity,
                                position: self.here(),
                            });
                        }
                        self.bump();
                        let mut args = Vec::with_capacity(arity);
                        loop {
                            args.push(self.expr()?);
                            if args.len() == arity {
                                break;
                            }
                            if matches!(self.current.kind, TokenKind::Separator) {
                                self.bump();
                            } else {
                                // Too few arguments.
                                return Err(ExprError::ArityMismatch {
                                    name,
                                    expected: arity,
                                    position: self.here(),
                                });
                            }
                        }
                        match self.current.kind {
                            TokenKind::Close => {
                                self.bump();
                                Ok(Expr::Call { fun, pure, args })
                            }
                            // Too many arguments (or a trailing comma).
                            TokenKind::Separator => Err(ExprError::ArityMismatch {
                                name,
                                expected: arity,
                                position: self.here(),
                            }),
                            _ => Err(ExprError::UnmatchedParenthesis {
                                position: self.here(),
                            }),
                        }
                    }
                }
            }

            TokenKind::Open => {
                self.bump();
                let inner = self.list()?;
                if !matches!(self.current.kind, TokenKind::Close) {
                    return Err(ExprError::UnmatchedParenthesis {
                        position: self.here(),
                    });
                }
                self.bump();
                Ok(inner)
            }

            _ => Err(self.unexpected()),
        }
    }

    /// `array "[" list "]"`, with the opening bracket as the current token.
    fn index(&mut self, cells: &'a [core::cell::Cell<Real>]) -> Result<Expr<'a>> {
        self.bump(); // '['
        let idx = self.list()?;
        if !matches!(self.current.kind, TokenKind::CloseBracket) {
            return Err(ExprError::UnmatchedBracket {
                position: self.here(),
            });
        }
        self.bump();
        if matches!(self.current.kind, TokenKind::OpenBracket) {
            // An index result is a scalar; chained indexing is not a thing.
            return Err(ExprError::IndexTarget {
                position: self.here(),
            });
        }
        Ok(Expr::Index {
            array: cells,
            index: Box::new(idx),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;
    use core::cell::Cell;

    #[test]
    fn test_parse_constant_expression_shape() {
        let tree = parse_expression("1 + 2 * 3", &[]).unwrap();
        match tree {
            Expr::Call { fun, pure, args } => {
                assert!(pure);
                assert_eq!(fun.arity(), 2);
                assert!(matches!(args[0], Expr::Constant(v) if v == 1.0));
                assert!(matches!(args[1], Expr::Call { .. }));
            }
            other => panic!("expected add call, got {:?}", other),
        }
    }

    #[test]
    fn test_unary_sign_parity() {
        assert_eq!(interp("-5", &[]), -5.0);
        assert_eq!(interp("--5", &[]), 5.0);
        assert_eq!(interp("---5", &[]), -5.0);
        assert_eq!(interp("-+-5", &[]), 5.0);
        // The negation is a foldable pure call.
        let tree = compile("--(-3)", &[]).unwrap();
        assert!(matches!(tree, Expr::Constant(v) if v == -3.0));
    }

    #[test]
    fn test_function_juxtaposition() {
        assert_eq!(interp("sqrt 16", &[]), 4.0);
        assert_eq!(interp("sqrt sqrt 16", &[]), 2.0);
        assert!(interp("sqrt -4", &[]).is_nan());
        assert_eq!(interp("abs -4", &[]), 4.0);
    }

    #[test]
    fn test_arity0_optional_parens() {
        assert_approx_eq!(interp("pi", &[]), crate::constants::PI);
        assert_approx_eq!(interp("pi()", &[]), crate::constants::PI);
        let err = compile("pi(1)", &[]).unwrap_err();
        assert!(matches!(err, ExprError::ArityMismatch { expected: 0, .. }));
    }

    #[test]
    fn test_exact_arity_enforced() {
        let err = compile("atan2(1)", &[]).unwrap_err();
        assert!(
            matches!(err, ExprError::ArityMismatch { ref name, expected: 2, .. } if name == "atan2")
        );
        let err = compile("atan2(1, 2, 3)", &[]).unwrap_err();
        assert!(matches!(err, ExprError::ArityMismatch { expected: 2, .. }));
        let err = compile("atan2(1,)", &[]).unwrap_err();
        assert!(matches!(err, ExprError::Syntax { .. }));
        let err = compile("atan2 1", &[]).unwrap_err();
        assert!(matches!(err, ExprError::ArityMismatch { expected: 2, .. }));
    }

    #[test]
    fn test_indexing_rules() {
        let x = Cell::new(1.0);
        let arr = [2.0, 10.0, 20.0].map(Cell::new);
        let bindings = [Binding::scalar("x", &x), Binding::array("arr", &arr)];

        assert_eq!(interp("arr[0]", &bindings), 10.0);
        assert_eq!(interp("arr[x]", &bindings), 20.0);

        let err = compile("x[0]", &bindings).unwrap_err();
        assert!(matches!(err, ExprError::IndexTarget { position: 2 }));

        let err = compile("arr[0][0]", &bindings).unwrap_err();
        assert!(matches!(err, ExprError::IndexTarget { position: 7 }));

        let err = compile("arr[0", &bindings).unwrap_err();
        assert!(matches!(err, ExprError::UnmatchedBracket { position: 6 }));
    }

    #[test]
    fn test_error_offsets_deterministic() {
        for _ in 0..3 {
            let err = compile("2 + (3", &[]).unwrap_err();
            assert_eq!(err, ExprError::UnmatchedParenthesis { position: 7 });

            let err = compile("2 + * 3", &[]).unwrap_err();
            assert_eq!(err, ExprError::Syntax { position: 5 });

            let err = compile("1 2", &[]).unwrap_err();
            assert_eq!(err, ExprError::TrailingInput { position: 3 });

            let err = compile("2 + nope", &[]).unwrap_err();
            assert_eq!(err.position(), 5);
        }
    }

    #[test]
    fn test_unknown_identifier_surfaces() {
        let err = compile("sin(q)", &[]).unwrap_err();
        match err {
            ExprError::UnknownIdentifier { name, position } => {
                assert_eq!(name, "q");
                assert_eq!(position, 5);
            }
            other => panic!("expected unknown identifier, got {:?}", other),
        }
    }

    #[test]
    fn test_comma_yields_right_operand() {
        assert_eq!(interp("1, 2", &[]), 2.0);
        assert_eq!(interp("(1+1, 6/2)", &[]), 3.0);
    }

    #[cfg(not(feature = "pow-from-right"))]
    #[test]
    fn test_pow_left_associative() {
        assert_eq!(interp("2^3^2", &[]), 64.0);
        // -a^b parses as (-a)^b under the left-associative policy.
        assert_eq!(interp("-2^2", &[]), 4.0);
    }

    #[cfg(feature = "pow-from-right")]
    #[test]
    fn test_pow_right_associative() {
        assert_eq!(interp("2^3^2", &[]), 512.0);
        assert_eq!(interp("-2^2", &[]), -4.0);
    }

    #[test]
    fn test_interp_nan_on_compile_failure() {
        assert!(interp("2 +", &[]).is_nan());
        assert!(interp("", &[]).is_nan());
        assert!(interp(")", &[]).is_nan());
    }
}
