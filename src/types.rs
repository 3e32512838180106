//! Type definitions for the expression compiler and evaluator.
//!
//! This module contains the compiled expression tree ([`Expr`]), the closed
//! set of callable shapes ([`Callable`]), and the infix operator table used
//! by the lexer and parser.

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;

use crate::Real;

/// A native callable bound into an expression, keyed by arity.
///
/// Every shape the evaluator can invoke is a distinct variant, so dispatch
/// is a plain `match` and the argument count is fixed by construction.
///
/// `Native*` variants are plain function pointers taking 0-7 numeric
/// arguments. `Closure*` variants borrow a caller-owned Rust closure of the
/// same arities; the closure's captured environment is the opaque context
/// value, and the borrow is the node's context slot. Neither is owned by the
/// tree.
///
/// `ArrayFold` and `Interpolate` are the shapes of the array-aggregate
/// builtins (`sum`, `arrmin`, `arrmax`, `arrlen`, `linear_interpolate`).
/// Their array parameters must be supplied as plain bound array variables;
/// anything else evaluates to NaN.
#[derive(Clone, Copy)]
pub enum Callable<'a> {
    Native0(fn() -> Real),
    Native1(fn(Real) -> Real),
    Native2(fn(Real, Real) -> Real),
    Native3(fn(Real, Real, Real) -> Real),
    Native4(fn(Real, Real, Real, Real) -> Real),
    Native5(fn(Real, Real, Real, Real, Real) -> Real),
    Native6(fn(Real, Real, Real, Real, Real, Real) -> Real),
    Native7(fn(Real, Real, Real, Real, Real, Real, Real) -> Real),
    Closure0(&'a dyn Fn() -> Real),
    Closure1(&'a dyn Fn(Real) -> Real),
    Closure2(&'a dyn Fn(Real, Real) -> Real),
    Closure3(&'a dyn Fn(Real, Real, Real) -> Real),
    Closure4(&'a dyn Fn(Real, Real, Real, Real) -> Real),
    Closure5(&'a dyn Fn(Real, Real, Real, Real, Real) -> Real),
    Closure6(&'a dyn Fn(Real, Real, Real, Real, Real, Real) -> Real),
    Closure7(&'a dyn Fn(Real, Real, Real, Real, Real, Real, Real) -> Real),
    /// Aggregate over one length-prefixed array (`sum`, `arrmin`, ...).
    ArrayFold(fn(&[Cell<Real>]) -> Real),
    /// Two parallel length-prefixed arrays plus a sample point
    /// (`linear_interpolate`).
    Interpolate(fn(&[Cell<Real>], &[Cell<Real>], Real) -> Real),
}

impl<'a> Callable<'a> {
    /// Number of argument subexpressions the parser consumes for this shape.
    pub fn arity(&self) -> usize {
        match self {
            Callable::Native0(_) | Callable::Closure0(_) => 0,
            Callable::Native1(_) | Callable::Closure1(_) | Callable::ArrayFold(_) => 1,
            Callable::Native2(_) | Callable::Closure2(_) => 2,
            Callable::Native3(_) | Callable::Closure3(_) | Callable::Interpolate(_) => 3,
            Callable::Native4(_) | Callable::Closure4(_) => 4,
            Callable::Native5(_) | Callable::Closure5(_) => 5,
            Callable::Native6(_) | Callable::Closure6(_) => 6,
            Callable::Native7(_) | Callable::Closure7(_) => 7,
        }
    }

    fn shape_name(&self) -> &'static str {
        match self {
            Callable::Native0(_) => "Native0",
            Callable::Native1(_) => "Native1",
            Callable::Native2(_) => "Native2",
            Callable::Native3(_) => "Native3",
            Callable::Native4(_) => "Native4",
            Callable::Native5(_) => "Native5",
            Callable::Native6(_) => "Native6",
            Callable::Native7(_) => "Native7",
            Callable::Closure0(_) => "Closure0",
            Callable::Closure1(_) => "Closure1",
            Callable::Closure2(_) => "Closure2",
            Callable::Closure3(_) => "Closure3",
            Callable::Closure4(_) => "Closure4",
            Callable::Closure5(_) => "Closure5",
            Callable::Closure6(_) => "Closure6",
            Callable::Closure7(_) => "Closure7",
            Callable::ArrayFold(_) => "ArrayFold",
            Callable::Interpolate(_) => "Interpolate",
        }
    }
}

impl<'a> fmt::Debug for Callable<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable::{}", self.shape_name())
    }
}

/// A compiled expression node.
///
/// The tree is produced once by [`compile`](crate::compile), may be evaluated
/// any number of times, and is released by dropping it; each node owns its
/// children, so `Drop` frees the whole subtree. Bound storage (`Cell` and
/// cell slices) is borrowed from the caller for the tree's lifetime `'a` and
/// is re-read on every evaluation.
#[derive(Debug)]
pub enum Expr<'a> {
    /// A literal or folded numeric value.
    Constant(Real),

    /// A bound scalar variable. Evaluates to the cell's current value.
    Variable(&'a Cell<Real>),

    /// A bound length-prefixed array used in scalar position.
    ///
    /// Evaluates to element 0, the declared length.
    ArrayVariable(&'a [Cell<Real>]),

    /// `array[index]`: one child, the index subexpression.
    ///
    /// The index is truncated toward zero; anything outside 0..declared
    /// length evaluates to NaN.
    Index {
        array: &'a [Cell<Real>],
        index: Box<Expr<'a>>,
    },

    /// A function or closure call of fixed arity.
    ///
    /// `args.len()` equals `fun.arity()` for every tree built by the parser.
    /// `pure` is the binding's purity flag; the optimizer folds a pure call
    /// once all of its children are constants.
    Call {
        fun: Callable<'a>,
        pure: bool,
        args: Vec<Expr<'a>>,
    },
}

impl<'a> Expr<'a> {
    /// Evaluate this subtree. Shorthand for [`eval`](crate::eval).
    pub fn eval(&self) -> Real {
        crate::eval::eval(self)
    }
}

/// Infix operator tokens recognized by the lexer.
///
/// `Mul` through `Or` share one precedence level; `Pow` binds tighter and is
/// left-associative unless the `pow-from-right` feature is enabled.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    And,
    Or,
}

impl BinaryOp {
    /// The native two-argument function implementing this operator.
    pub fn native(self) -> fn(Real, Real) -> Real {
        match self {
            BinaryOp::Add => crate::functions::add,
            BinaryOp::Sub => crate::functions::sub,
            BinaryOp::Mul => crate::functions::mul,
            BinaryOp::Div => crate::functions::div,
            BinaryOp::Rem => crate::functions::fmod,
            BinaryOp::Pow => crate::functions::pow,
            BinaryOp::And => crate::functions::bitwise_and,
            BinaryOp::Or => crate::functions::bitwise_or,
        }
    }
}
