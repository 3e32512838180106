//! Tree-walking evaluator with native-arity dispatch.
//!
//! Evaluation is read-only with respect to the tree, never allocates, and
//! never fails structurally: numeric domain errors and malformed nodes both
//! come back as NaN, propagating through arithmetic like any IEEE NaN.

use core::cell::Cell;

use crate::Real;
use crate::types::{Callable, Expr};

/// Evaluate a compiled tree.
///
/// Bound scalar cells are re-read on every call, so mutating a bound cell
/// between evaluations is reflected in the next result. Children are
/// evaluated left-to-right before the node's callable is invoked.
pub fn eval(node: &Expr<'_>) -> Real {
    match node {
        Expr::Constant(value) => *value,
        Expr::Variable(cell) => cell.get(),
        // A bare array in scalar position reads its length prefix.
        Expr::ArrayVariable(cells) => match cells.first() {
            Some(len) => len.get(),
            None => Real::NAN,
        },
        Expr::Index { array, index } => eval_index(array, index),
        Expr::Call { fun, args, .. } => eval_call(*fun, args),
    }
}

/// Index into a length-prefixed array, truncating the index toward zero.
/// Out-of-range indices, non-finite indices, and a backing slice shorter
/// than its declared length all yield NaN.
fn eval_index(array: &[Cell<Real>], index: &Expr<'_>) -> Real {
    let raw = eval(index);
    if !raw.is_finite() {
        return Real::NAN;
    }
    let len = match array.first() {
        Some(len) => len.get(),
        None => return Real::NAN,
    };
    let idx = raw as i64; // truncates toward zero
    if idx < 0 || (idx as Real) >= len {
        return Real::NAN;
    }
    match array.get(1 + idx as usize) {
        Some(cell) => cell.get(),
        None => Real::NAN,
    }
}

/// Evaluate the k-th argument, NaN when the child list is shorter than the
/// callable's arity (an invalid node, not a fault).
fn arg(args: &[Expr<'_>], k: usize) -> Real {
    match args.get(k) {
        Some(node) => eval(node),
        None => Real::NAN,
    }
}

/// The array argument of an aggregate callable must be a plain bound array
/// variable; anything else is NaN.
fn array_arg<'a>(args: &'a [Expr<'a>], k: usize) -> Option<&'a [Cell<Real>]> {
    match args.get(k) {
        Some(Expr::ArrayVariable(cells)) => Some(cells),
        _ => None,
    }
}

fn eval_call(fun: Callable<'_>, args: &[Expr<'_>]) -> Real {
    match fun {
        Callable::Native0(f) => f(),
        Callable::Native1(f) => f(arg(args, 0)),
        Callable::Native2(f) => f(arg(args, 0), arg(args, 1)),
        Callable::Native3(f) => f(arg(args, 0), arg(args, 1), arg(args, 2)),
        Callable::Native4(f) => f(arg(args, 0), arg(args, 1), arg(args, 2), arg(args, 3)),
        Callable::Native5(f) => f(
            arg(args, 0),
            arg(args, 1),
            arg(args, 2),
            arg(args, 3),
            arg(args, 4),
        ),
        Callable::Native6(f) => f(
            arg(args, 0),
            arg(args, 1),
            arg(args, 2),
            arg(args, 3),
            arg(args, 4),
            arg(args, 5),
        ),
        Callable::Native7(f) => f(
            arg(args, 0),
            arg(args, 1),
            arg(args, 2),
            arg(args, 3),
            arg(args, 4),
            arg(args, 5),
            arg(args, 6),
        ),
        Callable::Closure0(f) => f(),
        Callable::Closure1(f) => f(arg(args, 0)),
        Callable::Closure2(f) => f(arg(args, 0), arg(args, 1)),
        Callable::Closure3(f) => f(arg(args, 0), arg(args, 1), arg(args, 2)),
        Callable::Closure4(f) => f(arg(args, 0), arg(args, 1), arg(args, 2), arg(args, 3)),
        Callable::Closure5(f) => f(
            arg(args, 0),
            arg(args, 1),
            arg(args, 2),
            arg(args, 3),
            arg(args, 4),
        ),
        Callable::Closure6(f) => f(
            arg(args, 0),
            arg(args, 1),
            arg(args, 2),
            arg(args, 3),
            arg(args, 4),
            arg(args, 5),
        ),
        Callable::Closure7(f) => f(
            arg(args, 0),
            arg(args, 1),
            arg(args, 2),
            arg(args, 3),
            arg(args, 4),
            arg(args, 5),
            arg(args, 6),
        ),
        Callable::ArrayFold(f) => match array_arg(args, 0) {
            Some(cells) => f(cells),
            None => Real::NAN,
        },
        Callable::Interpolate(f) => match (array_arg(args, 0), array_arg(args, 1)) {
            (Some(domain), Some(range)) => f(domain, range, arg(args, 2)),
            _ => Real::NAN,
        },
    }
}
