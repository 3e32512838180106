//! Caller-supplied bindings and identifier resolution.
//!
//! A [`Binding`] makes a scalar variable, a length-prefixed array, or a
//! function/closure available to an expression under a name. Bindings are
//! borrowed for the lifetime of the compiled tree and never copied: scalar
//! storage is a `Cell` the caller may mutate between evaluations, arrays are
//! slices of cells, callables are function pointers or borrowed closures.
//!
//! Resolution scans the caller's binding list linearly first (first match
//! wins, so user bindings shadow builtins), then binary searches the sorted
//! builtin table.

use core::cell::Cell;

use crate::Real;
use crate::functions::BUILTINS;
use crate::types::Callable;

/// What a name is bound to.
#[derive(Clone, Copy, Debug)]
pub enum BindingValue<'a> {
    /// A scalar variable, re-read on every evaluation.
    Scalar(&'a Cell<Real>),
    /// A length-prefixed array: element 0 is the declared length N,
    /// elements 1..=N are the data. The caller must supply at least N+1
    /// elements; array operations yield NaN when the backing slice is
    /// shorter than the declared length.
    Array(&'a [Cell<Real>]),
    /// A function or closure of fixed arity (0-7). `pure` declares that the
    /// result depends only on the arguments, which permits constant folding.
    Function { fun: Callable<'a>, pure: bool },
}

/// A named binding supplied to [`compile`](crate::compile).
///
/// Names must start with an ASCII letter, followed by letters, digits, or
/// underscores. A binding whose name never matches that pattern is simply
/// unreachable from any expression.
#[derive(Clone, Copy, Debug)]
pub struct Binding<'a> {
    pub name: &'a str,
    pub value: BindingValue<'a>,
}

impl<'a> Binding<'a> {
    /// Bind a scalar variable.
    pub fn scalar(name: &'a str, cell: &'a Cell<Real>) -> Self {
        Binding {
            name,
            value: BindingValue::Scalar(cell),
        }
    }

    /// Bind a length-prefixed array.
    pub fn array(name: &'a str, cells: &'a [Cell<Real>]) -> Self {
        Binding {
            name,
            value: BindingValue::Array(cells),
        }
    }

    /// Bind a function or closure that is not safe to constant-fold.
    pub fn function(name: &'a str, fun: Callable<'a>) -> Self {
        Binding {
            name,
            value: BindingValue::Function { fun, pure: false },
        }
    }

    /// Bind a function or closure whose result depends only on its
    /// arguments. The optimizer may evaluate it at compile time.
    pub fn pure_function(name: &'a str, fun: Callable<'a>) -> Self {
        Binding {
            name,
            value: BindingValue::Function { fun, pure: true },
        }
    }
}

/// Resolve an identifier against the caller bindings, then the builtins.
///
/// `&str` equality is exact-length by nature, which is what keeps `sin` from
/// matching `sinh` in the sorted builtin table.
pub(crate) fn resolve<'a>(bindings: &[Binding<'a>], name: &str) -> Option<BindingValue<'a>> {
    for binding in bindings {
        if binding.name == name {
            return Some(binding.value);
        }
    }
    BUILTINS
        .binary_search_by(|builtin| builtin.0.cmp(name))
        .ok()
        .map(|i| BindingValue::Function {
            fun: BUILTINS[i].1,
            pure: true,
        })
}
