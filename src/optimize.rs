//! Compile-time constant folding.
//!
//! A call node flagged pure whose children have all been reduced to
//! constants is evaluated once, by the same evaluator used at runtime, and
//! replaced in place with the result. Folding therefore can never change
//! what an expression evaluates to, NaN payloads included.

use crate::eval::eval;
use crate::types::Expr;

/// Fold pure constant subtrees bottom-up.
///
/// Variables, array variables, and index nodes are left untouched; an index
/// subscript is not visited, since the lookup depends on array contents the
/// caller may change between evaluations.
pub(crate) fn optimize(node: &mut Expr<'_>) {
    let Expr::Call { pure, args, .. } = node else {
        return;
    };
    let pure = *pure;
    let mut all_constant = true;
    for child in args.iter_mut() {
        optimize(child);
        if !matches!(child, Expr::Constant(_)) {
            all_constant = false;
        }
    }
    if pure && all_constant {
        let value = eval(node);
        *node = Expr::Constant(value);
    }
}
