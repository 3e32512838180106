#![cfg_attr(not(test), no_std)]
#![doc = r#"
# texpr

A minimal, no_std-friendly compile-once/evaluate-many math expression engine
for Rust.

## Overview

texpr compiles a textual arithmetic expression into an owned, directly
evaluable tree, bound at compile time to caller-supplied variables, arrays,
functions, and closures. The tree can then be evaluated any number of times
without re-parsing, and re-reads its bound storage on every evaluation.

Key features:
- Configurable floating-point precision (f32/f64)
- Caller-supplied scalar variables, length-prefixed arrays, native functions
  of arity 0-7, and context-carrying closures of arity 0-7
- Built-in math, combinatoric, array-aggregate, and bitwise functions
- Array access with `array[index]` syntax
- Function application by juxtaposition (`sin x` is equivalent to `sin(x)`)
- Constant folding of pure subtrees after parsing
- Compile errors reported as 1-based character offsets
- No_std compatibility for embedded systems

## Quick start

```rust
use texpr::interp;

// Simple expression evaluation
let result = interp("2 + 3 * 4", &[]);
assert_eq!(result, 14.0);

// Built-in functions and constants
let result = interp("sin(pi/4) + cos(pi/4)", &[]);
assert!((result - 1.414).abs() < 0.001); // approximately sqrt(2)
```

## Binding variables

Scalar variables are bound as `&Cell<Real>`; the caller keeps the storage and
may mutate it between evaluations:

```rust
use core::cell::Cell;
use texpr::{compile, eval, Binding};

let x = Cell::new(3.0);
let y = Cell::new(4.0);
let tree = compile(
    "sqrt(x^2 + y^2)",
    &[Binding::scalar("x", &x), Binding::scalar("y", &y)],
)
.unwrap();
assert_eq!(eval(&tree), 5.0);

x.set(5.0);
y.set(12.0);
assert_eq!(eval(&tree), 13.0); // same tree, new values
```

## Arrays

Arrays use the length-prefix convention: element 0 holds the declared length
N, elements 1..=N hold the data.

```rust
use core::cell::Cell;
use texpr::{compile, eval, Binding};

let arr1 = [3.0, 10.0, 20.0, 30.0].map(Cell::new);
let tree = compile("arr1[1] + sum(arr1)", &[Binding::array("arr1", &arr1)]).unwrap();
assert_eq!(eval(&tree), 80.0); // 20 + (10 + 20 + 30)
```

## Custom functions and closures

Native functions are plain `fn` pointers keyed by arity. Closures borrow
their captured environment, which plays the role of the opaque context value:

```rust
use texpr::{interp, Binding, Callable};

fn cube(x: texpr::Real) -> texpr::Real {
    x * x * x
}

let gain = 2.5;
let scale = move |x: texpr::Real| x * gain;

let bindings = [
    Binding::pure_function("cube", Callable::Native1(cube)),
    Binding::function("scale", Callable::Closure1(&scale)),
];
assert_eq!(interp("scale(cube(2))", &bindings), 20.0);
```

Purity is declared per binding: pure bindings are eligible for constant
folding, impure ones always run at evaluation time.

## Error handling

Compile-time errors carry a 1-based character offset into the source:

```rust
use texpr::compile;

let err = compile("2 + (3", &[]).unwrap_err();
assert_eq!(err.position(), 7); // unmatched '(' reported at end of input
```

Evaluation itself never fails: numeric domain errors (division by zero,
out-of-range array index, invalid bitwise operand, ...) propagate as NaN or
infinity through ordinary IEEE-754 arithmetic.

## Grammar

From lowest to highest precedence:

| Precedence | Operators           | Associativity              |
|------------|---------------------|----------------------------|
| 1          | `,`                 | Left (yields right value)  |
| 2          | `+` `-`             | Left                       |
| 3          | `*` `/` `%` `&` `\|` | Left                      |
| 4          | `^`                 | Left (`pow-from-right` feature selects right) |
| 5          | unary `+` `-`       | Right                      |

`&` and `|` are bitwise AND/OR over operands rounded to 53-bit integers;
`^` is real exponentiation. Array indexing `arr[i]` is the only postfix
operator and applies only to a plain bound array variable.

## Feature flags

- `f32`: use 32-bit floating point for `Real` (default is 64-bit)
- `pow-from-right`: `a^b^c = a^(b^c)` and `-a^b = -(a^b)`
- `nat-log`: `log` is the natural logarithm instead of base-10
"#]

extern crate alloc;

pub mod context;
pub mod engine;
pub mod error;
pub mod eval;
pub mod functions;
pub mod lexer;
mod optimize;
pub mod types;

pub use context::{Binding, BindingValue};
pub use engine::{compile, interp, parse_expression};
pub use error::{ExprError, Result};
pub use eval::eval;
pub use types::{Callable, Expr};

/// Define the floating-point type based on feature flags.
#[cfg(feature = "f32")]
pub type Real = f32;

#[cfg(not(feature = "f32"))]
pub type Real = f64;

pub mod constants {
    use super::Real;

    #[cfg(feature = "f32")]
    pub const PI: Real = core::f32::consts::PI;
    #[cfg(feature = "f32")]
    pub const E: Real = core::f32::consts::E;
    #[cfg(feature = "f32")]
    pub const TEST_PRECISION: Real = 1e-6;

    #[cfg(not(feature = "f32"))]
    pub const PI: Real = core::f64::consts::PI;
    #[cfg(not(feature = "f32"))]
    pub const E: Real = core::f64::consts::E;
    #[cfg(not(feature = "f32"))]
    pub const TEST_PRECISION: Real = 1e-9;
}

/// Utility macro to check if two floating point values are approximately equal
/// within a specified epsilon. NaN compares equal to NaN and same-signed
/// infinities compare equal, since both are observable results here.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr $(,)?) => {
        $crate::assert_approx_eq!($left, $right, $crate::constants::TEST_PRECISION)
    };
    ($left:expr, $right:expr, $epsilon:expr $(,)?) => {{
        let left_val: $crate::Real = $left;
        let right_val: $crate::Real = $right;
        let eps: $crate::Real = $epsilon;

        if left_val.is_nan() && right_val.is_nan() {
            // NaN == NaN for our purposes
        } else if left_val.is_infinite()
            && right_val.is_infinite()
            && left_val.signum() == right_val.signum()
        {
            // Same-signed infinities are equal
        } else {
            assert!(
                (left_val - right_val).abs() < eps,
                "assertion failed: `(left ≈ right)` \
                 (left: `{}`, right: `{}`, epsilon: `{}`)",
                left_val,
                right_val,
                eps
            );
        }
    }};
}
