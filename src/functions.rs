//! Built-in functions for expression evaluation.
//!
//! This module provides the implementation of all built-in functions that can
//! be used in expressions: trigonometric and other transcendental functions,
//! combinatorics, the array-aggregate functions over length-prefixed arrays,
//! and the bitwise operations restricted to the 53-bit safe integer range.
//! Domain errors are reported as NaN (or infinity for saturating overflow),
//! never as a fault.
//!
//! All functions use the `libm` crate for their implementations, which keeps
//! the crate no_std-compatible. Depending on the selected floating-point
//! precision (controlled by the "f32" feature), different versions of the
//! math functions are used.
//!
//! [`BUILTINS`] at the bottom is the registry consumed by the resolver. It
//! must stay sorted by name: lookup is a binary search.

#[cfg(feature = "f32")]
use libm::{
    acosf as libm_acos, asinf as libm_asin, atan2f as libm_atan2, atanf as libm_atan,
    ceilf as libm_ceil, cosf as libm_cos, coshf as libm_cosh, expf as libm_exp,
    fabsf as libm_fabs, floorf as libm_floor, log10f as libm_log10, logf as libm_ln,
    powf as libm_pow, roundf as libm_round, sinf as libm_sin, sinhf as libm_sinh,
    sqrtf as libm_sqrt, tanf as libm_tan, tanhf as libm_tanh,
};

#[cfg(not(feature = "f32"))]
use libm::{
    acos as libm_acos, asin as libm_asin, atan as libm_atan, atan2 as libm_atan2,
    ceil as libm_ceil, cos as libm_cos, cosh as libm_cosh, exp as libm_exp, fabs as libm_fabs,
    floor as libm_floor, log as libm_ln, log10 as libm_log10, pow as libm_pow,
    round as libm_round, sin as libm_sin, sinh as libm_sinh, sqrt as libm_sqrt, tan as libm_tan,
    tanh as libm_tanh,
};

use core::cell::Cell;

use crate::Real;
use crate::types::Callable;

/// Bitwise operands must round into 0..=2^53-1, the integer range a double
/// represents exactly.
const MAX_BITWISE_WIDTH: u32 = 53;
const MAX_BITWISE_VALUE: u64 = (1u64 << MAX_BITWISE_WIDTH) - 1;

// --- infix operator implementations ---

pub fn add(a: Real, b: Real) -> Real {
    a + b
}

pub fn sub(a: Real, b: Real) -> Real {
    a - b
}

pub fn mul(a: Real, b: Real) -> Real {
    a * b
}

/// Plain IEEE division: 1/0 is infinity, 0/0 is NaN.
pub fn div(a: Real, b: Real) -> Real {
    a / b
}

pub fn fmod(a: Real, b: Real) -> Real {
    a % b
}

pub fn neg(a: Real) -> Real {
    -a
}

/// The comma operator: both sides are evaluated, the right value wins.
pub fn comma(_: Real, b: Real) -> Real {
    b
}

fn valid_bitwise_operand(x: Real) -> bool {
    x >= 0.0 && libm_round(x) <= MAX_BITWISE_VALUE as Real
}

pub fn bitwise_and(a: Real, b: Real) -> Real {
    if !valid_bitwise_operand(a) || !valid_bitwise_operand(b) {
        return Real::NAN;
    }
    ((libm_round(a) as i64) & (libm_round(b) as i64)) as Real
}

pub fn bitwise_or(a: Real, b: Real) -> Real {
    if !valid_bitwise_operand(a) || !valid_bitwise_operand(b) {
        return Real::NAN;
    }
    ((libm_round(a) as i64) | (libm_round(b) as i64)) as Real
}

// --- builtin math functions ---

pub fn abs(a: Real) -> Real {
    libm_fabs(a)
}

pub fn acos(a: Real) -> Real {
    libm_acos(a)
}

pub fn asin(a: Real) -> Real {
    libm_asin(a)
}

pub fn atan(a: Real) -> Real {
    libm_atan(a)
}

pub fn atan2(a: Real, b: Real) -> Real {
    libm_atan2(a, b)
}

pub fn ceil(a: Real) -> Real {
    libm_ceil(a)
}

pub fn cos(a: Real) -> Real {
    libm_cos(a)
}

pub fn cosh(a: Real) -> Real {
    libm_cosh(a)
}

pub fn e() -> Real {
    crate::constants::E
}

pub fn exp(a: Real) -> Real {
    libm_exp(a)
}

pub fn floor(a: Real) -> Real {
    libm_floor(a)
}

pub fn ln(a: Real) -> Real {
    libm_ln(a)
}

/// Base-10 logarithm by default; natural log under the `nat-log` feature.
pub fn log(a: Real) -> Real {
    #[cfg(feature = "nat-log")]
    {
        libm_ln(a)
    }
    #[cfg(not(feature = "nat-log"))]
    {
        libm_log10(a)
    }
}

pub fn log10(a: Real) -> Real {
    libm_log10(a)
}

pub fn pi() -> Real {
    crate::constants::PI
}

pub fn pow(a: Real, b: Real) -> Real {
    libm_pow(a, b)
}

pub fn sin(a: Real) -> Real {
    libm_sin(a)
}

pub fn sinh(a: Real) -> Real {
    libm_sinh(a)
}

pub fn sqrt(a: Real) -> Real {
    libm_sqrt(a)
}

pub fn tan(a: Real) -> Real {
    libm_tan(a)
}

pub fn tanh(a: Real) -> Real {
    libm_tanh(a)
}

// --- combinatorics ---

/// Factorial. NaN for negative or NaN input; saturates to infinity when the
/// input exceeds `u32::MAX` or the running product overflows.
pub fn fac(a: Real) -> Real {
    if a.is_nan() || a < 0.0 {
        return Real::NAN;
    }
    if a > u32::MAX as Real {
        return Real::INFINITY;
    }
    let ua = a as u64;
    let mut result: u64 = 1;
    for i in 1..=ua {
        match result.checked_mul(i) {
            Some(r) => result = r,
            None => return Real::INFINITY,
        }
    }
    result as Real
}

/// Combinations. NaN for negative inputs or n < r; saturates to infinity on
/// overflow.
pub fn ncr(n: Real, r: Real) -> Real {
    if n.is_nan() || r.is_nan() || n < 0.0 || r < 0.0 || n < r {
        return Real::NAN;
    }
    if n > u32::MAX as Real || r > u32::MAX as Real {
        return Real::INFINITY;
    }
    let un = n as u64;
    let mut ur = r as u64;
    if ur > un / 2 {
        ur = un - ur;
    }
    let mut result: u64 = 1;
    for i in 1..=ur {
        match result.checked_mul(un - ur + i) {
            Some(v) => result = v / i,
            None => return Real::INFINITY,
        }
    }
    result as Real
}

/// Permutations: ncr(n, r) * r!.
pub fn npr(n: Real, r: Real) -> Real {
    ncr(n, r) * fac(r)
}

// --- bitwise builtins ---

/// Test bit `i` of `n` rounded to the nearest integer. NaN when either
/// operand is negative, `n` rounds beyond the 53-bit safe range, or `i`
/// rounds to 53 or more.
pub fn bit(n: Real, i: Real) -> Real {
    if n.is_nan() || i.is_nan() || n < 0.0 || i < 0.0 {
        return Real::NAN;
    }
    let iv = libm_round(n) as i64;
    let bi = libm_round(i) as i64;
    if iv > MAX_BITWISE_VALUE as i64 || bi >= MAX_BITWISE_WIDTH as i64 {
        return Real::NAN;
    }
    if iv & (1i64 << bi) != 0 { 1.0 } else { 0.0 }
}

pub fn xor(a: Real, b: Real) -> Real {
    if !valid_bitwise_operand(a) || !valid_bitwise_operand(b) {
        return Real::NAN;
    }
    ((libm_round(a) as i64) ^ (libm_round(b) as i64)) as Real
}

// --- array aggregates over the length-prefix convention ---

/// The data elements of a length-prefixed array, or `None` when the declared
/// length is negative/non-finite or the backing slice is shorter than the
/// declaration. The latter guard keeps a bad declaration from reading past
/// the storage the caller actually supplied.
pub(crate) fn array_payload(arr: &[Cell<Real>]) -> Option<&[Cell<Real>]> {
    let declared = arr.first()?.get();
    if !declared.is_finite() || declared < 0.0 {
        return None;
    }
    let n = declared as usize;
    arr.get(1..1 + n)
}

pub fn sum(arr: &[Cell<Real>]) -> Real {
    match array_payload(arr) {
        Some(data) => data.iter().map(Cell::get).fold(0.0, add),
        None => Real::NAN,
    }
}

/// Smallest data element; NaN for a declared-length-0 array.
pub fn arrmin(arr: &[Cell<Real>]) -> Real {
    let Some(data) = array_payload(arr) else {
        return Real::NAN;
    };
    let mut iter = data.iter().map(Cell::get);
    let Some(first) = iter.next() else {
        return Real::NAN;
    };
    iter.fold(first, |m, v| if v < m { v } else { m })
}

/// Largest data element; NaN for a declared-length-0 array.
pub fn arrmax(arr: &[Cell<Real>]) -> Real {
    let Some(data) = array_payload(arr) else {
        return Real::NAN;
    };
    let mut iter = data.iter().map(Cell::get);
    let Some(first) = iter.next() else {
        return Real::NAN;
    };
    iter.fold(first, |m, v| if v > m { v } else { m })
}

/// The declared length (element 0).
pub fn arrlen(arr: &[Cell<Real>]) -> Real {
    match arr.first() {
        Some(len) => len.get(),
        None => Real::NAN,
    }
}

/// Piecewise-linear interpolation of `x` over parallel `domain`/`range`
/// arrays.
///
/// Both arrays must declare the same length, at least 2. The domain may run
/// ascending or descending; the first segment containing `x` (inclusive
/// endpoints) is interpolated. A degenerate segment with equal endpoints
/// yields the midpoint of its range values. NaN when `x` lies outside every
/// segment or the arrays are invalid.
pub fn linear_interpolate(domain: &[Cell<Real>], range: &[Cell<Real>], x: Real) -> Real {
    let (Some(d), Some(r)) = (array_payload(domain), array_payload(range)) else {
        return Real::NAN;
    };
    let n = d.len();
    if r.len() != n || n < 2 {
        return Real::NAN;
    }
    let ascending = d[n - 1].get() > d[0].get();
    for i in 0..n - 1 {
        let (d0, d1) = (d[i].get(), d[i + 1].get());
        let (r0, r1) = (r[i].get(), r[i + 1].get());
        let in_range = if ascending {
            x >= d0 && x <= d1
        } else {
            x <= d0 && x >= d1
        };
        if in_range {
            if d1 == d0 {
                return (r0 + r1) / 2.0;
            }
            let t = (x - d0) / (d1 - d0);
            return r0 + t * (r1 - r0);
        }
    }
    Real::NAN
}

/// The builtin registry. Must be kept in alphabetical order (the resolver
/// binary searches it by name) and hold only closure-free shapes. All
/// entries are pure.
pub(crate) const BUILTINS: &[(&str, Callable<'static>)] = &[
    ("abs", Callable::Native1(abs)),
    ("acos", Callable::Native1(acos)),
    ("arrlen", Callable::ArrayFold(arrlen)),
    ("arrmax", Callable::ArrayFold(arrmax)),
    ("arrmin", Callable::ArrayFold(arrmin)),
    ("asin", Callable::Native1(asin)),
    ("atan", Callable::Native1(atan)),
    ("atan2", Callable::Native2(atan2)),
    ("bit", Callable::Native2(bit)),
    ("ceil", Callable::Native1(ceil)),
    ("cos", Callable::Native1(cos)),
    ("cosh", Callable::Native1(cosh)),
    ("e", Callable::Native0(e)),
    ("exp", Callable::Native1(exp)),
    ("fac", Callable::Native1(fac)),
    ("floor", Callable::Native1(floor)),
    ("linear_interpolate", Callable::Interpolate(linear_interpolate)),
    ("ln", Callable::Native1(ln)),
    ("log", Callable::Native1(log)),
    ("log10", Callable::Native1(log10)),
    ("ncr", Callable::Native2(ncr)),
    ("npr", Callable::Native2(npr)),
    ("pi", Callable::Native0(pi)),
    ("pow", Callable::Native2(pow)),
    ("sin", Callable::Native1(sin)),
    ("sinh", Callable::Native1(sinh)),
    ("sqrt", Callable::Native1(sqrt)),
    ("sum", Callable::ArrayFold(sum)),
    ("tan", Callable::Native1(tan)),
    ("tanh", Callable::Native1(tanh)),
    ("xor", Callable::Native2(xor)),
];
