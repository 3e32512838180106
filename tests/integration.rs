//! End-to-end tests: compile and evaluate whole expressions through the
//! public API, the way an embedding application would.

use core::cell::Cell;

use texpr::{
    Binding, Callable, Expr, ExprError, Real, assert_approx_eq, compile, constants, eval, interp,
    parse_expression,
};

#[test]
fn test_basic_arithmetic() {
    assert_eq!(interp("1", &[]), 1.0);
    assert_eq!(interp("1+1", &[]), 2.0);
    assert_eq!(interp("3-1", &[]), 2.0);
    assert_eq!(interp("5*2", &[]), 10.0);
    assert_eq!(interp("10/4", &[]), 2.5);
    assert_eq!(interp("5%2", &[]), 1.0);
    assert_eq!(interp("2^4", &[]), 16.0);
}

#[test]
fn test_precedence_and_grouping() {
    assert_eq!(interp("1+2*3", &[]), 7.0);
    assert_eq!(interp("(1+2)*3", &[]), 9.0);
    assert_eq!(interp("12-3*2", &[]), 6.0);
    assert_eq!(interp("(12-3)*2", &[]), 18.0);
    assert_eq!(interp("2*3^2", &[]), 18.0);
    assert_eq!(interp("10-4/2", &[]), 8.0);
    assert_eq!(interp("((((5))))", &[]), 5.0);
}

#[test]
fn test_bitwise_infix_binds_like_multiplication() {
    assert_eq!(interp("5&3", &[]), 1.0);
    assert_eq!(interp("5|2", &[]), 7.0);
    // `&` and `|` sit at the same precedence as `*`, below `+`.
    assert_eq!(interp("2+3&4", &[]), 2.0);
    assert_eq!(interp("(2+3)&4", &[]), 4.0);
    assert_eq!(interp("1|2|4", &[]), 7.0);
    assert!(interp("1&-2", &[]).is_nan());
}

#[test]
fn test_number_literal_forms() {
    assert_eq!(interp(".5", &[]), 0.5);
    assert_eq!(interp("2.", &[]), 2.0);
    assert_eq!(interp("1e3", &[]), 1000.0);
    assert_eq!(interp("1.5E-2", &[]), 0.015);
    // An exponent marker without digits belongs to the next token.
    assert_approx_eq!(interp("1e+0", &[]), 1.0);
}

#[test]
fn test_whitespace_insensitive() {
    assert_eq!(interp(" \t 1 +\n 2 \r\n* 3 ", &[]), 7.0);
    assert_eq!(interp("1+2*3", &[]), interp("1 + 2 * 3", &[]));
}

#[test]
fn test_builtin_math() {
    assert_approx_eq!(interp("sin(pi/2)", &[]), 1.0);
    assert_approx_eq!(interp("cos 0", &[]), 1.0);
    assert_approx_eq!(interp("tan(pi/4)", &[]), 1.0);
    assert_approx_eq!(interp("atan2(1, 1)", &[]), constants::PI / 4.0);
    assert_approx_eq!(interp("exp(1)", &[]), constants::E);
    assert_approx_eq!(interp("ln(e)", &[]), 1.0);
    assert_approx_eq!(interp("log(1000)", &[]), 3.0);
    assert_approx_eq!(interp("log10(100)", &[]), 2.0);
    assert_eq!(interp("sqrt(64)", &[]), 8.0);
    assert_eq!(interp("abs(-42)", &[]), 42.0);
    assert_eq!(interp("floor(2.7) + ceil(2.1)", &[]), 5.0);
    assert_eq!(interp("pow(2, 10)", &[]), 1024.0);
}

#[test]
fn test_combinatorics() {
    assert_eq!(interp("fac(5)", &[]), 120.0);
    assert_eq!(interp("ncr(6, 2)", &[]), 15.0);
    assert_eq!(interp("npr(6, 2)", &[]), 30.0);
    assert_eq!(interp("fac 0", &[]), 1.0);
}

#[test]
fn test_domain_errors_are_nan_not_failures() {
    assert!(interp("sqrt(-1)", &[]).is_nan());
    assert!(interp("ln(-1)", &[]).is_nan());
    assert!(interp("0/0", &[]).is_nan());
    assert_eq!(interp("1/0", &[]), Real::INFINITY);
    // NaN propagates through enclosing arithmetic.
    assert!(interp("1 + sqrt(-1) * 2", &[]).is_nan());
}

#[test]
fn test_variable_mutation_between_evaluations() {
    let x = Cell::new(3.0);
    let y = Cell::new(4.0);
    let bindings = [Binding::scalar("x", &x), Binding::scalar("y", &y)];
    let tree = compile("sqrt(x^2 + y^2)", &bindings).unwrap();

    assert_approx_eq!(eval(&tree), 5.0);
    x.set(5.0);
    y.set(12.0);
    assert_approx_eq!(eval(&tree), 13.0);
}

#[test]
fn test_constant_folding_is_transparent() {
    let x = Cell::new(2.0);
    let bindings = [Binding::scalar("x", &x)];
    for input in [
        "1 + 2 * 3",
        "sin(pi/6) + cos(pi/3)",
        "x * (3 + 4)",
        "-2^2",
        "sqrt(-1)",
        "fac(10) / fac(7)",
    ] {
        let raw = parse_expression(input, &bindings).unwrap();
        let folded = compile(input, &bindings).unwrap();
        let a = eval(&raw);
        let b = eval(&folded);
        assert!(
            a == b || (a.is_nan() && b.is_nan()),
            "{}: {} != {}",
            input,
            a,
            b
        );
    }
}

#[test]
fn test_compile_folds_constant_expression_to_leaf() {
    let tree = compile("2 + 3 * 4", &[]).unwrap();
    assert!(matches!(tree, Expr::Constant(v) if v == 14.0));
    // A variable keeps its subtree alive.
    let x = Cell::new(0.0);
    let bindings = [Binding::scalar("x", &x)];
    let tree = compile("x + 1", &bindings).unwrap();
    assert!(matches!(tree, Expr::Call { .. }));
}

#[test]
fn test_error_positions() {
    // 1-based byte offsets of the offending token.
    assert_eq!(
        compile("(1+2", &[]).unwrap_err(),
        ExprError::UnmatchedParenthesis { position: 5 }
    );
    assert_eq!(
        compile("1 + * 2", &[]).unwrap_err(),
        ExprError::Syntax { position: 5 }
    );
    assert_eq!(
        compile("4 5", &[]).unwrap_err(),
        ExprError::TrailingInput { position: 3 }
    );
    assert_eq!(compile("1 + frobnicate", &[]).unwrap_err().position(), 5);
    assert_eq!(
        compile("2 # 3", &[]).unwrap_err(),
        ExprError::IllegalCharacter {
            found: '#',
            position: 3
        }
    );
    assert!(matches!(
        compile("", &[]).unwrap_err(),
        ExprError::Syntax { position: 1 }
    ));
}

#[test]
fn test_error_display() {
    let err = compile("1 + oops", &[]).unwrap_err();
    let msg = format!("{}", err);
    assert!(msg.contains("oops"));
    assert!(msg.contains('5'));
}

#[test]
fn test_comma_sequences() {
    assert_eq!(interp("1, 2, 3", &[]), 3.0);
    assert_eq!(interp("(sqrt 16, 5+5)", &[]), 10.0);
}

#[test]
fn test_custom_function_bindings() {
    fn square(x: Real) -> Real {
        x * x
    }
    fn hypot2(x: Real, y: Real) -> Real {
        x * x + y * y
    }
    let bindings = [
        Binding::pure_function("square", Callable::Native1(square)),
        Binding::pure_function("hypot2", Callable::Native2(hypot2)),
    ];
    assert_eq!(interp("square 7", &bindings), 49.0);
    assert_eq!(interp("hypot2(3, 4)", &bindings), 25.0);
    // Pure bindings participate in folding.
    let tree = compile("square(6)", &bindings).unwrap();
    assert!(matches!(tree, Expr::Constant(v) if v == 36.0));
}

#[test]
fn test_approx_assertion_accepts_bare_literals() {
    // Literal operands on either side, no surrounding type context.
    assert_approx_eq!(1.0, 1.0);
    assert_approx_eq!(0.1 + 0.2, 0.3);
    assert_approx_eq!(interp("0.1 + 0.2", &[]), 0.3);
    assert_approx_eq!(Real::NAN, interp("sqrt(-1)", &[]));
    assert_approx_eq!(1.0 / 0.0, Real::INFINITY);
    assert_approx_eq!(interp("2^10", &[]), 1024.0, 0.5);
}

#[test]
fn test_long_operand_chains() {
    let input = (0..200).map(|_| "1").collect::<Vec<_>>().join("+");
    assert_eq!(interp(&input, &[]), 200.0);
}
