//! Bitwise operators and builtins over the 53-bit safe integer range.

use texpr::{Real, interp};

#[test]
fn test_bitwise_and() {
    assert_eq!(interp("5 & 3", &[]), 1.0);
    assert_eq!(interp("12 & 10", &[]), 8.0);
    assert_eq!(interp("255 & 15", &[]), 15.0);
    assert_eq!(interp("0 & 7", &[]), 0.0);
}

#[test]
fn test_bitwise_or() {
    assert_eq!(interp("5 | 2", &[]), 7.0);
    assert_eq!(interp("8 | 4", &[]), 12.0);
    assert_eq!(interp("0 | 0", &[]), 0.0);
    assert_eq!(interp("255 | 256", &[]), 511.0);
}

#[test]
fn test_xor_builtin() {
    assert_eq!(interp("xor(5, 3)", &[]), 6.0);
    assert_eq!(interp("xor(255, 170)", &[]), 85.0);
    assert_eq!(interp("xor(0, 0)", &[]), 0.0);
    assert_eq!(interp("xor(7, 7)", &[]), 0.0);
}

#[test]
fn test_bit_builtin() {
    assert_eq!(interp("bit(5, 0)", &[]), 1.0);
    assert_eq!(interp("bit(5, 1)", &[]), 0.0);
    assert_eq!(interp("bit(5, 2)", &[]), 1.0);
    assert_eq!(interp("bit(5, 3)", &[]), 0.0);
    assert_eq!(interp("bit(1024, 10)", &[]), 1.0);
    assert_eq!(interp("bit(1024, 9)", &[]), 0.0);
}

#[test]
fn test_operands_round_to_nearest() {
    assert_eq!(interp("5.4 & 3.2", &[]), 1.0);
    assert_eq!(interp("4.6 | 1.1", &[]), 5.0);
    assert_eq!(interp("xor(4.5, 1.4)", &[]), 4.0);
    assert_eq!(interp("bit(4.6, 0)", &[]), 1.0);
}

#[test]
fn test_out_of_range_operands_are_nan() {
    assert!(interp("-1 & 3", &[]).is_nan());
    assert!(interp("3 | -1", &[]).is_nan());
    assert!(interp("xor(-5, 3)", &[]).is_nan());
    assert!(interp("bit(-1, 0)", &[]).is_nan());
    assert!(interp("bit(1, -1)", &[]).is_nan());
    // Past 2^53-1 a double can no longer represent every integer.
    assert!(interp("9100000000000000 & 1", &[]).is_nan());
    assert!(interp("bit(9100000000000000, 0)", &[]).is_nan());
    assert!(interp("bit(1, 53)", &[]).is_nan());
}

#[test]
fn test_largest_safe_operand() {
    let max: Real = ((1u64 << 53) - 1) as Real;
    assert_eq!(interp("9007199254740991 & 9007199254740991", &[]), max);
    assert_eq!(interp("9007199254740991 | 0", &[]), max);
    assert_eq!(interp("bit(9007199254740991, 52)", &[]), 1.0);
}

#[test]
fn test_bitwise_mixes_with_arithmetic() {
    assert_eq!(interp("(2 + 3) & (2 * 3)", &[]), 4.0);
    assert_eq!(interp("1 + 5 & 3", &[]), 1.0 + 1.0);
    assert_eq!(interp("xor(5, 3) * 2", &[]), 12.0);
}
