//! Error types and handling for the texpr crate.
//!
//! All errors here are compile-time errors: evaluation never fails and
//! reports numeric domain problems as NaN instead. Every variant carries the
//! 1-based character offset into the source expression at which parsing
//! could not continue, available through [`ExprError::position`].

extern crate alloc;
use alloc::string::String;
use core::fmt;
use core::result;

/// Result type used throughout the crate.
///
/// This is a convenience type alias that uses the `ExprError` type for the
/// error variant.
pub type Result<T> = result::Result<T, ExprError>;

/// Error type for expression compilation.
///
/// There is deliberately no evaluation-time counterpart: a compiled tree
/// always evaluates to a number, with NaN standing in for domain errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprError {
    /// An identifier did not resolve against the caller bindings or the
    /// builtin table.
    ///
    /// To resolve this error, supply a binding with that name or check the
    /// spelling against the builtin function list.
    UnknownIdentifier { name: String, position: usize },

    /// A numeric literal could not be scanned as a floating point number.
    ///
    /// For example, `.` with no digits or `1e` with no exponent digits.
    InvalidNumber { position: usize },

    /// A character that is not part of the expression language.
    IllegalCharacter { found: char, position: usize },

    /// An opening parenthesis without a matching `)`.
    UnmatchedParenthesis { position: usize },

    /// An opening bracket without a matching `]`.
    UnmatchedBracket { position: usize },

    /// A function or closure was called with the wrong number of arguments.
    ///
    /// The parser consumes exactly the bound arity's worth of comma-separated
    /// subexpressions; anything else (including a trailing comma) fails here.
    ArityMismatch {
        name: String,
        expected: usize,
        position: usize,
    },

    /// `[` applied to something that is not a plain bound array variable.
    ///
    /// Indexing is only legal directly on an array binding; the result of an
    /// index is a scalar, so chained indexing also fails here.
    IndexTarget { position: usize },

    /// Expression nesting exceeded the parser's fixed depth limit.
    ///
    /// The limit bounds stack use while parsing, evaluating, and dropping
    /// the tree; an expression this deep is almost certainly generated, not
    /// written.
    RecursionLimit { position: usize },

    /// Input remained after a complete expression was parsed.
    TrailingInput { position: usize },

    /// The parser expected an operand and found something else.
    ///
    /// This is the catch-all for malformed expression structure, e.g. `2 + *`
    /// or an empty argument between commas.
    Syntax { position: usize },
}

impl ExprError {
    /// 1-based character offset into the source expression.
    ///
    /// Deterministic: compiling the same malformed input always reports the
    /// same offset.
    pub fn position(&self) -> usize {
        match self {
            ExprError::UnknownIdentifier { position, .. }
            | ExprError::InvalidNumber { position }
            | ExprError::IllegalCharacter { position, .. }
            | ExprError::UnmatchedParenthesis { position }
            | ExprError::UnmatchedBracket { position }
            | ExprError::ArityMismatch { position, .. }
            | ExprError::IndexTarget { position }
            | ExprError::RecursionLimit { position }
            | ExprError::TrailingInput { position }
            | ExprError::Syntax { position } => *position,
        }
    }
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprError::UnknownIdentifier { name, position } => {
                write!(f, "Unknown identifier '{}' at position {}", name, position)
            }
            ExprError::InvalidNumber { position } => {
                write!(f, "Malformed number at position {}", position)
            }
            ExprError::IllegalCharacter { found, position } => {
                write!(f, "Illegal character '{}' at position {}", found, position)
            }
            ExprError::UnmatchedParenthesis { position } => {
                write!(f, "Unmatched parenthesis at position {}", position)
            }
            ExprError::UnmatchedBracket { position } => {
                write!(f, "Unmatched bracket at position {}", position)
            }
            ExprError::ArityMismatch {
                name,
                expected,
                position,
            } => {
                write!(
                    f,
                    "Invalid call to '{}' at position {}: expected {} argument(s)",
                    name, position, expected
                )
            }
            ExprError::IndexTarget { position } => {
                write!(
                    f,
                    "Index at position {} applied to something that is not an array variable",
                    position
                )
            }
            ExprError::RecursionLimit { position } => {
                write!(
                    f,
                    "Expression nesting too deep at position {}",
                    position
                )
            }
            ExprError::TrailingInput { position } => {
                write!(f, "Unexpected trailing input at position {}", position)
            }
            ExprError::Syntax { position } => {
                write!(f, "Syntax error at position {}", position)
            }
        }
    }
}
