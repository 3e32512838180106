//! Lexer producing resolver-bound tokens.
//!
//! Identifiers are resolved the moment they are scanned: a token for `x`
//! already carries the bound cell, and a token for `sin` carries the
//! callable. Unresolved identifiers, malformed numbers, and characters
//! outside the language become error tokens carrying a ready-made
//! [`ExprError`], which the parser surfaces as soon as it meets them.

extern crate alloc;
use alloc::string::String;
use core::cell::Cell;

use crate::Real;
use crate::context::{Binding, BindingValue, resolve};
use crate::error::ExprError;
use crate::types::{BinaryOp, Callable};

/// A token produced by the lexer.
///
/// `position` is the 0-based byte offset of the token's first character;
/// errors derived from a token report `position + 1`.
#[derive(Clone, Debug)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub position: usize,
}

#[derive(Clone, Debug)]
pub enum TokenKind<'a> {
    Number(Real),
    /// An identifier resolved to a scalar variable binding.
    Scalar(&'a Cell<Real>),
    /// An identifier resolved to an array binding.
    Array(&'a [Cell<Real>]),
    /// An identifier resolved to a function or closure binding.
    Call {
        name: String,
        fun: Callable<'a>,
        pure: bool,
    },
    Infix(BinaryOp),
    Open,
    Close,
    OpenBracket,
    CloseBracket,
    Separator,
    End,
    Error(ExprError),
}

/// The lexer struct, which produces tokens from an input string.
pub struct Lexer<'s, 'a> {
    input: &'s str,
    pos: usize,
    bindings: &'s [Binding<'a>],
}

impl<'s, 'a> Lexer<'s, 'a> {
    pub fn new(input: &'s str, bindings: &'s [Binding<'a>]) -> Self {
        Self {
            input,
            pos: 0,
            bindings,
        }
    }

    /// Peek at the current character.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_at(&self, pos: usize) -> Option<char> {
        self.input[pos..].chars().next()
    }

    /// Advance the position by one character.
    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    /// Skip whitespace (space, tab, CR, LF).
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if matches!(c, ' ' | '\t' | '\r' | '\n') {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn token(&self, kind: TokenKind<'a>, position: usize) -> Token<'a> {
        Token { kind, position }
    }

    /// Scan the longest decimal/exponential literal starting at the cursor.
    ///
    /// An exponent marker without digits is not consumed, so `1e+` lexes as
    /// the number `1` followed by an identifier, matching the longest valid
    /// prefix rule of `strtod`.
    fn scan_number(&mut self) -> Token<'a> {
        let start = self.pos;

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let mark = self.pos;
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
            } else {
                self.pos = mark;
            }
        }

        match self.input[start..self.pos].parse::<Real>() {
            Ok(value) => self.token(TokenKind::Number(value), start),
            Err(_) => self.token(ExprError::InvalidNumber { position: start + 1 }.into(), start),
        }
    }

    /// Scan an identifier and resolve it immediately.
    fn scan_identifier(&mut self) -> Token<'a> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }
        let name = &self.input[start..self.pos];

        let kind = match resolve(self.bindings, name) {
            Some(BindingValue::Scalar(cell)) => TokenKind::Scalar(cell),
            Some(BindingValue::Array(cells)) => TokenKind::Array(cells),
            Some(BindingValue::Function { fun, pure }) => TokenKind::Call {
                name: String::from(name),
                fun,
                pure,
            },
            None => TokenKind::Error(ExprError::UnknownIdentifier {
                name: String::from(name),
                position: start + 1,
            }),
        };
        self.token(kind, start)
    }

    /// Get the next token from the input.
    pub fn next_token(&mut self) -> Token<'a> {
        self.skip_whitespace();
        let start = self.pos;

        let Some(c) = self.peek() else {
            return self.token(TokenKind::End, start);
        };

        if c.is_ascii_digit() {
            return self.scan_number();
        }
        if c == '.' {
            // Could be a leading-dot literal like `.5`.
            if self.peek_at(start + 1).is_some_and(|d| d.is_ascii_digit()) {
                return self.scan_number();
            }
            self.advance();
            return self.token(ExprError::InvalidNumber { position: start + 1 }.into(), start);
        }
        if c.is_ascii_alphabetic() {
            return self.scan_identifier();
        }

        let kind = match c {
            '+' => TokenKind::Infix(BinaryOp::Add),
            '-' => TokenKind::Infix(BinaryOp::Sub),
            '*' => TokenKind::Infix(BinaryOp::Mul),
            '/' => TokenKind::Infix(BinaryOp::Div),
            '%' => TokenKind::Infix(BinaryOp::Rem),
            '^' => TokenKind::Infix(BinaryOp::Pow),
            '&' => TokenKind::Infix(BinaryOp::And),
            '|' => TokenKind::Infix(BinaryOp::Or),
            '(' => TokenKind::Open,
            ')' => TokenKind::Close,
            '[' => TokenKind::OpenBracket,
            ']' => TokenKind::CloseBracket,
            ',' => TokenKind::Separator,
            other => TokenKind::Error(ExprError::IllegalCharacter {
                found: other,
                position: start + 1,
            }),
        };
        self.advance();
        self.token(kind, start)
    }
}

impl<'a> From<ExprError> for TokenKind<'a> {
    fn from(err: ExprError) -> Self {
        TokenKind::Error(err)
    }
}
