//! Parse error types.
//!
//! Tokenization errors render with a `Lexer:` prefix, grammar errors with a
//! `Parser:` prefix, so callers can report them verbatim.

use crate::span::Span;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Lexer: unrecognized token '{found}' at line {span}")]
    UnrecognizedToken { found: String, span: Span },

    #[error("Parser: unexpected token '{found}' at line {span}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        span: Span,
    },

    #[error("Parser: unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("Parser: cannot assign to '{target}' at line {span}")]
    InvalidAssignTarget { target: String, span: Span },

    #[error("Parser: function parameters must be plain names at line {span}")]
    InvalidParameter { span: Span },
}

impl ParseError {
    /// True when the input ended before the construct was closed; the REPL
    /// uses this to keep reading continuation lines.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, ParseError::UnexpectedEof { .. })
    }

    /// Source location of the error, if one is known.
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::UnrecognizedToken { span, .. }
            | ParseError::UnexpectedToken { span, .. }
            | ParseError::InvalidAssignTarget { span, .. }
            | ParseError::InvalidParameter { span } => Some(*span),
            ParseError::UnexpectedEof { .. } => None,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
