//! Lexer for calc source code.
//!
//! Wraps the logos-generated lexer with span tracking and single-token
//! lookahead for the recursive descent parser.

use logos::Logos;

use crate::error::{ParseError, ParseResult};
use crate::span::{SourceMap, Span};
use crate::token::Token;

/// A token with its span.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

pub struct Lexer<'a> {
    source: &'a str,
    inner: logos::Lexer<'a, Token>,
    source_map: SourceMap,
    peeked: Option<Option<ParseResult<SpannedToken>>>,
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer").field("source", &self.source).finish()
    }
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            inner: Token::lexer(source),
            source_map: SourceMap::new(source),
            peeked: None,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&mut self) -> Option<&ParseResult<SpannedToken>> {
        if self.peeked.is_none() {
            self.peeked = Some(self.next_token_internal());
        }
        match &self.peeked {
            Some(peeked) => peeked.as_ref(),
            None => None,
        }
    }

    /// Get the next token, `None` at end of input.
    pub fn next_token(&mut self) -> Option<ParseResult<SpannedToken>> {
        if let Some(peeked) = self.peeked.take() {
            return peeked;
        }
        self.next_token_internal()
    }

    fn next_token_internal(&mut self) -> Option<ParseResult<SpannedToken>> {
        let result = self.inner.next()?;
        let range = self.inner.span();
        let span = self.source_map.span(range.start, range.end);

        match result {
            Ok(token) => Some(Ok(SpannedToken { token, span })),
            Err(()) => Some(Err(ParseError::UnrecognizedToken {
                found: self.source[range].to_string(),
                span,
            })),
        }
    }
}
