//! calc_vm_parser
//!
//! Lexer and parser for the calc expression language. Produces the AST that
//! the `calc_vm` crate resolves, compiles to bytecode, and executes.
//!
//! # Example
//!
//! ```
//! use calc_vm_parser::{parse, ast::Node};
//!
//! let stmts = parse("1 + 2").expect("parse failed");
//! assert!(matches!(stmts[0], Node::BinOp { .. }));
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod token;

pub use ast::{BinOp, Node, UnOp};
pub use error::{ParseError, ParseResult};
pub use lexer::{Lexer, SpannedToken};
pub use parser::Parser;
pub use span::{SourceMap, Span};
pub use token::Token;

/// Parse calc source into a statement sequence.
pub fn parse(source: &str) -> ParseResult<Vec<Node>> {
    Parser::new(source).parse()
}
