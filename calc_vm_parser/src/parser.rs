//! Recursive descent parser for the calc surface language.
//!
//! Statements are expressions; newlines and semicolons separate them at the
//! top level and inside `{ }` blocks. Precedence, lowest first:
//!
//! ```text
//! |   <   &   <   == !=   <   < > <= >=   <   + -   <   * / %   <   ! # -   <   call/index
//! ```

use crate::ast::{BinOp, Node, UnOp};
use crate::error::{ParseError, ParseResult};
use crate::lexer::{Lexer, SpannedToken};
use crate::span::Span;
use crate::token::Token;

#[derive(Debug)]
pub struct Parser<'a> {
    lexer: Lexer<'a>,
}

fn unexpected(found: &SpannedToken, expected: &str) -> ParseError {
    ParseError::UnexpectedToken {
        found: found.token.describe(),
        expected: expected.into(),
        span: found.span,
    }
}

fn eof(expected: &str) -> ParseError {
    ParseError::UnexpectedEof {
        expected: expected.into(),
    }
}

fn binop_for(token: &Token) -> Option<(u8, BinOp)> {
    Some(match token {
        Token::Pipe => (1, BinOp::Or),
        Token::Amp => (2, BinOp::And),
        Token::EqEq => (3, BinOp::Eq),
        Token::NotEq => (3, BinOp::Ne),
        Token::Less => (4, BinOp::Lt),
        Token::Greater => (4, BinOp::Gt),
        Token::LessEq => (4, BinOp::Le),
        Token::GreaterEq => (4, BinOp::Ge),
        Token::Plus => (5, BinOp::Add),
        Token::Minus => (5, BinOp::Sub),
        Token::Star => (6, BinOp::Mul),
        Token::Slash => (6, BinOp::Div),
        Token::Percent => (6, BinOp::Mod),
        _ => return None,
    })
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lexer: Lexer::new(source),
        }
    }

    /// Parse a statement sequence, consuming the whole input.
    pub fn parse(mut self) -> ParseResult<Vec<Node>> {
        let mut stmts = Vec::new();
        self.skip_separators()?;
        while self.peek()?.is_some() {
            stmts.push(self.expr()?);
            match self.peek()? {
                None => break,
                Some(t) if matches!(t.token, Token::Newline | Token::Semicolon) => {
                    self.skip_separators()?;
                }
                Some(t) => return Err(unexpected(&t, "end of statement")),
            }
        }
        Ok(stmts)
    }

    fn peek(&mut self) -> ParseResult<Option<SpannedToken>> {
        match self.lexer.peek() {
            None => Ok(None),
            Some(Ok(t)) => Ok(Some(t.clone())),
            Some(Err(e)) => Err(e.clone()),
        }
    }

    fn advance(&mut self) -> ParseResult<Option<SpannedToken>> {
        self.lexer.next_token().transpose()
    }

    fn expect(&mut self, expected: Token, what: &str) -> ParseResult<SpannedToken> {
        match self.advance()? {
            Some(t) if t.token == expected => Ok(t),
            Some(t) => Err(unexpected(&t, what)),
            None => Err(eof(what)),
        }
    }

    fn skip_newlines(&mut self) -> ParseResult<()> {
        while matches!(self.peek()?, Some(t) if t.token == Token::Newline) {
            self.advance()?;
        }
        Ok(())
    }

    fn skip_separators(&mut self) -> ParseResult<()> {
        while matches!(self.peek()?, Some(t) if matches!(t.token, Token::Newline | Token::Semicolon))
        {
            self.advance()?;
        }
        Ok(())
    }

    fn expr(&mut self) -> ParseResult<Node> {
        match self.peek()? {
            Some(t) if t.token == Token::KwReturn => {
                self.advance()?;
                Ok(Node::Return(Box::new(self.expr()?)))
            }
            Some(t) if t.token == Token::KwIf => self.if_expr(),
            Some(t) if t.token == Token::KwWhile => self.while_expr(),
            _ => self.assign_expr(),
        }
    }

    fn if_expr(&mut self) -> ParseResult<Node> {
        self.advance()?;
        let cond = Box::new(self.expr()?);
        let then = Box::new(self.expr()?);
        if matches!(self.peek()?, Some(t) if t.token == Token::KwElse) {
            self.advance()?;
            let otherwise = Box::new(self.expr()?);
            Ok(Node::IfElse {
                cond,
                then,
                otherwise,
            })
        } else {
            Ok(Node::If { cond, then })
        }
    }

    fn while_expr(&mut self) -> ParseResult<Node> {
        self.advance()?;
        let cond = Box::new(self.expr()?);
        let body = Box::new(self.expr()?);
        Ok(Node::While { cond, body })
    }

    fn assign_expr(&mut self) -> ParseResult<Node> {
        let left = self.binary_expr(0)?;
        if let Some(t) = self.peek()? {
            if t.token == Token::Assign {
                self.advance()?;
                if !matches!(left, Node::Name(_)) {
                    let target = match left.token() {
                        t if t.is_empty() => "expression".to_string(),
                        t => t,
                    };
                    return Err(ParseError::InvalidAssignTarget {
                        target,
                        span: t.span,
                    });
                }
                let value = self.expr()?;
                return Ok(Node::Assign {
                    target: Box::new(left),
                    value: Box::new(value),
                });
            }
        }
        Ok(left)
    }

    fn binary_expr(&mut self, min_prec: u8) -> ParseResult<Node> {
        let mut left = self.unary_expr()?;
        while let Some(t) = self.peek()? {
            let Some((prec, op)) = binop_for(&t.token) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.advance()?;
            // prec + 1 keeps operators of equal precedence left associative
            let right = self.binary_expr(prec + 1)?;
            left = Node::BinOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn unary_expr(&mut self) -> ParseResult<Node> {
        if let Some(t) = self.peek()? {
            let op = match t.token {
                Token::Bang => Some(UnOp::Not),
                Token::Minus => Some(UnOp::Neg),
                Token::Hash => Some(UnOp::Len),
                _ => None,
            };
            if let Some(op) = op {
                self.advance()?;
                let target = Box::new(self.unary_expr()?);
                return Ok(Node::UnOp { op, target });
            }
        }
        self.postfix_expr()
    }

    fn postfix_expr(&mut self) -> ParseResult<Node> {
        let mut expr = self.primary_expr()?;
        loop {
            match self.peek()? {
                Some(t) if t.token == Token::LParen => {
                    self.advance()?;
                    let args = self.call_args()?;
                    expr = Node::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                Some(t) if t.token == Token::LBracket => {
                    self.advance()?;
                    let first = self.expr()?;
                    if matches!(self.peek()?, Some(t) if t.token == Token::Colon) {
                        self.advance()?;
                        let to = self.expr()?;
                        self.expect(Token::RBracket, "']'")?;
                        expr = Node::IndexFromTo {
                            target: Box::new(expr),
                            from: Box::new(first),
                            to: Box::new(to),
                        };
                    } else {
                        self.expect(Token::RBracket, "']'")?;
                        expr = Node::IndexAt {
                            target: Box::new(expr),
                            at: Box::new(first),
                        };
                    }
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn call_args(&mut self) -> ParseResult<Vec<Node>> {
        let mut args = Vec::new();
        self.skip_newlines()?;
        match self.peek()? {
            Some(t) if t.token == Token::RParen => {
                self.advance()?;
                return Ok(args);
            }
            Some(_) => {}
            None => return Err(eof("')'")),
        }
        loop {
            args.push(self.expr()?);
            self.skip_newlines()?;
            match self.advance()? {
                Some(t) if t.token == Token::Comma => self.skip_newlines()?,
                Some(t) if t.token == Token::RParen => break,
                Some(t) => return Err(unexpected(&t, "',' or ')'")),
                None => return Err(eof("')'")),
            }
        }
        Ok(args)
    }

    fn primary_expr(&mut self) -> ParseResult<Node> {
        let Some(t) = self.advance()? else {
            return Err(eof("expression"));
        };
        match t.token {
            Token::IntLit(i) => Ok(Node::Int(i)),
            Token::FloatLit(f) => Ok(Node::Float(f)),
            Token::StringLit(s) => Ok(Node::Str(s)),
            Token::KwTrue => Ok(Node::Bool(true)),
            Token::KwFalse => Ok(Node::Bool(false)),
            Token::Name(n) => Ok(Node::Name(n)),
            Token::LBracket => self.array_literal(),
            Token::LBrace => self.block(),
            Token::LParen => self.paren_or_function(t.span),
            other => Err(ParseError::UnexpectedToken {
                found: other.describe(),
                expected: "expression".into(),
                span: t.span,
            }),
        }
    }

    /// Array literal; the opening bracket has been consumed.
    fn array_literal(&mut self) -> ParseResult<Node> {
        let mut elems = Vec::new();
        self.skip_newlines()?;
        match self.peek()? {
            Some(t) if t.token == Token::RBracket => {
                self.advance()?;
                return Ok(Node::Array(elems));
            }
            Some(_) => {}
            None => return Err(eof("']'")),
        }
        loop {
            elems.push(self.expr()?);
            self.skip_newlines()?;
            match self.advance()? {
                Some(t) if t.token == Token::Comma => self.skip_newlines()?,
                Some(t) if t.token == Token::RBracket => break,
                Some(t) => return Err(unexpected(&t, "',' or ']'")),
                None => return Err(eof("']'")),
            }
        }
        Ok(Node::Array(elems))
    }

    /// Block; the opening brace has been consumed.
    fn block(&mut self) -> ParseResult<Node> {
        let mut stmts = Vec::new();
        self.skip_separators()?;
        loop {
            match self.peek()? {
                None => return Err(eof("'}'")),
                Some(t) if t.token == Token::RBrace => {
                    self.advance()?;
                    break;
                }
                Some(_) => {
                    stmts.push(self.expr()?);
                    match self.peek()? {
                        Some(t) if matches!(t.token, Token::Newline | Token::Semicolon) => {
                            self.skip_separators()?;
                        }
                        Some(t) if t.token == Token::RBrace => {}
                        Some(t) => return Err(unexpected(&t, "newline, ';' or '}'")),
                        None => return Err(eof("'}'")),
                    }
                }
            }
        }
        Ok(Node::Block(stmts))
    }

    /// Either a parenthesized expression or a function literal; the opening
    /// parenthesis has been consumed. `(a, b) -> body` is recognized by the
    /// arrow after the closing parenthesis.
    fn paren_or_function(&mut self, open: Span) -> ParseResult<Node> {
        self.skip_newlines()?;
        match self.peek()? {
            Some(t) if t.token == Token::RParen => {
                self.advance()?;
                self.expect(Token::Arrow, "'->'")?;
                return self.function_body(Vec::new());
            }
            Some(_) => {}
            None => return Err(eof("')'")),
        }
        let mut items = vec![self.expr()?];
        self.skip_newlines()?;
        loop {
            match self.advance()? {
                Some(t) if t.token == Token::Comma => {
                    self.skip_newlines()?;
                    items.push(self.expr()?);
                    self.skip_newlines()?;
                }
                Some(t) if t.token == Token::RParen => break,
                Some(t) => return Err(unexpected(&t, "',' or ')'")),
                None => return Err(eof("')'")),
            }
        }
        if matches!(self.peek()?, Some(t) if t.token == Token::Arrow) {
            self.advance()?;
            let mut params = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Node::Name(n) => params.push(n),
                    _ => return Err(ParseError::InvalidParameter { span: open }),
                }
            }
            return self.function_body(params);
        }
        if items.len() == 1 {
            if let Some(single) = items.pop() {
                return Ok(single);
            }
        }
        // a comma separated list in parentheses is only valid before '->'
        match self.peek()? {
            Some(t) => Err(unexpected(&t, "'->'")),
            None => Err(eof("'->'")),
        }
    }

    fn function_body(&mut self, params: Vec<String>) -> ParseResult<Node> {
        let body = Box::new(self.expr()?);
        Ok(Node::Function {
            params,
            body,
            local_cnt: 0,
        })
    }
}
