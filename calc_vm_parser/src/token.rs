//! Token definitions for the calc lexer.

use logos::Logos;

/// Strip the surrounding quotes and process escape sequences.
/// Returns `None` for an unknown escape, which surfaces as a lexer error.
fn unescape(quoted: &str) -> Option<String> {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            _ => return None,
        }
    }
    Some(out)
}

/// calc tokens. Whitespace is skipped except for newlines, which separate
/// statements and are therefore tokens in their own right.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
pub enum Token {
    // Keywords
    #[token("true")]
    KwTrue,
    #[token("false")]
    KwFalse,
    #[token("if")]
    KwIf,
    #[token("else")]
    KwElse,
    #[token("while")]
    KwWhile,
    #[token("return")]
    KwReturn,

    // Literals and names
    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    FloatLit(f64),
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    IntLit(i64),
    #[regex(r"[a-z][a-z0-9_]*", |lex| lex.slice().to_string())]
    Name(String),
    #[regex(r#""(\\.|[^"\\\n])*""#, |lex| unescape(lex.slice()))]
    StringLit(String),

    // Operators
    #[token("->")]
    Arrow,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LessEq,
    #[token(">=")]
    GreaterEq,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Assign,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("!")]
    Bang,
    #[token("#")]
    Hash,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token("\n")]
    Newline,
}

impl Token {
    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::KwTrue => "true".into(),
            Token::KwFalse => "false".into(),
            Token::KwIf => "if".into(),
            Token::KwElse => "else".into(),
            Token::KwWhile => "while".into(),
            Token::KwReturn => "return".into(),
            Token::FloatLit(f) => f.to_string(),
            Token::IntLit(i) => i.to_string(),
            Token::Name(n) => n.clone(),
            Token::StringLit(_) => "string literal".into(),
            Token::Arrow => "->".into(),
            Token::EqEq => "==".into(),
            Token::NotEq => "!=".into(),
            Token::LessEq => "<=".into(),
            Token::GreaterEq => ">=".into(),
            Token::Less => "<".into(),
            Token::Greater => ">".into(),
            Token::Plus => "+".into(),
            Token::Minus => "-".into(),
            Token::Star => "*".into(),
            Token::Slash => "/".into(),
            Token::Percent => "%".into(),
            Token::Assign => "=".into(),
            Token::Amp => "&".into(),
            Token::Pipe => "|".into(),
            Token::Bang => "!".into(),
            Token::Hash => "#".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
            Token::LBracket => "[".into(),
            Token::RBracket => "]".into(),
            Token::LBrace => "{".into(),
            Token::RBrace => "}".into(),
            Token::Comma => ",".into(),
            Token::Colon => ":".into(),
            Token::Semicolon => ";".into(),
            Token::Newline => "newline".into(),
        }
    }
}
