//! Tokens produced by the lexer.

use std::fmt;

/// Reserved words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Var,
    Print,
    Function,
    Return,
}

impl Keyword {
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "var" => Some(Keyword::Var),
            "print" => Some(Keyword::Print),
            "function" => Some(Keyword::Function),
            "return" => Some(Keyword::Return),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Number,
    String,
    Boolean,
    Undefined,
    Null,
    Identifier,
    Operator,
    Punctuator,
    Keyword(Keyword),
}

/// A token borrowing its lexeme from the source text.
///
/// For strings the lexeme is the content between the quotes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub lexeme: &'a str,
    pub line: usize,
    pub column: usize,
}

impl<'a> Token<'a> {
    /// True for a punctuator or operator spelled exactly `text`
    pub fn is(&self, text: &str) -> bool {
        matches!(self.kind, TokenKind::Punctuator | TokenKind::Operator) && self.lexeme == text
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::String => write!(f, "\"{}\"", self.lexeme),
            _ => write!(f, "{}", self.lexeme),
        }
    }
}
