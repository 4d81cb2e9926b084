//! Lexer for SVM source code.
//!
//! Produces tokens lazily, one per call, consuming exactly the characters
//! each token needs. Whitespace, `//` line comments and `/* */` block
//! comments are skipped before every token. The lexer never fails: an
//! unterminated comment or string runs to end of input, and any byte it
//! does not recognise becomes a one-character operator token for the
//! parser to reject.

use super::token::{Keyword, Token, TokenKind};

pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            pos: 0,
            line: 1,
            column: 1,
            done: false,
        }
    }

    /// Scan the next token. Returns `Eof` forever once input is exhausted.
    pub fn next_token(&mut self) -> Token<'a> {
        self.skip_trivia();

        let source = self.source;
        let line = self.line;
        let column = self.column;
        let start = self.pos;

        let (kind, lexeme) = match self.peek() {
            None => (TokenKind::Eof, ""),
            Some(c) if c.is_ascii_digit() => {
                self.consume_while(|c| c.is_ascii_digit() || c == '.');
                (TokenKind::Number, &source[start..self.pos])
            }
            Some('"') => {
                self.bump();
                let content_start = self.pos;
                self.consume_while(|c| c != '"');
                let content = &source[content_start..self.pos];
                // closing quote, if the string was terminated
                self.bump();
                (TokenKind::String, content)
            }
            Some('+' | '-' | '*' | '/') => {
                self.bump();
                (TokenKind::Operator, &source[start..self.pos])
            }
            Some('=' | ';' | '(' | ')' | '{' | '}' | '.' | ':' | ',') => {
                self.bump();
                (TokenKind::Punctuator, &source[start..self.pos])
            }
            Some(c) if is_ident_start(c) => {
                self.consume_while(is_ident_continue);
                let ident = &source[start..self.pos];
                (classify_ident(ident), ident)
            }
            Some(_) => {
                self.bump();
                (TokenKind::Operator, &source[start..self.pos])
            }
        };

        Token {
            kind,
            lexeme,
            line,
            column,
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            self.consume_while(|c| matches!(c, ' ' | '\t' | '\n' | '\r'));

            let rest = &self.source[self.pos..];
            if rest.starts_with("//") {
                self.consume_while(|c| c != '\n');
            } else if rest.starts_with("/*") {
                self.bump();
                self.bump();
                while self.peek().is_some() && !self.source[self.pos..].starts_with("*/") {
                    self.bump();
                }
                self.bump();
                self.bump();
            } else {
                break;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    /// Consume one character, tracking line and column
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn consume_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.bump();
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    /// Yields every token up to, not including, end of input
    fn next(&mut self) -> Option<Token<'a>> {
        if self.done {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.done = true;
            return None;
        }
        Some(token)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

fn classify_ident(ident: &str) -> TokenKind {
    match ident {
        "true" | "false" => TokenKind::Boolean,
        "undefined" => TokenKind::Undefined,
        "null" => TokenKind::Null,
        _ => match Keyword::from_ident(ident) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier,
        },
    }
}
