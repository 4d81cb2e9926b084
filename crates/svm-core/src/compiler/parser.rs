//! Recursive-descent parser and code generator.
//!
//! Single pass with one token of lookahead: grammar rules append opcodes
//! and operands straight to a bounded `BytecodeWriter`, no syntax tree is
//! built. The first error aborts compilation; no partial bytecode escapes.
//!
//! ```text
//! Program    := Statement* EOF
//! Statement  := (VarDecl | PrintStmt | Block | ExprStmt) ';'?
//! VarDecl    := 'var' IDENT ('=' Expression)?
//! PrintStmt  := 'print' '(' Expression ')'
//! Block      := '{' Statement* '}'
//! ExprStmt   := IDENT '=' Expression
//!             | IDENT ('.' IDENT)* ('.' IDENT '=' Expression)?
//! Expression := Primary ('+' Primary)*
//! Primary    := NUMBER | STRING | BOOLEAN | 'undefined' | 'null'
//!             | IDENT ('.' IDENT)*
//!             | '(' Expression ')'
//!             | '{' (IDENT ':' Expression (',' IDENT ':' Expression)*)? '}'
//! ```

use crate::bytecode::{BytecodeWriter, OpCode};
use crate::config::SvmConfig;
use crate::error::{SvmError, SvmResult};

use super::lexer::Lexer;
use super::token::{Keyword, Token, TokenKind};

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token<'a>,
    writer: BytecodeWriter,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, config: &SvmConfig) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Parser {
            lexer,
            current,
            writer: BytecodeWriter::new(config.max_bytecode_len),
            depth: 0,
            max_depth: config.max_nesting_depth,
        }
    }

    /// Compile the whole program, terminated by EXIT
    pub fn compile(mut self) -> SvmResult<Vec<u8>> {
        while self.current.kind != TokenKind::Eof {
            self.statement()?;
        }
        self.writer.emit_op(OpCode::Exit)?;
        Ok(self.writer.finish())
    }

    fn statement(&mut self) -> SvmResult<()> {
        match self.current.kind {
            TokenKind::Keyword(Keyword::Var) => self.var_declaration()?,
            TokenKind::Keyword(Keyword::Print) => self.print_statement()?,
            TokenKind::Keyword(Keyword::Function | Keyword::Return) => {
                return Err(SvmError::ReservedKeyword {
                    line: self.current.line,
                    column: self.current.column,
                    keyword: self.current.lexeme.to_string(),
                })
            }
            TokenKind::Punctuator if self.current.is("{") => self.block()?,
            TokenKind::Identifier => self.expression_statement()?,
            _ => return Err(self.unexpected("statement")),
        }

        if self.current.is(";") {
            self.advance();
        }
        Ok(())
    }

    fn var_declaration(&mut self) -> SvmResult<()> {
        self.advance();
        let name = self.expect_identifier("variable name")?;

        if self.current.is("=") {
            self.advance();
            self.expression()?;
        } else {
            self.writer.emit_op(OpCode::PushUndefined)?;
        }

        self.writer.emit_op(OpCode::StoreVar)?;
        self.writer.emit_name(name.lexeme.as_bytes())
    }

    fn print_statement(&mut self) -> SvmResult<()> {
        self.advance();
        self.expect("(", "'(' after print")?;
        self.expression()?;
        self.expect(")", "')'")?;
        self.writer.emit_op(OpCode::Print)
    }

    fn block(&mut self) -> SvmResult<()> {
        self.nested(Self::block_body)
    }

    fn block_body(&mut self) -> SvmResult<()> {
        self.advance();
        self.writer.emit_op(OpCode::PushEnv)?;

        while !self.current.is("}") {
            if self.current.kind == TokenKind::Eof {
                return Err(self.unexpected("'}'"));
            }
            self.statement()?;
        }
        self.advance();

        self.writer.emit_op(OpCode::PopEnv)
    }

    /// Assignment to a name or a property path, or a bare read whose value
    /// stays on the operand stack.
    fn expression_statement(&mut self) -> SvmResult<()> {
        let name = self.advance();

        if self.current.is("=") {
            self.advance();
            self.expression()?;
            self.writer.emit_op(OpCode::StoreVar)?;
            return self.writer.emit_name(name.lexeme.as_bytes());
        }

        self.writer.emit_op(OpCode::PushVar)?;
        self.writer.emit_name(name.lexeme.as_bytes())?;

        while self.current.is(".") {
            self.advance();
            let prop = self.expect_identifier("property name")?;

            if self.current.is("=") {
                self.advance();
                self.expression()?;
                self.writer.emit_op(OpCode::SetProp)?;
                return self.writer.emit_name(prop.lexeme.as_bytes());
            }

            self.writer.emit_op(OpCode::GetProp)?;
            self.writer.emit_name(prop.lexeme.as_bytes())?;
        }
        Ok(())
    }

    fn expression(&mut self) -> SvmResult<()> {
        self.nested(Self::sum)
    }

    fn sum(&mut self) -> SvmResult<()> {
        self.primary()?;

        while self.current.kind == TokenKind::Operator {
            if !self.current.is("+") {
                return Err(SvmError::UnsupportedOperator {
                    line: self.current.line,
                    column: self.current.column,
                    op: self.current.lexeme.to_string(),
                });
            }
            self.advance();
            self.primary()?;
            self.writer.emit_op(OpCode::Add)?;
        }
        Ok(())
    }

    fn primary(&mut self) -> SvmResult<()> {
        match self.current.kind {
            TokenKind::Number => {
                let token = self.advance();
                let value: f64 = token.lexeme.parse().map_err(|_| SvmError::MalformedNumber {
                    line: token.line,
                    column: token.column,
                    lexeme: token.lexeme.to_string(),
                })?;
                self.writer.emit_op(OpCode::PushNum)?;
                self.writer.emit_f64(value)
            }
            TokenKind::String => {
                let token = self.advance();
                self.writer.emit_op(OpCode::PushStr)?;
                self.writer.emit_name(token.lexeme.as_bytes())
            }
            TokenKind::Boolean => {
                let token = self.advance();
                self.writer.emit_op(OpCode::PushBool)?;
                self.writer.emit_u8(u8::from(token.lexeme == "true"))
            }
            TokenKind::Undefined => {
                self.advance();
                self.writer.emit_op(OpCode::PushUndefined)
            }
            TokenKind::Null => {
                self.advance();
                self.writer.emit_op(OpCode::PushNull)
            }
            TokenKind::Identifier => {
                let name = self.advance();
                self.writer.emit_op(OpCode::PushVar)?;
                self.writer.emit_name(name.lexeme.as_bytes())?;

                while self.current.is(".") {
                    self.advance();
                    let prop = self.expect_identifier("property name")?;
                    self.writer.emit_op(OpCode::GetProp)?;
                    self.writer.emit_name(prop.lexeme.as_bytes())?;
                }
                Ok(())
            }
            TokenKind::Punctuator if self.current.is("(") => {
                self.advance();
                self.expression()?;
                self.expect(")", "')'")?;
                Ok(())
            }
            TokenKind::Punctuator if self.current.is("{") => self.object_literal(),
            _ => Err(self.unexpected("expression")),
        }
    }

    fn object_literal(&mut self) -> SvmResult<()> {
        self.nested(Self::object_body)
    }

    fn object_body(&mut self) -> SvmResult<()> {
        self.advance();
        self.writer.emit_op(OpCode::NewObject)?;

        if self.current.is("}") {
            self.advance();
            return Ok(());
        }

        loop {
            let key = self.expect_identifier("property name")?;
            self.expect(":", "':' after property name")?;
            self.expression()?;
            self.writer.emit_op(OpCode::SetProp)?;
            self.writer.emit_name(key.lexeme.as_bytes())?;

            if self.current.is("}") {
                self.advance();
                return Ok(());
            }
            self.expect(",", "',' or '}'")?;
        }
    }

    /// Run one recursive grammar rule one level deeper. Recursion never
    /// emits bytecode by itself, so depth needs its own bound.
    fn nested(&mut self, rule: fn(&mut Self) -> SvmResult<()>) -> SvmResult<()> {
        if self.depth >= self.max_depth {
            return Err(SvmError::NestingTooDeep {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    /// Move to the next token, returning the one just consumed
    fn advance(&mut self) -> Token<'a> {
        let next = self.lexer.next_token();
        std::mem::replace(&mut self.current, next)
    }

    fn expect(&mut self, text: &str, expected: &'static str) -> SvmResult<Token<'a>> {
        if self.current.is(text) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_identifier(&mut self, expected: &'static str) -> SvmResult<Token<'a>> {
        if self.current.kind == TokenKind::Identifier {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn unexpected(&self, expected: &'static str) -> SvmError {
        SvmError::UnexpectedToken {
            line: self.current.line,
            column: self.current.column,
            expected,
            found: self.current.to_string(),
        }
    }
}
