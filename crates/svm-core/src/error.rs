//! SVM Error Types
//!
//! Defines every error condition produced by the compiler and the virtual
//! machine. All of them are unrecoverable at the point of detection: they
//! propagate to `compile`/`execute` and nothing partial is considered valid.

use std::io;

use thiserror::Error;

/// Broad classification of an [`SvmError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed token sequence.
    Syntax,
    /// A fixed capacity was exceeded while compiling.
    Limit,
    /// Operand type not supported by an operation.
    Type,
    /// Unresolved variable.
    Name,
    /// Runtime stack, scope or bytecode-structure violation.
    Resource,
    /// Output channel failure.
    Io,
}

#[derive(Debug, Error)]
pub enum SvmError {
    // Syntax errors
    #[error("{line}:{column}: expected {expected}, found '{found}'")]
    UnexpectedToken {
        line: usize,
        column: usize,
        expected: &'static str,
        found: String,
    },
    #[error("{line}:{column}: unsupported operator '{op}'")]
    UnsupportedOperator { line: usize, column: usize, op: String },
    #[error("{line}:{column}: malformed number '{lexeme}'")]
    MalformedNumber {
        line: usize,
        column: usize,
        lexeme: String,
    },
    #[error("{line}:{column}: reserved keyword '{keyword}' is not a statement")]
    ReservedKeyword {
        line: usize,
        column: usize,
        keyword: String,
    },

    // Static resource limits
    #[error("bytecode exceeds the {limit}-byte limit")]
    BytecodeOverflow { limit: usize },
    #[error("operand of {len} bytes exceeds the 255-byte encodable length")]
    OperandTooLong { len: usize },
    #[error("nesting exceeds the depth limit of {limit}")]
    NestingTooDeep { limit: usize },

    // Runtime type errors
    #[error("cannot add {left} and {right}")]
    UnsupportedAdd {
        left: &'static str,
        right: &'static str,
    },
    #[error("{op} expects an object, found {found}")]
    NotAnObject { op: &'static str, found: &'static str },

    // Runtime name errors
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    // Runtime resource errors
    #[error("stack overflow")]
    StackOverflow,
    #[error("stack underflow")]
    StackUnderflow,
    #[error("call stack overflow")]
    CallStackOverflow,
    #[error("return with empty call stack")]
    CallStackUnderflow,
    #[error("too many bindings in one scope (limit {limit})")]
    TooManyBindings { limit: usize },
    #[error("too many properties on one object (limit {limit})")]
    TooManyProperties { limit: usize },
    #[error("cannot pop the global scope")]
    ScopeUnderflow,
    #[error("invalid opcode: 0x{0:02X}")]
    InvalidOpcode(u8),
    #[error("truncated instruction at offset {offset}")]
    TruncatedInstruction { offset: usize },
    #[error("invalid call target: {0}")]
    InvalidCallTarget(i32),

    // IO boundary
    #[error("io error: {0}")]
    Io(String),
}

impl SvmError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SvmError::UnexpectedToken { .. }
            | SvmError::UnsupportedOperator { .. }
            | SvmError::MalformedNumber { .. }
            | SvmError::ReservedKeyword { .. } => ErrorCategory::Syntax,

            SvmError::BytecodeOverflow { .. }
            | SvmError::OperandTooLong { .. }
            | SvmError::NestingTooDeep { .. } => ErrorCategory::Limit,

            SvmError::UnsupportedAdd { .. } | SvmError::NotAnObject { .. } => ErrorCategory::Type,

            SvmError::UndefinedVariable(_) => ErrorCategory::Name,

            SvmError::StackOverflow
            | SvmError::StackUnderflow
            | SvmError::CallStackOverflow
            | SvmError::CallStackUnderflow
            | SvmError::TooManyBindings { .. }
            | SvmError::TooManyProperties { .. }
            | SvmError::ScopeUnderflow
            | SvmError::InvalidOpcode(_)
            | SvmError::TruncatedInstruction { .. }
            | SvmError::InvalidCallTarget(_) => ErrorCategory::Resource,

            SvmError::Io(_) => ErrorCategory::Io,
        }
    }
}

impl From<io::Error> for SvmError {
    fn from(err: io::Error) -> Self {
        SvmError::Io(err.to_string())
    }
}

pub type SvmResult<T> = Result<T, SvmError>;
