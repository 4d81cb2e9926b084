//! VM Operand Stack
//!
//! Bounded expression-evaluation stack. Push and pop move values in and
//! out; neither changes a heap object's reference count.
//! No execution semantics.

use crate::error::{SvmError, SvmResult};
use super::value::Value;

/// VM operand stack
#[derive(Debug)]
pub struct Stack {
    values: Vec<Value>,
    max_size: usize,
}

impl Stack {
    /// Create new stack with maximum size
    pub fn new(max_size: usize) -> Self {
        Stack {
            values: Vec::with_capacity(max_size),
            max_size,
        }
    }

    /// Push value onto stack
    pub fn push(&mut self, value: Value) -> SvmResult<()> {
        if self.values.len() >= self.max_size {
            return Err(SvmError::StackOverflow);
        }
        self.values.push(value);
        Ok(())
    }

    /// Pop value from stack, transferring ownership to the caller
    pub fn pop(&mut self) -> SvmResult<Value> {
        self.values.pop().ok_or(SvmError::StackUnderflow)
    }

    /// Peek at top of stack without removing
    pub fn peek(&self) -> SvmResult<&Value> {
        self.values.last().ok_or(SvmError::StackUnderflow)
    }

    /// Get current stack size
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Check if stack is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
