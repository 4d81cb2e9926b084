//! Bytecode Writer
//!
//! Bounded output buffer for emitting instructions. The code generator
//! writes through it, and hosts can use it to author bytecode by hand
//! (the only way to reach CALL/RET).

use super::opcode::OpCode;
use super::MAX_OPERAND_LEN;
use crate::error::{SvmError, SvmResult};

#[derive(Debug)]
pub struct BytecodeWriter {
    bytes: Vec<u8>,
    limit: usize,
}

impl BytecodeWriter {
    /// Create a writer that refuses to grow beyond `limit` bytes
    pub fn new(limit: usize) -> Self {
        BytecodeWriter {
            bytes: Vec::new(),
            limit,
        }
    }

    /// Offset the next emitted byte will land at
    pub fn offset(&self) -> usize {
        self.bytes.len()
    }

    pub fn emit_op(&mut self, op: OpCode) -> SvmResult<()> {
        self.emit_u8(op as u8)
    }

    pub fn emit_u8(&mut self, byte: u8) -> SvmResult<()> {
        self.emit_raw(&[byte])
    }

    pub fn emit_f64(&mut self, value: f64) -> SvmResult<()> {
        self.emit_raw(&value.to_le_bytes())
    }

    pub fn emit_i32(&mut self, value: i32) -> SvmResult<()> {
        self.emit_raw(&value.to_le_bytes())
    }

    /// Emit a one-byte length prefix followed by the raw bytes
    pub fn emit_name(&mut self, name: &[u8]) -> SvmResult<()> {
        if name.len() > MAX_OPERAND_LEN {
            return Err(SvmError::OperandTooLong { len: name.len() });
        }
        self.ensure_room(1 + name.len())?;
        self.bytes.push(name.len() as u8);
        self.bytes.extend_from_slice(name);
        Ok(())
    }

    /// Consume the writer and return the emitted bytes
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }

    fn emit_raw(&mut self, raw: &[u8]) -> SvmResult<()> {
        self.ensure_room(raw.len())?;
        self.bytes.extend_from_slice(raw);
        Ok(())
    }

    fn ensure_room(&self, len: usize) -> SvmResult<()> {
        if self.bytes.len() + len > self.limit {
            return Err(SvmError::BytecodeOverflow { limit: self.limit });
        }
        Ok(())
    }
}
