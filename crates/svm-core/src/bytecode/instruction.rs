//! Bytecode Instruction Representation
//!
//! Decodes the raw byte stream into one owned instruction at a time.
//! Multi-byte operands are little-endian; names and strings carry a one-byte
//! length prefix. This layer contains no execution semantics.

use std::fmt;

use super::opcode::OpCode;
use crate::error::{SvmError, SvmResult};

/// One decoded instruction with its operands
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    PushNum(f64),
    PushStr(Vec<u8>),
    PushBool(bool),
    PushUndefined,
    PushNull,
    PushVar(Vec<u8>),
    StoreVar(Vec<u8>),
    Add,
    Call(i32),
    Ret,
    Print,
    Exit,
    NewObject,
    SetProp(Vec<u8>),
    GetProp(Vec<u8>),
    PushEnv,
    PopEnv,
}

impl Instruction {
    /// Decode the instruction starting at `offset`.
    ///
    /// Returns the instruction and the offset of the one that follows it.
    pub fn decode(bytes: &[u8], offset: usize) -> SvmResult<(Instruction, usize)> {
        let mut cursor = Cursor { bytes, pos: offset, start: offset };

        let byte = cursor.read_u8()?;
        let opcode = OpCode::from_u8(byte).ok_or(SvmError::InvalidOpcode(byte))?;

        let instruction = match opcode {
            OpCode::PushNum => Instruction::PushNum(cursor.read_f64()?),
            OpCode::PushStr => Instruction::PushStr(cursor.read_prefixed()?),
            OpCode::PushBool => Instruction::PushBool(cursor.read_u8()? != 0),
            OpCode::PushUndefined => Instruction::PushUndefined,
            OpCode::PushNull => Instruction::PushNull,
            OpCode::PushVar => Instruction::PushVar(cursor.read_prefixed()?),
            OpCode::StoreVar => Instruction::StoreVar(cursor.read_prefixed()?),
            OpCode::Add => Instruction::Add,
            OpCode::Call => Instruction::Call(cursor.read_i32()?),
            OpCode::Ret => Instruction::Ret,
            OpCode::Print => Instruction::Print,
            OpCode::Exit => Instruction::Exit,
            OpCode::NewObject => Instruction::NewObject,
            OpCode::SetProp => Instruction::SetProp(cursor.read_prefixed()?),
            OpCode::GetProp => Instruction::GetProp(cursor.read_prefixed()?),
            OpCode::PushEnv => Instruction::PushEnv,
            OpCode::PopEnv => Instruction::PopEnv,
        };

        Ok((instruction, cursor.pos))
    }

    pub fn opcode(&self) -> OpCode {
        match self {
            Instruction::PushNum(_) => OpCode::PushNum,
            Instruction::PushStr(_) => OpCode::PushStr,
            Instruction::PushBool(_) => OpCode::PushBool,
            Instruction::PushUndefined => OpCode::PushUndefined,
            Instruction::PushNull => OpCode::PushNull,
            Instruction::PushVar(_) => OpCode::PushVar,
            Instruction::StoreVar(_) => OpCode::StoreVar,
            Instruction::Add => OpCode::Add,
            Instruction::Call(_) => OpCode::Call,
            Instruction::Ret => OpCode::Ret,
            Instruction::Print => OpCode::Print,
            Instruction::Exit => OpCode::Exit,
            Instruction::NewObject => OpCode::NewObject,
            Instruction::SetProp(_) => OpCode::SetProp,
            Instruction::GetProp(_) => OpCode::GetProp,
            Instruction::PushEnv => OpCode::PushEnv,
            Instruction::PopEnv => OpCode::PopEnv,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mnemonic = self.opcode().mnemonic();
        match self {
            Instruction::PushNum(n) => write!(f, "{} {}", mnemonic, n),
            Instruction::PushStr(s) => {
                write!(f, "{} {:?}", mnemonic, String::from_utf8_lossy(s))
            }
            Instruction::PushBool(b) => write!(f, "{} {}", mnemonic, b),
            Instruction::PushVar(name)
            | Instruction::StoreVar(name)
            | Instruction::SetProp(name)
            | Instruction::GetProp(name) => {
                write!(f, "{} {}", mnemonic, String::from_utf8_lossy(name))
            }
            Instruction::Call(target) => write!(f, "{} {}", mnemonic, target),
            _ => write!(f, "{}", mnemonic),
        }
    }
}

/// Bounds-checked reader over one instruction's bytes
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    start: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize) -> SvmResult<&'a [u8]> {
        let bytes = self.bytes;
        match self.pos.checked_add(len).filter(|&end| end <= bytes.len()) {
            Some(end) => {
                let slice = &bytes[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            None => Err(SvmError::TruncatedInstruction { offset: self.start }),
        }
    }

    fn read_u8(&mut self) -> SvmResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_i32(&mut self) -> SvmResult<i32> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.take(4)?);
        Ok(i32::from_le_bytes(raw))
    }

    fn read_f64(&mut self) -> SvmResult<f64> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.take(8)?);
        Ok(f64::from_le_bytes(raw))
    }

    fn read_prefixed(&mut self) -> SvmResult<Vec<u8>> {
        let len = self.read_u8()? as usize;
        Ok(self.take(len)?.to_vec())
    }
}
