//! Bytecode Opcode Definitions
//!
//! Defines the raw opcode set shared by the compiler and the VM.
//! This file contains no execution semantics.
//! Opcode values are an eternal contract.

/// Bytecode opcodes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    // Literals
    PushNum       = 0x00,
    PushStr       = 0x01,
    PushBool      = 0x02,
    PushUndefined = 0x03,
    PushNull      = 0x04,

    // Variables
    PushVar  = 0x05,
    StoreVar = 0x06,

    // Arithmetic
    Add = 0x07,

    // Control flow
    Call = 0x08,
    Ret  = 0x09,

    // System
    Print = 0x0A,
    Exit  = 0x0B,

    // Objects
    NewObject = 0x0C,
    SetProp   = 0x0D,
    GetProp   = 0x0E,

    // Scopes
    PushEnv = 0x0F,
    PopEnv  = 0x10,
}

impl OpCode {
    /// Convert raw byte to opcode
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(OpCode::PushNum),
            0x01 => Some(OpCode::PushStr),
            0x02 => Some(OpCode::PushBool),
            0x03 => Some(OpCode::PushUndefined),
            0x04 => Some(OpCode::PushNull),

            0x05 => Some(OpCode::PushVar),
            0x06 => Some(OpCode::StoreVar),

            0x07 => Some(OpCode::Add),

            0x08 => Some(OpCode::Call),
            0x09 => Some(OpCode::Ret),

            0x0A => Some(OpCode::Print),
            0x0B => Some(OpCode::Exit),

            0x0C => Some(OpCode::NewObject),
            0x0D => Some(OpCode::SetProp),
            0x0E => Some(OpCode::GetProp),

            0x0F => Some(OpCode::PushEnv),
            0x10 => Some(OpCode::PopEnv),

            _ => None,
        }
    }

    /// Assembly mnemonic used by the disassembler
    pub fn mnemonic(self) -> &'static str {
        match self {
            OpCode::PushNum => "PUSH_NUM",
            OpCode::PushStr => "PUSH_STR",
            OpCode::PushBool => "PUSH_BOOL",
            OpCode::PushUndefined => "PUSH_UNDEFINED",
            OpCode::PushNull => "PUSH_NULL",
            OpCode::PushVar => "PUSH_VAR",
            OpCode::StoreVar => "STORE_VAR",
            OpCode::Add => "ADD",
            OpCode::Call => "CALL",
            OpCode::Ret => "RET",
            OpCode::Print => "PRINT",
            OpCode::Exit => "EXIT",
            OpCode::NewObject => "NEW_OBJECT",
            OpCode::SetProp => "SET_PROP",
            OpCode::GetProp => "GET_PROP",
            OpCode::PushEnv => "PUSH_ENV",
            OpCode::PopEnv => "POP_ENV",
        }
    }
}
