pub mod instruction;
pub mod opcode;
pub mod writer;

pub use instruction::Instruction;
pub use opcode::OpCode;
pub use writer::BytecodeWriter;

/// Longest name or string a length-prefixed operand can encode
pub const MAX_OPERAND_LEN: usize = 255;
