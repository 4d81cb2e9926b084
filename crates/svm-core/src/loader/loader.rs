//! Bytecode Loader
//!
//! Loads and validates a raw bytecode blob coming from outside the process.
//! The blob has no header, version or checksum; this layer performs
//! structural validation only and never executes anything.

use crate::bytecode::Instruction;
use crate::error::{SvmError, SvmResult};

/// Validated bytecode together with its decoded listing
#[derive(Debug)]
pub struct LoadedBytecode {
    pub instructions: Vec<u8>,
    pub listing: Vec<(usize, Instruction)>,
}

/// Bytecode loader
pub struct BytecodeLoader;

impl BytecodeLoader {
    /// Load bytecode from raw bytes
    pub fn load(bytes: &[u8]) -> SvmResult<LoadedBytecode> {
        let listing = disassemble(bytes)?;
        Ok(LoadedBytecode {
            instructions: bytes.to_vec(),
            listing,
        })
    }
}

/// Decode every instruction of `bytes`, in order, with its offset.
///
/// Every CALL target must land on an instruction boundary or exactly at the
/// end of the blob.
pub fn disassemble(bytes: &[u8]) -> SvmResult<Vec<(usize, Instruction)>> {
    let mut listing = Vec::new();
    let mut offset = 0;

    while offset < bytes.len() {
        let (instruction, next) = Instruction::decode(bytes, offset)?;
        listing.push((offset, instruction));
        offset = next;
    }

    for (_, instruction) in &listing {
        if let Instruction::Call(target) = instruction {
            let on_boundary = usize::try_from(*target)
                .map(|t| t == bytes.len() || listing.binary_search_by_key(&t, |(o, _)| *o).is_ok())
                .unwrap_or(false);
            if !on_boundary {
                return Err(SvmError::InvalidCallTarget(*target));
            }
        }
    }

    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{BytecodeWriter, OpCode};

    fn call_to(target: i32) -> Vec<u8> {
        let mut w = BytecodeWriter::new(64);
        w.emit_op(OpCode::Call).unwrap();
        w.emit_i32(target).unwrap();
        w.emit_op(OpCode::Exit).unwrap();
        w.emit_op(OpCode::PushNull).unwrap();
        w.emit_op(OpCode::Ret).unwrap();
        w.finish()
    }

    #[test]
    fn listing_tracks_offsets() {
        let loaded = BytecodeLoader::load(&call_to(6)).expect("valid bytecode");
        let offsets: Vec<usize> = loaded.listing.iter().map(|(o, _)| *o).collect();
        assert_eq!(offsets, vec![0, 5, 6, 7]);
        assert_eq!(loaded.listing[2].1, Instruction::PushNull);
    }

    #[test]
    fn rejects_call_into_operand_bytes() {
        let err = BytecodeLoader::load(&call_to(2)).unwrap_err();
        assert!(matches!(err, SvmError::InvalidCallTarget(2)));
    }

    #[test]
    fn rejects_negative_call_target() {
        let err = BytecodeLoader::load(&call_to(-1)).unwrap_err();
        assert!(matches!(err, SvmError::InvalidCallTarget(-1)));
    }

    #[test]
    fn rejects_truncated_blob() {
        let bytes = [OpCode::PushNum as u8, 0, 0];
        assert!(BytecodeLoader::load(&bytes).is_err());
    }
}
