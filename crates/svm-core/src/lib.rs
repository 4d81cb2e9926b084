//! Stack VM - Core Library
//!
//! Compiles a small dynamically-typed scripting language into a compact
//! bytecode and executes it on a stack machine with lexical scopes,
//! reference-counted heap objects and fixed resource limits.
//!
//! The two entry points are [`compile`] and [`execute`]; the bytecode blob
//! passed between them has no header and is self-contained.

pub mod error;
pub mod config;
pub mod bytecode;
pub mod compiler;
pub mod vm;
pub mod loader;

use std::io::{self, Write};

// Re-export commonly used types
pub use error::{ErrorCategory, SvmError, SvmResult};
pub use config::SvmConfig;
pub use bytecode::{BytecodeWriter, Instruction, OpCode};
pub use vm::{Value, VirtualMachine};
pub use loader::{disassemble, BytecodeLoader};

/// Compile source text with the default limits
pub fn compile(source: &str) -> SvmResult<Vec<u8>> {
	compiler::compile(source, &SvmConfig::default())
}

/// Compile source text with explicit limits
pub fn compile_with(source: &str, config: &SvmConfig) -> SvmResult<Vec<u8>> {
	compiler::compile(source, config)
}

/// Execute bytecode with the default limits, printing to stdout
pub fn execute(bytecode: &[u8]) -> SvmResult<()> {
	let stdout = io::stdout();
	let mut out = stdout.lock();
	execute_with(bytecode, &SvmConfig::default(), &mut out)
}

/// Execute bytecode with explicit limits, printing to `out`
pub fn execute_with<W: Write>(bytecode: &[u8], config: &SvmConfig, out: &mut W) -> SvmResult<()> {
	let mut vm = VirtualMachine::new(config.clone(), bytecode.to_vec());
	vm.execute(out)
}
