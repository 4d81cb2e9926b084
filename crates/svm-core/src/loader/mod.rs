pub mod loader;

pub use loader::{disassemble, BytecodeLoader, LoadedBytecode};
