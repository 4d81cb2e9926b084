//! SVM Configuration
//!
//! Defines the fixed capacities of the compiler and the virtual machine.
//! Configuration specifies constraints only; enforcement is handled by the
//! component that owns each resource. Exceeding a limit is always an error,
//! never a resize.

/// Compiler and VM limits
#[derive(Debug, Clone)]
pub struct SvmConfig {
    /// Maximum operand stack depth
    pub max_stack_size: usize,

    /// Maximum number of saved return addresses
    pub max_call_depth: usize,

    /// Maximum number of bindings in a single scope
    pub max_bindings: usize,

    /// Maximum number of properties on a single object
    pub max_properties: usize,

    /// Maximum size of the compiler's output buffer
    pub max_bytecode_len: usize,

    /// Maximum nesting of blocks, parentheses and object literals in source
    pub max_nesting_depth: usize,
}

impl Default for SvmConfig {
    fn default() -> Self {
        SvmConfig {
            max_stack_size: 64,
            max_call_depth: 16,
            max_bindings: 32,
            max_properties: 64,
            max_bytecode_len: 512,
            max_nesting_depth: 64,
        }
    }
}

impl SvmConfig {
    /// Create a new configuration with default limits
    pub fn new() -> Self {
        Self::default()
    }
}
