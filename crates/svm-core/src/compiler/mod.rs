//! Source-to-bytecode compiler.

pub mod lexer;
pub mod parser;
pub mod token;

pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Keyword, Token, TokenKind};

use log::debug;

use crate::config::SvmConfig;
use crate::error::SvmResult;

/// Compile `source` into a raw bytecode blob ending in EXIT
pub fn compile(source: &str, config: &SvmConfig) -> SvmResult<Vec<u8>> {
    let bytecode = Parser::new(source, config).compile()?;
    debug!(
        "compiled {} source bytes into {} bytecode bytes",
        source.len(),
        bytecode.len()
    );
    Ok(bytecode)
}
