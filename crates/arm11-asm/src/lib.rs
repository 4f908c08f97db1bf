//! Two-pass assembler for the arm11-rs instruction subset.
//!
//! Pass 1 binds labels to instruction indices; pass 2 encodes each
//! statement and appends the literal pool after the last instruction.

pub mod encode;
pub mod error;
pub mod lexer;
pub mod pass1;
pub mod pass2;
pub mod symbols;
pub mod token;

pub use error::{AsmError, AsmErrorKind};
pub use pass1::{first_pass, FirstPass};
pub use pass2::{second_pass, SecondPass};
pub use symbols::{Symbol, SymbolTable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    /// Instructions then literal pool, one word per 4 bytes of output.
    pub words: Vec<u32>,
    /// Number of leading words that are instructions.
    pub instructions: usize,
    pub symbols: SymbolTable,
}

impl Assembly {
    /// Little-endian byte image, as loaded by `emulate`.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    pub fn literals(&self) -> &[u32] {
        &self.words[self.instructions..]
    }
}

/// Assembles `source`. Errors from both passes are reported together,
/// ordered by line; no partial image is returned when any exist.
pub fn assemble(source: &str) -> Result<Assembly, Vec<AsmError>> {
    let first = first_pass(source.lines());
    let second = second_pass(source.lines(), &first);

    let mut errors = first.errors;
    errors.extend(second.errors);
    if !errors.is_empty() {
        errors.sort_by_key(|e| e.line);
        return Err(errors);
    }
    Ok(Assembly {
        words: second.words,
        instructions: first.instructions as usize,
        symbols: first.symbols,
    })
}
