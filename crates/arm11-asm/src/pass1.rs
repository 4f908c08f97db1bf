use tracing::debug;

use arm11_rs::instructions::Kind;

use crate::error::{AsmError, AsmErrorKind};
use crate::lexer::tokenize_line;
use crate::symbols::SymbolTable;
use crate::token::{classify, Token};

#[derive(Debug, Clone, Default)]
pub struct FirstPass {
    pub symbols: SymbolTable,
    /// Number of real instructions; the literal pool starts at this index.
    pub instructions: u32,
    /// Upper bound on literal-pool entries (`ldr Rd, =expr` statements).
    pub literal_slots: u32,
    pub errors: Vec<AsmError>,
}

/// Queues `name` for the next instruction unless it is already bound or
/// queued.
fn stage(out: &mut FirstPass, pending: &mut Vec<String>, line: usize, name: &str) {
    if out.symbols.contains(name) || pending.iter().any(|p| p == name) {
        out.errors.push(AsmError::new(
            line,
            AsmErrorKind::DuplicateLabel(name.to_string()),
        ));
    } else {
        pending.push(name.to_string());
    }
}

/// Binds every label to the index of the next instruction. Labels still
/// pending at end of input bind to the end-of-program index.
pub fn first_pass<'a>(lines: impl IntoIterator<Item = &'a str>) -> FirstPass {
    let mut out = FirstPass::default();
    let mut pending: Vec<String> = Vec::new();

    for (i, line) in lines.into_iter().enumerate() {
        let ln = i + 1;
        let tokens = tokenize_line(line);
        for (pos, tok) in tokens.iter().enumerate() {
            match classify(tok) {
                Token::Label(name) => stage(&mut out, &mut pending, ln, name),
                Token::Instruction(desc, _) => {
                    let operands = &tokens[pos + 1..];
                    if desc.kind == (Kind::Transfer { load: true })
                        && operands
                            .iter()
                            .any(|t| matches!(classify(t), Token::ImmediateEquals(_)))
                    {
                        out.literal_slots += 1;
                    }
                    for name in pending.drain(..) {
                        out.symbols.insert(&name, out.instructions);
                    }
                    out.instructions += 1;
                    // the rest of the line is operands, apart from labels
                    // that name the following instruction
                    for t in operands {
                        if let Token::Label(name) = classify(t) {
                            stage(&mut out, &mut pending, ln, name);
                        }
                    }
                    break;
                }
                _ => {}
            }
        }
    }

    for name in pending.drain(..) {
        out.symbols.insert(&name, out.instructions);
    }
    debug!(
        instructions = out.instructions,
        labels = out.symbols.len(),
        literal_slots = out.literal_slots,
        "first pass done"
    );
    out
}
