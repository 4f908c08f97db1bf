use tracing::{debug, trace};

use crate::encode::{encode_statement, Context, Operands};
use crate::error::{AsmError, AsmErrorKind};
use crate::lexer::tokenize_line;
use crate::pass1::FirstPass;
use crate::token::{classify, Token};

#[derive(Debug, Clone, Default)]
pub struct SecondPass {
    /// Instruction words followed by the literal pool.
    pub words: Vec<u32>,
    pub literals: usize,
    pub errors: Vec<AsmError>,
}

/// Encodes every statement against the finished symbol table. A line that
/// fails still occupies its word (as 0) so later indices match pass 1.
/// Every stray token before the mnemonic is reported; an encoding failure
/// ends the line.
pub fn second_pass<'a>(lines: impl IntoIterator<Item = &'a str>, first: &FirstPass) -> SecondPass {
    let mut ctx = Context::new(&first.symbols, first.instructions, first.literal_slots);
    let mut words: Vec<u32> = Vec::with_capacity(first.instructions as usize);
    let mut errors = Vec::new();

    for (i, line) in lines.into_iter().enumerate() {
        let ln = i + 1;
        let tokens = tokenize_line(line);
        let mut failures: Vec<AsmErrorKind> = Vec::new();

        for (pos, tok) in tokens.iter().enumerate() {
            match classify(tok) {
                Token::Label(_) => {}
                Token::Instruction(desc, cond) => {
                    ctx.index = words.len() as u32;
                    // labels after the statement were bound in pass 1
                    let operands: Vec<&str> = tokens[pos + 1..]
                        .iter()
                        .copied()
                        .filter(|t| !matches!(classify(t), Token::Label(_)))
                        .collect();
                    let mut ops = Operands::new(&operands);
                    let encoded = encode_statement(tok, desc, cond, &mut ops, &mut ctx)
                        .and_then(|word| match ops.rest().first() {
                            Some(extra) => {
                                Err(AsmErrorKind::UndefinedInstruction(extra.to_string()))
                            }
                            None => Ok(word),
                        });
                    match encoded {
                        Ok(word) => {
                            trace!("line {ln}: [{}] {word:#010x}", ctx.index);
                            words.push(word);
                        }
                        Err(kind) => {
                            words.push(0);
                            failures.push(kind);
                        }
                    }
                    break;
                }
                _ => failures.push(AsmErrorKind::UndefinedInstruction(tok.to_string())),
            }
        }

        errors.extend(failures.into_iter().map(|kind| AsmError::new(ln, kind)));
    }

    let literals = ctx.pool.len();
    words.extend_from_slice(&ctx.pool);
    debug!(words = words.len(), literals, errors = errors.len(), "second pass done");
    SecondPass {
        words,
        literals,
        errors,
    }
}
