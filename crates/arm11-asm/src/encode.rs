use arm11_rs::condition::Condition;
use arm11_rs::cpu::PC;
use arm11_rs::decoder::{
    AluForm, Decoded, Instruction, Offset, Opcode, Operand2, ShiftAmount, ShiftedReg,
};
use arm11_rs::instructions::{InstrDesc, Kind};
use arm11_rs::isa::arm::encode;
use arm11_rs::shifter::{encode_imm, ShiftType};

use crate::error::AsmErrorKind;
use crate::symbols::SymbolTable;
use crate::token::{classify, Token};

type EncodeResult<T> = Result<T, AsmErrorKind>;

/// Branch and literal offsets are relative to PC, which runs two
/// instructions ahead of the one being executed.
pub const PC_OFFSET: i64 = 2;

/// Largest immediate `ldr` rewrites into a `mov` instead of pooling.
pub const MOV_LITERAL_MAX: u32 = 0xFF;

/// Cursor over the operand tokens that follow a mnemonic.
pub struct Operands<'t, 'a> {
    toks: &'t [&'a str],
    pos: usize,
}

impl<'t, 'a> Operands<'t, 'a> {
    pub fn new(toks: &'t [&'a str]) -> Self {
        Self { toks, pos: 0 }
    }

    pub fn peek(&self) -> Option<&'a str> {
        self.toks.get(self.pos).copied()
    }

    pub fn next(&mut self) -> Option<&'a str> {
        let t = self.peek()?;
        self.pos += 1;
        Some(t)
    }

    /// Tokens not consumed by the encoder.
    pub fn rest(&self) -> &'t [&'a str] {
        &self.toks[self.pos.min(self.toks.len())..]
    }
}

/// Per-statement state shared with pass 2.
pub struct Context<'s> {
    pub symbols: &'s SymbolTable,
    /// Total real instructions; literal `k` lives at index `instructions + k`.
    pub instructions: u32,
    /// Index of the instruction being encoded.
    pub index: u32,
    pub pool: Vec<u32>,
}

impl<'s> Context<'s> {
    pub fn new(symbols: &'s SymbolTable, instructions: u32, literal_slots: u32) -> Self {
        Self {
            symbols,
            instructions,
            index: 0,
            pool: Vec::with_capacity(literal_slots as usize),
        }
    }
}

pub fn encode_statement(
    mnemonic: &str,
    desc: InstrDesc,
    cond: Condition,
    ops: &mut Operands,
    ctx: &mut Context,
) -> EncodeResult<u32> {
    let instr = match desc.kind {
        Kind::Alu(opcode) => data_processing(opcode, mnemonic, ops)?,
        Kind::Multiply { accumulate } => multiply(accumulate, mnemonic, ops)?,
        Kind::Transfer { load } => transfer(load, mnemonic, ops, ctx)?,
        Kind::Branch => branch(mnemonic, ops, ctx)?,
        Kind::Shift(kind) => shift_pseudo(kind, mnemonic, ops)?,
    };
    Ok(encode(&Decoded { cond, instr }))
}

fn missing(mnemonic: &str) -> AsmErrorKind {
    AsmErrorKind::MissingExpression(mnemonic.to_string())
}

fn register(ops: &mut Operands, mnemonic: &str) -> EncodeResult<u8> {
    let tok = ops.next().ok_or_else(|| missing(mnemonic))?;
    as_register(tok)
}

fn as_register(tok: &str) -> EncodeResult<u8> {
    match classify(tok) {
        // r16 names the flags slot, which no 4-bit field can address
        Token::Register(n) if n < 16 => Ok(n),
        _ => Err(AsmErrorKind::InvalidRegister(tok.to_string())),
    }
}

/// Rotated 8-bit immediate for a data-processing operand.
pub fn rotated_imm(value: u32, tok: &str) -> EncodeResult<Operand2> {
    let (rotate, imm8) =
        encode_imm(value).ok_or_else(|| AsmErrorKind::InvalidExpression(tok.to_string()))?;
    Ok(Operand2::Imm { rotate, imm8 })
}

fn shift_amount(ops: &mut Operands, shift_name: &str) -> EncodeResult<ShiftAmount> {
    let tok = ops.next().ok_or_else(|| missing(shift_name))?;
    match classify(tok) {
        Token::ImmediateHash(v) if (0..32).contains(&v) => Ok(ShiftAmount::Imm(v as u8)),
        Token::Register(_) => Ok(ShiftAmount::Reg(as_register(tok)?)),
        _ => Err(AsmErrorKind::InvalidExpression(tok.to_string())),
    }
}

/// `Rm` optionally followed by `<shift> #n` or `<shift> Rs`.
fn shifted_register(rm: u8, ops: &mut Operands) -> EncodeResult<ShiftedReg> {
    let Some(kind) = ops.peek().and_then(ShiftType::from_name) else {
        return Ok(ShiftedReg::plain(rm));
    };
    let name = kind.name();
    ops.next();
    Ok(ShiftedReg {
        rm,
        kind,
        amount: shift_amount(ops, name)?,
    })
}

fn operand2(ops: &mut Operands, mnemonic: &str) -> EncodeResult<Operand2> {
    let tok = ops.next().ok_or_else(|| missing(mnemonic))?;
    match classify(tok) {
        Token::ImmediateHash(v) => rotated_imm(v as u32, tok),
        Token::Register(_) => Ok(Operand2::Reg(shifted_register(as_register(tok)?, ops)?)),
        _ => Err(AsmErrorKind::InvalidExpression(tok.to_string())),
    }
}

pub fn data_processing(
    opcode: Opcode,
    mnemonic: &str,
    ops: &mut Operands,
) -> EncodeResult<Instruction> {
    let (rd, rn) = match opcode.form() {
        AluForm::Compute => {
            let rd = register(ops, mnemonic)?;
            (rd, register(ops, mnemonic)?)
        }
        AluForm::Move => (register(ops, mnemonic)?, 0),
        AluForm::Compare => (0, register(ops, mnemonic)?),
    };
    Ok(Instruction::DataProcessing {
        opcode,
        set_flags: opcode.form() == AluForm::Compare,
        rn,
        rd,
        operand2: operand2(ops, mnemonic)?,
    })
}

pub fn multiply(accumulate: bool, mnemonic: &str, ops: &mut Operands) -> EncodeResult<Instruction> {
    let rd = register(ops, mnemonic)?;
    let rm = register(ops, mnemonic)?;
    let rs = register(ops, mnemonic)?;
    let rn = if accumulate {
        register(ops, mnemonic)?
    } else {
        0
    };
    Ok(Instruction::Multiply {
        accumulate,
        set_flags: false,
        rd,
        rn,
        rs,
        rm,
    })
}

/// `lsl Rn, <#expr|Rs>` is `mov Rn, Rn, lsl <#expr|Rs>`.
pub fn shift_pseudo(kind: ShiftType, mnemonic: &str, ops: &mut Operands) -> EncodeResult<Instruction> {
    let rn = register(ops, mnemonic)?;
    let amount = shift_amount(ops, mnemonic)?;
    Ok(Instruction::DataProcessing {
        opcode: Opcode::Mov,
        set_flags: false,
        rn: 0,
        rd: rn,
        operand2: Operand2::Reg(ShiftedReg { rm: rn, kind, amount }),
    })
}

/// Transfer offset: `#[-]imm12`, `[-]Rm` or `[-]Rm, <shift> ...`.
/// Returns the U bit alongside the offset.
fn offset(ops: &mut Operands, mnemonic: &str) -> EncodeResult<(bool, Offset)> {
    let tok = ops.next().ok_or_else(|| missing(mnemonic))?;
    if let Token::ImmediateHash(v) = classify(tok) {
        let magnitude = v.unsigned_abs();
        if magnitude > 0xFFF {
            return Err(AsmErrorKind::InvalidExpression(tok.to_string()));
        }
        return Ok((v >= 0, Offset::Imm(magnitude as u16)));
    }
    let (up, reg_tok) = match tok.strip_prefix('-') {
        Some(r) => (false, r),
        None => (true, tok.strip_prefix('+').unwrap_or(tok)),
    };
    match classify(reg_tok) {
        Token::Register(_) => {
            let rm = as_register(reg_tok)?;
            Ok((up, Offset::Reg(shifted_register(rm, ops)?)))
        }
        _ => Err(AsmErrorKind::InvalidExpression(tok.to_string())),
    }
}

/// Bracketed address: `[Rn]`, `[Rn, off]` (pre-indexed) or `[Rn], off`
/// (post-indexed). A trailing `!` is accepted and ignored.
fn address(load: bool, rd: u8, mnemonic: &str, ops: &mut Operands) -> EncodeResult<Instruction> {
    let first = ops.peek().unwrap_or_default();
    let mut inner: Vec<&str> = Vec::new();
    let mut closed = false;
    while let Some(tok) = ops.next() {
        let t = tok.strip_prefix('[').unwrap_or(tok);
        let t = t.strip_suffix('!').unwrap_or(t);
        let (t, end) = match t.strip_suffix(']') {
            Some(t) => (t, true),
            None => (t, false),
        };
        if !t.is_empty() {
            inner.push(t);
        }
        if end {
            closed = true;
            break;
        }
    }
    if !closed {
        return Err(AsmErrorKind::InvalidExpression(first.to_string()));
    }

    let mut inside = Operands::new(&inner);
    let rn = register(&mut inside, mnemonic)?;
    let (pre_index, (up, offset)) = if inside.peek().is_some() {
        (true, offset(&mut inside, mnemonic)?)
    } else if ops.peek().is_some() {
        (false, offset(ops, mnemonic)?)
    } else {
        (true, (true, Offset::Imm(0)))
    };
    if let Some(extra) = inside.peek() {
        return Err(AsmErrorKind::InvalidExpression(extra.to_string()));
    }
    Ok(Instruction::Transfer {
        load,
        pre_index,
        up,
        rn,
        rd,
        offset,
    })
}

pub fn transfer(
    load: bool,
    mnemonic: &str,
    ops: &mut Operands,
    ctx: &mut Context,
) -> EncodeResult<Instruction> {
    let rd = register(ops, mnemonic)?;
    let tok = ops.peek().ok_or_else(|| missing(mnemonic))?;
    if tok.starts_with('[') {
        return address(load, rd, mnemonic, ops);
    }
    ops.next();
    let value = match classify(tok) {
        Token::ImmediateEquals(v) if load => v as u32,
        _ => return Err(AsmErrorKind::InvalidExpression(tok.to_string())),
    };

    if value <= MOV_LITERAL_MAX {
        return Ok(Instruction::DataProcessing {
            opcode: Opcode::Mov,
            set_flags: false,
            rn: 0,
            rd,
            operand2: Operand2::Imm {
                rotate: 0,
                imm8: value as u8,
            },
        });
    }

    let slot = ctx.instructions + ctx.pool.len() as u32;
    let delta = (slot as i64 - ctx.index as i64 - PC_OFFSET) * 4;
    let magnitude = delta.unsigned_abs();
    if magnitude > 0xFFF {
        return Err(AsmErrorKind::InvalidExpression(tok.to_string()));
    }
    ctx.pool.push(value);
    Ok(Instruction::Transfer {
        load: true,
        pre_index: true,
        up: delta >= 0,
        rn: PC as u8,
        rd,
        offset: Offset::Imm(magnitude as u16),
    })
}

pub fn branch(mnemonic: &str, ops: &mut Operands, ctx: &Context) -> EncodeResult<Instruction> {
    let tok = ops.next().ok_or_else(|| missing(mnemonic))?;
    if let Token::Instruction(..) = classify(tok) {
        return Err(missing(mnemonic));
    }
    let target = ctx
        .symbols
        .get(tok)
        .ok_or_else(|| AsmErrorKind::UndefinedLabel(tok.to_string()))?;
    let offset = target as i64 - ctx.index as i64 - PC_OFFSET;
    Ok(Instruction::Branch {
        offset: offset as i32,
    })
}
