use crate::condition::Condition;
use crate::decoder::Opcode;
use crate::shifter::ShiftType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Alu(Opcode),
    Multiply { accumulate: bool },
    Transfer { load: bool },
    Branch,
    /// `lsl Rn, <#expr|Rs>` and friends, assembled as a `mov`.
    Shift(ShiftType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrDesc {
    pub kind: Kind,
    pub mnemonic: &'static str,
}

pub const TABLE: &[InstrDesc] = &[
    InstrDesc { kind: Kind::Alu(Opcode::Add), mnemonic: "add" },
    InstrDesc { kind: Kind::Alu(Opcode::Sub), mnemonic: "sub" },
    InstrDesc { kind: Kind::Alu(Opcode::Rsb), mnemonic: "rsb" },
    InstrDesc { kind: Kind::Alu(Opcode::And), mnemonic: "and" },
    InstrDesc { kind: Kind::Alu(Opcode::Eor), mnemonic: "eor" },
    InstrDesc { kind: Kind::Alu(Opcode::Orr), mnemonic: "orr" },
    InstrDesc { kind: Kind::Alu(Opcode::Mov), mnemonic: "mov" },
    InstrDesc { kind: Kind::Alu(Opcode::Tst), mnemonic: "tst" },
    InstrDesc { kind: Kind::Alu(Opcode::Teq), mnemonic: "teq" },
    InstrDesc { kind: Kind::Alu(Opcode::Cmp), mnemonic: "cmp" },
    InstrDesc { kind: Kind::Multiply { accumulate: false }, mnemonic: "mul" },
    InstrDesc { kind: Kind::Multiply { accumulate: true }, mnemonic: "mla" },
    InstrDesc { kind: Kind::Transfer { load: true }, mnemonic: "ldr" },
    InstrDesc { kind: Kind::Transfer { load: false }, mnemonic: "str" },
    InstrDesc { kind: Kind::Branch, mnemonic: "b" },
    InstrDesc { kind: Kind::Shift(ShiftType::Lsl), mnemonic: "lsl" },
    InstrDesc { kind: Kind::Shift(ShiftType::Lsr), mnemonic: "lsr" },
    InstrDesc { kind: Kind::Shift(ShiftType::Asr), mnemonic: "asr" },
    InstrDesc { kind: Kind::Shift(ShiftType::Ror), mnemonic: "ror" },
];

fn find(mnemonic: &str) -> Option<InstrDesc> {
    TABLE.iter().find(|d| d.mnemonic == mnemonic).copied()
}

/// Resolves a mnemonic with an optional two-letter condition suffix
/// (`beq`, `movne`, `andeq`). An exact base match wins, so `teq` is never
/// read as `t` + `eq`.
pub fn lookup(token: &str) -> Option<(InstrDesc, Condition)> {
    if let Some(d) = find(token) {
        return Some((d, Condition::Al));
    }
    let split = token.len().checked_sub(2)?;
    let base = token.get(..split)?;
    let suffix = token.get(split..)?;
    Some((find(base)?, Condition::from_suffix(suffix)?))
}
