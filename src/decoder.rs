use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::shifter::ShiftType;

/// The all-zero word (`andeq r0, r0, r0`) stops the emulator when it
/// reaches the decode stage.
pub const HALT: u32 = 0;

/// Data-processing opcodes (bits 24..21). Opcodes outside this subset do not decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opcode {
    And = 0x0,
    Eor = 0x1,
    Sub = 0x2,
    Rsb = 0x3,
    Add = 0x4,
    Tst = 0x8,
    Teq = 0x9,
    Cmp = 0xA,
    Orr = 0xC,
    Mov = 0xD,
}

/// Operand shape of a data-processing mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluForm {
    /// `op Rd, Rn, <Operand2>`
    Compute,
    /// `op Rd, <Operand2>`
    Move,
    /// `op Rn, <Operand2>`, S forced to 1
    Compare,
}

impl Opcode {
    pub fn from_bits(bits: u32) -> Option<Self> {
        Some(match bits & 0xF {
            0x0 => Self::And,
            0x1 => Self::Eor,
            0x2 => Self::Sub,
            0x3 => Self::Rsb,
            0x4 => Self::Add,
            0x8 => Self::Tst,
            0x9 => Self::Teq,
            0xA => Self::Cmp,
            0xC => Self::Orr,
            0xD => Self::Mov,
            _ => return None,
        })
    }

    pub fn bits(self) -> u32 {
        self as u32
    }

    pub fn form(self) -> AluForm {
        match self {
            Self::Mov => AluForm::Move,
            Self::Tst | Self::Teq | Self::Cmp => AluForm::Compare,
            _ => AluForm::Compute,
        }
    }

    pub fn writes_result(self) -> bool {
        self.form() != AluForm::Compare
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Eor => "eor",
            Self::Sub => "sub",
            Self::Rsb => "rsb",
            Self::Add => "add",
            Self::Tst => "tst",
            Self::Teq => "teq",
            Self::Cmp => "cmp",
            Self::Orr => "orr",
            Self::Mov => "mov",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftAmount {
    /// 5-bit constant
    Imm(u8),
    /// low byte of the named register
    Reg(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftedReg {
    pub rm: u8,
    pub kind: ShiftType,
    pub amount: ShiftAmount,
}

impl ShiftedReg {
    /// Plain register, no shift.
    pub fn plain(rm: u8) -> Self {
        Self {
            rm,
            kind: ShiftType::Lsl,
            amount: ShiftAmount::Imm(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand2 {
    /// `imm8` rotated right by `2 * rotate` (I = 1)
    Imm { rotate: u8, imm8: u8 },
    Reg(ShiftedReg),
}

/// Single-data-transfer offset. Note the I bit is inverted relative to
/// data processing: I = 0 selects the 12-bit immediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Offset {
    Imm(u16),
    Reg(ShiftedReg),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    DataProcessing {
        opcode: Opcode,
        set_flags: bool,
        rn: u8,
        rd: u8,
        operand2: Operand2,
    },
    Multiply {
        accumulate: bool,
        set_flags: bool,
        rd: u8,
        rn: u8,
        rs: u8,
        rm: u8,
    },
    Transfer {
        load: bool,
        pre_index: bool,
        up: bool,
        rn: u8,
        rd: u8,
        offset: Offset,
    },
    /// Signed word offset relative to PC (which runs two words ahead).
    Branch { offset: i32 },
    Halt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoded {
    pub cond: Condition,
    pub instr: Instruction,
}

pub trait Decoder {
    fn decode(&self, raw: u32) -> Option<Decoded>;
}
