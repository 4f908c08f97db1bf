use crate::condition::Condition;
use crate::decoder::{
    Decoded, Decoder, Instruction, Offset, Opcode, Operand2, ShiftAmount, ShiftedReg, HALT,
};
use crate::shifter::ShiftType;

/// Instruction class, derived from fixed bit positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    DataProcessing,
    Multiply,
    Transfer,
    Branch,
}

impl Class {
    /// Bits 27..26 pick the class. Inside class 00, bits 7..4 = 1001 with
    /// bits 25..22 clear marks a multiply.
    pub fn of(raw: u32) -> Option<Self> {
        match field(raw, 26, 2) {
            0b00 => {
                if field(raw, 4, 4) == 0b1001 && field(raw, 22, 4) == 0 {
                    Some(Self::Multiply)
                } else {
                    Some(Self::DataProcessing)
                }
            }
            0b01 => Some(Self::Transfer),
            0b10 if bit(raw, 25) => Some(Self::Branch),
            _ => None,
        }
    }
}

#[inline]
fn field(raw: u32, lo: u32, width: u32) -> u32 {
    (raw >> lo) & ((1 << width) - 1)
}

#[inline]
fn bit(raw: u32, pos: u32) -> bool {
    (raw >> pos) & 1 == 1
}

#[inline]
fn sign_ext(v: u32, bits: u32) -> i32 {
    let s = 32 - bits;
    ((v << s) as i32) >> s
}

fn unpack_shifted_reg(raw: u32) -> ShiftedReg {
    let amount = if bit(raw, 4) {
        ShiftAmount::Reg(field(raw, 8, 4) as u8)
    } else {
        ShiftAmount::Imm(field(raw, 7, 5) as u8)
    };
    ShiftedReg {
        rm: field(raw, 0, 4) as u8,
        kind: ShiftType::from_bits(field(raw, 5, 2)),
        amount,
    }
}

fn pack_shifted_reg(s: &ShiftedReg) -> u32 {
    let rm = s.rm as u32 & 0xF;
    let kind = s.kind.bits() << 5;
    match s.amount {
        ShiftAmount::Imm(n) => ((n as u32 & 0x1F) << 7) | kind | rm,
        ShiftAmount::Reg(rs) => ((rs as u32 & 0xF) << 8) | kind | (1 << 4) | rm,
    }
}

#[inline]
fn reg(raw: u32, lo: u32) -> u8 {
    field(raw, lo, 4) as u8
}

/// Decoder for the supported ARM subset.
pub struct ArmDecoder;

impl ArmDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ArmDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ArmDecoder {
    fn decode(&self, raw: u32) -> Option<Decoded> {
        if raw == HALT {
            return Some(Decoded {
                cond: Condition::Eq,
                instr: Instruction::Halt,
            });
        }
        let cond = Condition::from_bits(raw >> 28);
        let instr = match Class::of(raw)? {
            Class::DataProcessing => {
                let operand2 = if bit(raw, 25) {
                    Operand2::Imm {
                        rotate: field(raw, 8, 4) as u8,
                        imm8: field(raw, 0, 8) as u8,
                    }
                } else {
                    Operand2::Reg(unpack_shifted_reg(raw))
                };
                Instruction::DataProcessing {
                    opcode: Opcode::from_bits(field(raw, 21, 4))?,
                    set_flags: bit(raw, 20),
                    rn: reg(raw, 16),
                    rd: reg(raw, 12),
                    operand2,
                }
            }
            Class::Multiply => Instruction::Multiply {
                accumulate: bit(raw, 21),
                set_flags: bit(raw, 20),
                rd: reg(raw, 16),
                rn: reg(raw, 12),
                rs: reg(raw, 8),
                rm: reg(raw, 0),
            },
            Class::Transfer => {
                let offset = if bit(raw, 25) {
                    Offset::Reg(unpack_shifted_reg(raw))
                } else {
                    Offset::Imm(field(raw, 0, 12) as u16)
                };
                Instruction::Transfer {
                    load: bit(raw, 20),
                    pre_index: bit(raw, 24),
                    up: bit(raw, 23),
                    rn: reg(raw, 16),
                    rd: reg(raw, 12),
                    offset,
                }
            }
            Class::Branch => Instruction::Branch {
                offset: sign_ext(field(raw, 0, 24), 24),
            },
        };
        Some(Decoded { cond, instr })
    }
}

/// Packs a decoded instruction back into its 32-bit word. This is the
/// inverse of [`ArmDecoder::decode`] for every value it produces.
pub fn encode(d: &Decoded) -> u32 {
    let body = match d.instr {
        Instruction::Halt => return HALT,
        Instruction::DataProcessing {
            opcode,
            set_flags,
            rn,
            rd,
            operand2,
        } => {
            let (i, op2) = match operand2 {
                Operand2::Imm { rotate, imm8 } => (1, ((rotate as u32 & 0xF) << 8) | imm8 as u32),
                Operand2::Reg(s) => (0, pack_shifted_reg(&s)),
            };
            (i << 25)
                | (opcode.bits() << 21)
                | ((set_flags as u32) << 20)
                | ((rn as u32 & 0xF) << 16)
                | ((rd as u32 & 0xF) << 12)
                | op2
        }
        Instruction::Multiply {
            accumulate,
            set_flags,
            rd,
            rn,
            rs,
            rm,
        } => {
            ((accumulate as u32) << 21)
                | ((set_flags as u32) << 20)
                | ((rd as u32 & 0xF) << 16)
                | ((rn as u32 & 0xF) << 12)
                | ((rs as u32 & 0xF) << 8)
                | (0b1001 << 4)
                | (rm as u32 & 0xF)
        }
        Instruction::Transfer {
            load,
            pre_index,
            up,
            rn,
            rd,
            offset,
        } => {
            let (i, off) = match offset {
                Offset::Imm(v) => (0, v as u32 & 0xFFF),
                Offset::Reg(s) => (1, pack_shifted_reg(&s)),
            };
            (0b01 << 26)
                | (i << 25)
                | ((pre_index as u32) << 24)
                | ((up as u32) << 23)
                | ((load as u32) << 20)
                | ((rn as u32 & 0xF) << 16)
                | ((rd as u32 & 0xF) << 12)
                | off
        }
        Instruction::Branch { offset } => (0b101 << 25) | (offset as u32 & 0xFF_FFFF),
    };
    (d.cond.bits() << 28) | body
}
