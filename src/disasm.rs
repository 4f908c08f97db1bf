use crate::decoder::{AluForm, Decoded, Instruction, Offset, Operand2, ShiftAmount, ShiftedReg};
use crate::shifter::expand_imm;

pub fn fmt_decoded(d: &Decoded) -> String {
    let cond = d.cond.suffix();
    match d.instr {
        Instruction::Halt => "andeq r0, r0, r0".to_string(),
        Instruction::DataProcessing {
            opcode,
            rn,
            rd,
            operand2,
            ..
        } => {
            let mn = opcode.mnemonic();
            let op2 = op2(&operand2);
            match opcode.form() {
                AluForm::Compute => format!("{mn}{cond} r{rd}, r{rn}, {op2}"),
                AluForm::Move => format!("{mn}{cond} r{rd}, {op2}"),
                AluForm::Compare => format!("{mn}{cond} r{rn}, {op2}"),
            }
        }
        Instruction::Multiply {
            accumulate,
            rd,
            rn,
            rs,
            rm,
            ..
        } => {
            if accumulate {
                format!("mla{cond} r{rd}, r{rm}, r{rs}, r{rn}")
            } else {
                format!("mul{cond} r{rd}, r{rm}, r{rs}")
            }
        }
        Instruction::Transfer {
            load,
            pre_index,
            up,
            rn,
            rd,
            offset,
        } => {
            let mn = if load { "ldr" } else { "str" };
            let sign = if up { "" } else { "-" };
            let off = match offset {
                Offset::Imm(0) => None,
                Offset::Imm(v) => Some(format!("#{sign}{v:#x}")),
                Offset::Reg(s) => Some(format!("{sign}{}", reg(&s))),
            };
            match (off, pre_index) {
                (None, _) => format!("{mn}{cond} r{rd}, [r{rn}]"),
                (Some(o), true) => format!("{mn}{cond} r{rd}, [r{rn}, {o}]"),
                (Some(o), false) => format!("{mn}{cond} r{rd}, [r{rn}], {o}"),
            }
        }
        // shown relative to the branch's own address
        Instruction::Branch { offset } => format!("b{cond} {}", signed_hex(offset * 4 + 8)),
    }
}

fn op2(o: &Operand2) -> String {
    match *o {
        Operand2::Imm { rotate, imm8 } => format!("#{:#x}", expand_imm(imm8, rotate).value),
        Operand2::Reg(s) => reg(&s),
    }
}

fn reg(s: &ShiftedReg) -> String {
    match s.amount {
        ShiftAmount::Imm(0) => format!("r{}", s.rm),
        ShiftAmount::Imm(n) => format!("r{}, {} #{n}", s.rm, s.kind.name()),
        ShiftAmount::Reg(rs) => format!("r{}, {} r{rs}", s.rm, s.kind.name()),
    }
}

fn signed_hex(v: i32) -> String {
    if v < 0 {
        format!("-{:#x}", v.unsigned_abs())
    } else {
        format!("+{v:#x}")
    }
}
