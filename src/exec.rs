use crate::cpu::{Cpsr, Cpu, Trap, PC};
use crate::decoder::{Decoded, Instruction, Offset, Opcode, Operand2, ShiftAmount, ShiftedReg};
use crate::memory::Bus;
use crate::shifter::{expand_imm, shift, Shifted};

/// What the pipeline does after an instruction retires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Next,
    /// PC was rewritten; in-flight words must be discarded.
    Jump,
}

pub trait Executor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, d: &Decoded) -> Result<Flow, Trap>;
}

pub struct ArmExecutor;

impl Executor for ArmExecutor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, d: &Decoded) -> Result<Flow, Trap> {
        match d.instr {
            Instruction::DataProcessing {
                opcode,
                set_flags,
                rn,
                rd,
                operand2,
            } => Ok(data_processing(cpu, opcode, set_flags, rn, rd, operand2)),
            Instruction::Multiply {
                accumulate,
                set_flags,
                rd,
                rn,
                rs,
                rm,
            } => {
                if rd == rm {
                    return Err(Trap::UnpredictableMultiply {
                        pc: cpu.executing_addr(),
                    });
                }
                let mut res = cpu.reg(rm as usize).wrapping_mul(cpu.reg(rs as usize));
                if accumulate {
                    res = res.wrapping_add(cpu.reg(rn as usize));
                }
                cpu.set_reg(rd as usize, res);
                if set_flags {
                    set_nz(cpu, res);
                }
                Ok(Flow::Next)
            }
            Instruction::Transfer {
                load,
                pre_index,
                up,
                rn,
                rd,
                offset,
            } => {
                let offset = match offset {
                    Offset::Imm(v) => v as u32,
                    Offset::Reg(s) => shifted_reg(cpu, &s).value,
                };
                let base = cpu.reg(rn as usize);
                let moved = if up {
                    base.wrapping_add(offset)
                } else {
                    base.wrapping_sub(offset)
                };
                let addr = if pre_index { moved } else { base };
                if load {
                    let val = bus
                        .read_u32(addr)
                        .map_err(|_| Trap::OutOfBounds { addr })?;
                    cpu.set_reg(rd as usize, val);
                } else {
                    bus.write_u32(addr, cpu.reg(rd as usize))
                        .map_err(|_| Trap::OutOfBounds { addr })?;
                }
                if !pre_index {
                    cpu.set_reg(rn as usize, moved);
                }
                if load && rd as usize == PC {
                    Ok(Flow::Jump)
                } else {
                    Ok(Flow::Next)
                }
            }
            Instruction::Branch { offset } => {
                // pc already sits two words past the branch
                let target = cpu.pc().wrapping_add((offset << 2) as u32);
                cpu.set_pc(target);
                Ok(Flow::Jump)
            }
            Instruction::Halt => Ok(Flow::Next),
        }
    }
}

fn shifted_reg(cpu: &Cpu, s: &ShiftedReg) -> Shifted {
    let amount = match s.amount {
        ShiftAmount::Imm(n) => n as u32,
        ShiftAmount::Reg(rs) => cpu.reg(rs as usize) & 0xFF,
    };
    shift(s.kind, cpu.reg(s.rm as usize), amount)
}

fn set_nz(cpu: &mut Cpu, res: u32) {
    cpu.cpsr.set(Cpsr::N, res >> 31 == 1);
    cpu.cpsr.set(Cpsr::Z, res == 0);
}

fn data_processing(
    cpu: &mut Cpu,
    opcode: Opcode,
    set_flags: bool,
    rn: u8,
    rd: u8,
    operand2: Operand2,
) -> Flow {
    let Shifted { value: b, carry: shifter_carry } = match operand2 {
        Operand2::Imm { rotate, imm8 } => expand_imm(imm8, rotate),
        Operand2::Reg(s) => shifted_reg(cpu, &s),
    };
    let a = cpu.reg(rn as usize);
    // C after subtraction is NOT borrow
    let (res, carry) = match opcode {
        Opcode::And | Opcode::Tst => (a & b, shifter_carry),
        Opcode::Eor | Opcode::Teq => (a ^ b, shifter_carry),
        Opcode::Orr => (a | b, shifter_carry),
        Opcode::Mov => (b, shifter_carry),
        Opcode::Add => {
            let (r, c) = a.overflowing_add(b);
            (r, Some(c))
        }
        Opcode::Sub | Opcode::Cmp => {
            let (r, borrow) = a.overflowing_sub(b);
            (r, Some(!borrow))
        }
        Opcode::Rsb => {
            let (r, borrow) = b.overflowing_sub(a);
            (r, Some(!borrow))
        }
    };

    if set_flags {
        set_nz(cpu, res);
        if let Some(c) = carry {
            cpu.cpsr.set(Cpsr::C, c);
        }
    }
    if opcode.writes_result() {
        cpu.set_reg(rd as usize, res);
        if rd as usize == PC {
            return Flow::Jump;
        }
    }
    Flow::Next
}
