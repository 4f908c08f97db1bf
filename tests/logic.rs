use arm11_rs::cpu::Cpsr;
use arm11_rs::exec::ArmExecutor;
use arm11_rs::isa::arm::ArmDecoder;
use arm11_rs::{Bus, Cpu, CpuConfig, Trap, WordMemory};

// Data processing with a rotated immediate: cond=AL, I=1
fn enc_dp_imm(op: u32, s: bool, rn: u32, rd: u32, imm8: u32) -> u32 {
    0xE200_0000 | (op << 21) | ((s as u32) << 20) | (rn << 16) | (rd << 12) | imm8
}

// Data processing with a register operand, shifted by a constant
fn enc_dp_reg(op: u32, s: bool, rn: u32, rd: u32, shift: u32, amount: u32, rm: u32) -> u32 {
    0xE000_0000
        | (op << 21)
        | ((s as u32) << 20)
        | (rn << 16)
        | (rd << 12)
        | (amount << 7)
        | (shift << 5)
        | rm
}

const AND: u32 = 0x0;
const EOR: u32 = 0x1;
const SUB: u32 = 0x2;
const RSB: u32 = 0x3;
const ADD: u32 = 0x4;
const TST: u32 = 0x8;
const CMP: u32 = 0xA;
const ORR: u32 = 0xC;
const MOV: u32 = 0xD;

fn exec(words: &[u32], setup: impl FnOnce(&mut Cpu)) -> (Cpu, Result<u64, Trap>) {
    let mut mem = WordMemory::new(256);
    for (i, w) in words.iter().enumerate() {
        mem.write_u32(i as u32 * 4, *w).unwrap();
    }
    let mut cpu = Cpu::new(CpuConfig::default());
    cpu.reset(0);
    setup(&mut cpu);
    let res = cpu.run(&mut mem, &ArmDecoder::new(), &ArmExecutor);
    (cpu, res)
}

fn exec_ok(words: &[u32], setup: impl FnOnce(&mut Cpu)) -> Cpu {
    let (cpu, res) = exec(words, setup);
    res.unwrap();
    cpu
}

#[test]
fn adds_wraps_and_sets_carry() {
    let cpu = exec_ok(&[enc_dp_imm(ADD, true, 0, 1, 1)], |c| c.regs[0] = 0xFFFF_FFFF);
    assert_eq!(cpu.reg(1), 0);
    assert!(cpu.cpsr.contains(Cpsr::Z | Cpsr::C));
    assert!(!cpu.cpsr.contains(Cpsr::N));
}

#[test]
fn subtraction_carry_is_not_borrow() {
    let cpu = exec_ok(&[enc_dp_imm(SUB, true, 0, 1, 3)], |c| c.regs[0] = 5);
    assert_eq!(cpu.reg(1), 2);
    assert!(cpu.cpsr.contains(Cpsr::C));

    let cpu = exec_ok(&[enc_dp_imm(CMP, true, 0, 0, 6)], |c| c.regs[0] = 5);
    assert_eq!(cpu.reg(0), 5);
    assert!(cpu.cpsr.contains(Cpsr::N));
    assert!(!cpu.cpsr.intersects(Cpsr::C | Cpsr::Z));
}

#[test]
fn rsb_reverses_operands() {
    let cpu = exec_ok(&[enc_dp_imm(RSB, false, 0, 1, 10)], |c| c.regs[0] = 3);
    assert_eq!(cpu.reg(1), 7);
    assert_eq!(cpu.cpsr, Cpsr::empty());
}

#[test]
fn overflow_flag_is_left_alone() {
    let cpu = exec_ok(&[enc_dp_imm(ADD, true, 0, 1, 1)], |c| {
        c.regs[0] = 0x7FFF_FFFF;
        c.cpsr = Cpsr::V;
    });
    assert_eq!(cpu.reg(1), 0x8000_0000);
    assert!(cpu.cpsr.contains(Cpsr::N | Cpsr::V));
}

#[test]
fn logical_ops_take_carry_from_shifter() {
    // movs r1, r0, lsl #1
    let cpu = exec_ok(&[enc_dp_reg(MOV, true, 0, 1, 0b00, 1, 0)], |c| {
        c.regs[0] = 0x8000_0001
    });
    assert_eq!(cpu.reg(1), 2);
    assert!(cpu.cpsr.contains(Cpsr::C));
    assert!(!cpu.cpsr.contains(Cpsr::N));

    // ands r1, r0, #0 shifts nothing out, so C survives
    let cpu = exec_ok(&[enc_dp_imm(AND, true, 0, 1, 0)], |c| {
        c.regs[0] = 0xFF;
        c.cpsr = Cpsr::C;
    });
    assert_eq!(cpu.reg(1), 0);
    assert!(cpu.cpsr.contains(Cpsr::Z | Cpsr::C));
}

#[test]
fn test_ops_do_not_write_back() {
    let cpu = exec_ok(&[enc_dp_imm(TST, true, 0, 0, 1)], |c| c.regs[0] = 2);
    assert_eq!(cpu.reg(0), 2);
    assert!(cpu.cpsr.contains(Cpsr::Z));
}

#[test]
fn eor_and_orr() {
    let cpu = exec_ok(
        &[
            enc_dp_reg(EOR, false, 0, 2, 0, 0, 1),
            enc_dp_reg(ORR, false, 0, 3, 0, 0, 1),
        ],
        |c| {
            c.regs[0] = 0xF0F0;
            c.regs[1] = 0x0FF0;
        },
    );
    assert_eq!(cpu.reg(2), 0xFF00);
    assert_eq!(cpu.reg(3), 0xFFF0);
}

#[test]
fn barrel_shifter_forms() {
    let cpu = exec_ok(
        &[
            0xE1A0_2130,                           // mov r2, r0, lsr r1
            enc_dp_reg(MOV, false, 0, 3, 0b10, 4, 4), // mov r3, r4, asr #4
            enc_dp_reg(MOV, false, 0, 5, 0b11, 8, 6), // mov r5, r6, ror #8
        ],
        |c| {
            c.regs[0] = 0x100;
            c.regs[1] = 4;
            c.regs[4] = 0x8000_0000;
            c.regs[6] = 0xAB;
        },
    );
    assert_eq!(cpu.reg(2), 0x10);
    assert_eq!(cpu.reg(3), 0xF800_0000);
    assert_eq!(cpu.reg(5), 0xAB00_0000);
}

#[test]
fn mul_and_mla() {
    let cpu = exec_ok(&[0xE002_0190, 0xE023_2190], |c| {
        c.regs[0] = 6;
        c.regs[1] = 7;
    });
    assert_eq!(cpu.reg(2), 42);
    assert_eq!(cpu.reg(3), 84);
}

#[test]
fn multiply_into_its_own_operand_traps() {
    // mul r0, r0, r1
    let (_, res) = exec(&[0xE000_0190], |_| {});
    assert!(matches!(res, Err(Trap::UnpredictableMultiply { pc: 0 })));
}

#[test]
fn condition_gates_execution() {
    // moveq r0,#1 ; movne r1,#1
    let cpu = exec_ok(&[0x03A0_0001, 0x13A0_1001], |_| {});
    assert_eq!(cpu.reg(0), 0);
    assert_eq!(cpu.reg(1), 1);
}

#[test]
fn unsupported_opcode_is_invalid() {
    // adc r0, r0, r0
    let (_, res) = exec(&[0xE0A0_0000], |_| {});
    assert!(matches!(
        res,
        Err(Trap::InvalidInstruction { pc: 0, raw: 0xE0A0_0000 })
    ));
}
