use arm11_rs::exec::ArmExecutor;
use arm11_rs::isa::arm::ArmDecoder;
use arm11_rs::{Bus, Cpu, CpuConfig, Trap, WordMemory};

// B{cond} with a signed word offset relative to PC (branch address + 8)
fn enc_b(cond: u32, offset: i32) -> u32 {
    (cond << 28) | (0b1010 << 24) | (offset as u32 & 0x00FF_FFFF)
}

fn enc_mov_imm(rd: u32, imm8: u32) -> u32 {
    0xE3A0_0000 | (rd << 12) | (imm8 & 0xFF)
}

const AL: u32 = 0xE;
const EQ: u32 = 0x0;
const NE: u32 = 0x1;

fn run(words: &[u32], cfg: CpuConfig) -> (Cpu, Result<u64, Trap>) {
    let mut mem = WordMemory::new(1024);
    for (i, w) in words.iter().enumerate() {
        mem.write_u32(i as u32 * 4, *w).unwrap();
    }
    let mut cpu = Cpu::new(cfg);
    cpu.reset(0);
    let res = cpu.run(&mut mem, &ArmDecoder::new(), &ArmExecutor);
    (cpu, res)
}

#[test]
fn taken_branch_flushes_fetched_word() {
    // 0: b 2 ; 1: mov r0,#1 (poison, already fetched) ; 2: mov r1,#2 ; 3: halt
    let (cpu, res) = run(
        &[enc_b(AL, 0), enc_mov_imm(0, 1), enc_mov_imm(1, 2), 0],
        CpuConfig::default(),
    );
    res.unwrap();
    assert_eq!(cpu.reg(0), 0);
    assert_eq!(cpu.reg(1), 2);
}

#[test]
fn countdown_loop_with_bne() {
    // 0: mov r0,#3
    // 1: add r1,r1,#2
    // 2: sub r0,r0,#1
    // 3: cmp r0,#0
    // 4: bne 1
    // 5: halt
    let (cpu, res) = run(
        &[
            enc_mov_imm(0, 3),
            0xE281_1002,
            0xE240_0001,
            0xE350_0000,
            enc_b(NE, -5),
            0,
        ],
        CpuConfig::default(),
    );
    res.unwrap();
    assert_eq!(cpu.reg(0), 0);
    assert_eq!(cpu.reg(1), 6);
}

#[test]
fn untaken_branch_falls_through() {
    // Z is clear after reset, so beq is skipped
    let (cpu, res) = run(
        &[enc_b(EQ, 0), enc_mov_imm(0, 1), 0],
        CpuConfig::default(),
    );
    res.unwrap();
    assert_eq!(cpu.reg(0), 1);
}

#[test]
fn mov_to_pc_is_a_jump() {
    // 0: mov pc,#12 ; 1,2: poison ; 3: mov r1,#3 ; 4: halt
    let (cpu, res) = run(
        &[
            enc_mov_imm(15, 12),
            enc_mov_imm(0, 1),
            enc_mov_imm(0, 2),
            enc_mov_imm(1, 3),
            0,
        ],
        CpuConfig::default(),
    );
    res.unwrap();
    assert_eq!(cpu.reg(0), 0);
    assert_eq!(cpu.reg(1), 3);
}

#[test]
fn branch_to_self_hits_step_limit() {
    let cfg = CpuConfig {
        step_limit: Some(50),
        ..CpuConfig::default()
    };
    let (cpu, res) = run(&[enc_b(AL, -2), 0], cfg);
    assert!(matches!(res, Err(Trap::StepLimit { steps: 50 })));
    assert_eq!(cpu.steps, 50);
}
