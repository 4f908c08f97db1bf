use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use arm11_rs::cpu::{CPSR, LR, NUM_REGS, PC, SP};
use arm11_rs::{exec::ArmExecutor, isa::arm::ArmDecoder, Cpu, CpuConfig, WordMemory};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Run an assembled binary on the arm11-rs emulator"
)]
struct Opts {
    /// Abort after this many pipeline cycles
    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,
    /// Print the final state as JSON instead of the register dump
    #[arg(long)]
    json: bool,
    #[arg(value_name = "BINFILE")]
    input: PathBuf,
}

#[derive(Serialize)]
struct MemWord {
    addr: u32,
    value: u32,
}

#[derive(Serialize)]
struct Report<'a> {
    cpu: &'a Cpu,
    memory: Vec<MemWord>,
}

fn print_state(cpu: &Cpu, mem: &WordMemory) {
    println!("Registers:");
    for i in (0..NUM_REGS).filter(|i| *i != SP && *i != LR) {
        let name = match i {
            PC => "PC".to_string(),
            CPSR => "CPSR".to_string(),
            n => format!("${n}"),
        };
        let v = cpu.reg(i);
        println!("{name:<4}: {:>10} ({v:#010x})", v as i32);
    }
    println!("Non-zero memory:");
    for (addr, word) in mem.nonzero() {
        println!("{addr:#010x}: {word:#010x}");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    let cfg = CpuConfig {
        step_limit: opts.max_steps,
        ..CpuConfig::default()
    };
    let mut mem = WordMemory::new(cfg.mem_words);

    let bytes = std::fs::read(&opts.input)
        .with_context(|| format!("The file {} could not be read", opts.input.display()))?;
    mem.load_image(&bytes)?;

    let mut cpu = Cpu::new(cfg);
    cpu.reset(0);

    let dec = ArmDecoder::new();
    let exec = ArmExecutor;
    let outcome = cpu.run(&mut mem, &dec, &exec);

    for addr in &cpu.faults {
        println!("Error: Out of bounds memory access at address {addr:#010x}");
    }
    if opts.json {
        let report = Report {
            cpu: &cpu,
            memory: mem
                .nonzero()
                .map(|(addr, value)| MemWord { addr, value })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_state(&cpu, &mem);
    }

    // a fatal trap still gets the state dump above
    outcome?;
    Ok(())
}
