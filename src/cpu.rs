use anyhow::Error;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::decoder::{Decoder, HALT};
use crate::disasm::fmt_decoded;
use crate::exec::{Executor, Flow};
use crate::memory::Bus;

pub const NUM_REGS: usize = 17;
pub const SP: usize = 13;
pub const LR: usize = 14;
pub const PC: usize = 15;
/// Flags register, exposed as a 17th register slot.
pub const CPSR: usize = 16;

pub const WORD_BYTES: u32 = 4;
/// Two words of lookahead: an executing instruction sees PC = its address + 8.
pub const PIPELINE_OFFSET: u32 = 2 * WORD_BYTES;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CpuConfig {
    pub mem_words: usize,
    /// Abort the run after this many cycles; `None` runs to the halt word.
    pub step_limit: Option<u64>,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            mem_words: 16_384,
            step_limit: None,
        }
    }
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cpsr: u32 {
const N = 1 << 31; // Negative
const Z = 1 << 30; // Zero
const C = 1 << 29; // Carry
const V = 1 << 28; // Overflow
}
}

/// One pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    Empty,
    Holding(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    pub fetched: Slot,
    pub decoded: Slot,
}

impl Pipeline {
    pub const fn new() -> Self {
        Self {
            fetched: Slot::Empty,
            decoded: Slot::Empty,
        }
    }

    /// Moves the fetched word into decode and latches `word` behind it.
    pub fn advance(&mut self, word: u32) {
        self.decoded = self.fetched;
        self.fetched = Slot::Holding(word);
    }

    /// Drops both in-flight words after a control-flow change.
    pub fn flush(&mut self) {
        *self = Self::new();
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Trap {
    #[error("Invalid instruction {raw:#010x} at {pc:#010x}")]
    InvalidInstruction { pc: u32, raw: u32 },
    #[error("Out of bounds memory access at address {addr:#010x}")]
    OutOfBounds { addr: u32 },
    #[error("Bus error at {addr:#010x}: {source}")]
    Bus {
        addr: u32,
        #[source]
        source: Error,
    },
    #[error("Multiply at {pc:#010x} uses its destination register as multiplicand")]
    UnpredictableMultiply { pc: u32 },
    #[error("Step limit of {steps} cycles reached")]
    StepLimit { steps: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Halted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpu {
    /// r0..r15; r15 is the program counter.
    pub regs: [u32; 16],
    pub cpsr: Cpsr,
    pub pipeline: Pipeline,
    pub cfg: CpuConfig,
    /// Addresses of out-of-bounds transfers that were skipped.
    pub faults: Vec<u32>,
    pub steps: u64,
}

impl Cpu {
    pub fn new(cfg: CpuConfig) -> Self {
        Self {
            regs: [0; 16],
            cpsr: Cpsr::empty(),
            pipeline: Pipeline::new(),
            cfg,
            faults: Vec::new(),
            steps: 0,
        }
    }

    pub fn reset(&mut self, reset_pc: u32) {
        self.set_pc(reset_pc);
        self.pipeline.flush();
    }

    pub fn pc(&self) -> u32 {
        self.regs[PC]
    }

    pub fn set_pc(&mut self, pc: u32) {
        self.regs[PC] = pc;
    }

    /// Reads register slot `i`; slot 16 reads the flags word.
    pub fn reg(&self, i: usize) -> u32 {
        if i == CPSR {
            self.cpsr.bits()
        } else {
            self.regs[i]
        }
    }

    pub fn set_reg(&mut self, i: usize, val: u32) {
        if i == CPSR {
            self.cpsr = Cpsr::from_bits_truncate(val);
        } else {
            self.regs[i] = val;
        }
    }

    /// Address of the instruction in the execute stage.
    pub fn executing_addr(&self) -> u32 {
        self.pc().wrapping_sub(PIPELINE_OFFSET)
    }

    /// One cycle: execute the decoded word (if any), then shift the
    /// pipeline and fetch at PC.
    pub fn step<B: Bus, D: Decoder, X: Executor>(
        &mut self,
        bus: &mut B,
        dec: &D,
        exec: &X,
    ) -> Result<Status, Trap> {
        self.steps += 1;
        if let Slot::Holding(raw) = self.pipeline.decoded {
            if raw == HALT {
                debug!("halt at {:#010x}", self.executing_addr());
                return Ok(Status::Halted);
            }
            let at = self.executing_addr();
            let d = dec
                .decode(raw)
                .ok_or(Trap::InvalidInstruction { pc: at, raw })?;
            if d.cond.holds(self.cpsr) {
                debug!("{at:#010x}: {}", fmt_decoded(&d));
                match exec.exec(self, bus, &d) {
                    Ok(Flow::Next) => {}
                    Ok(Flow::Jump) => {
                        self.pipeline.flush();
                        return Ok(Status::Running);
                    }
                    Err(Trap::OutOfBounds { addr }) => {
                        warn!("out of bounds access at {addr:#010x} skipped");
                        self.faults.push(addr);
                    }
                    Err(trap) => return Err(trap),
                }
            } else {
                trace!("{at:#010x}: condition {:?} not met", d.cond);
            }
        }

        let pc = self.pc();
        let word = bus
            .read_u32(pc)
            .map_err(|source| Trap::Bus { addr: pc, source })?;
        trace!("fetch {pc:#010x} -> {word:#010x}");
        self.pipeline.advance(word);
        self.set_pc(pc.wrapping_add(WORD_BYTES));
        Ok(Status::Running)
    }

    /// Steps until the halt word reaches decode. Returns the cycle count.
    pub fn run<B: Bus, D: Decoder, X: Executor>(
        &mut self,
        bus: &mut B,
        dec: &D,
        exec: &X,
    ) -> Result<u64, Trap> {
        loop {
            if let Some(limit) = self.cfg.step_limit {
                if self.steps >= limit {
                    return Err(Trap::StepLimit { steps: limit });
                }
            }
            if self.step(bus, dec, exec)? == Status::Halted {
                return Ok(self.steps);
            }
        }
    }
}
