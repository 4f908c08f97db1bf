pub mod condition;
pub mod cpu;
pub mod decoder;
pub mod exec;
pub mod disasm;
pub mod instructions;
pub mod memory;
pub mod shifter;

pub mod isa {
    pub mod arm; // ARM11 data-processing/multiply/transfer/branch subset
}

pub use cpu::{Cpu, CpuConfig, Status, Trap};
pub use memory::{Bus, WordMemory};
