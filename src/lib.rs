//! Emulator for the LS-8, an 8 bit computer with 256 bytes of memory and
//! eight registers.

pub mod memory;
pub mod processor;

pub use memory::parse::{LoadError, Program};
pub use processor::{Cpu, ExecError, Instruction};
