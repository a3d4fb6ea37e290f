use std::convert::TryFrom;
use std::io::Write;
use std::{error, fmt};

use crate::memory::{Address, Byte, MemoryError, Ram};
use color_eyre::eyre::{Result, WrapErr};
use log::*;
use num_enum::IntoPrimitive;
use num_enum::TryFromPrimitive;

pub mod alu;
pub mod registers;

pub use registers::Registers;

/// Faults which stop the execution of a program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecError {
    /// An operand named a register past `R7`
    InvalidRegister { index: Byte },
    /// The program counter or one of the operands left the memory
    PcOutOfRange { pc: Address },
    /// `PUSH` with the stack pointer at address 0
    StackOverflow,
    /// `POP` with the stack pointer at the last address
    StackUnderflow,
    /// The ALU was handed an instruction it does not implement
    UnsupportedAluOperation { instruction: Instruction },
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::InvalidRegister { index } => write!(f, "no register `R{}`", index),
            ExecError::PcOutOfRange { pc } => {
                write!(f, "instruction at `0x{:x}` runs past the end of memory", pc)
            }
            ExecError::StackOverflow => f.write_str("stack overflow"),
            ExecError::StackUnderflow => f.write_str("stack underflow"),
            ExecError::UnsupportedAluOperation { instruction } => {
                write!(f, "unsupported ALU operation `{}`", instruction)
            }
        }
    }
}

impl error::Error for ExecError {}

/// Emulates the LS-8
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cpu {
    /// Program counter
    pub pc: Address,
    /// Registers, `R7` is the stack pointer
    pub reg: Registers,
    /// Main memory
    pub ram: Ram,
    /// Cleared by `HLT`
    pub running: bool,
    /// Number of executed steps
    pub cycles: u64,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// Initializes a new CPU with empty memory
    pub fn new() -> Self {
        Self {
            pc: 0,
            reg: Registers::default(),
            ram: Ram::default(),
            running: true,
            cycles: 0,
        }
    }

    /// Reads a byte from the memory
    pub fn ram_read(&self, address: Address) -> Result<Byte, MemoryError> {
        self.ram.read_byte(address)
    }

    /// Writes a byte to the memory
    pub fn ram_write(&mut self, address: Address, value: Byte) -> Result<(), MemoryError> {
        self.ram.write_byte(address, value)
    }

    /// Places `program` into memory starting at address 0.
    pub fn load(&mut self, program: &[Byte]) -> Result<()> {
        if program.is_empty() {
            warn!("Program was empty!");
        }

        self.ram
            .load(program)
            .wrap_err("Failed to load program")?;

        debug!("Loaded {} bytes", program.len());

        Ok(())
    }

    /// Reads a byte of the instruction at the program counter
    fn fetch(&self, offset: Address) -> Result<Byte, ExecError> {
        self.ram
            .read_byte(self.pc + offset)
            .map_err(|_| ExecError::PcOutOfRange { pc: self.pc })
    }

    /// Executes a single instruction
    pub fn execute_instruction<W: Write>(
        &mut self,
        instruction: Instruction,
        operands: [Byte; 2],
        out: &mut W,
    ) -> Result<()> {
        let [a, b] = operands;

        match instruction {
            Instruction::HLT => {
                self.running = false;

                debug!("HLT");
            }
            Instruction::LDI => {
                self.reg.set(a, b)?;

                debug!("LDI R{} {}", a, b);
            }
            Instruction::PRN => {
                let value = self.reg.get(a)?;
                writeln!(out, "{}", value).wrap_err("Failed to write program output")?;

                debug!("PRN R{}: {}", a, value);
            }
            Instruction::ADD | Instruction::MUL => {
                self.alu(instruction, a, b)?;
            }
            Instruction::PUSH => {
                let sp = self.reg.sp().checked_sub(1).ok_or(ExecError::StackOverflow)?;
                self.reg.set_sp(sp);

                // `PUSH R7` stores the already decremented pointer
                let value = self.reg.get(a)?;
                self.ram_write(sp as Address, value)?;

                debug!("PUSH R{}: {} -> 0x{:02X}", a, value, sp);
            }
            Instruction::POP => {
                let sp = self.reg.sp();
                if sp == Byte::MAX {
                    return Err(ExecError::StackUnderflow.into());
                }

                let value = self.ram_read(sp as Address)?;
                self.reg.set(a, value)?;

                // `POP R7` increments the popped value
                let next = self.reg.sp().checked_add(1).ok_or(ExecError::StackUnderflow)?;
                self.reg.set_sp(next);

                debug!("POP R{}: {} <- 0x{:02X}", a, value, sp);
            }
        }

        self.pc += instruction.size();

        Ok(())
    }

    /// Runs one execution step
    pub fn step<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let opcode = self.fetch(0)?;
        self.cycles += 1;

        trace!("{}", self.trace());

        let instruction = match Instruction::try_from(opcode) {
            Ok(instruction) => instruction,
            Err(_) => {
                warn!(
                    "Instruction at 0x{:02X} not recognized: 0b{:08b}",
                    self.pc, opcode
                );
                self.pc += 1;
                return Ok(());
            }
        };

        let mut operands = [0; 2];
        for (i, operand) in operands
            .iter_mut()
            .enumerate()
            .take(instruction.operand_count())
        {
            *operand = self.fetch(i + 1)?;
        }

        self.execute_instruction(instruction, operands, out)
    }

    /// Run program until it halts, returns the number of executed steps
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<u64> {
        while self.running {
            let pc = self.pc;
            self.step(out)
                .wrap_err_with(|| format!("Execution failed at 0x{:02X}", pc))?;
        }

        info!("Program halted after {} steps", self.cycles);

        Ok(self.cycles)
    }

    /// Formats the program counter, the next three bytes of memory and all
    /// registers as hex
    pub fn trace(&self) -> String {
        let mut line = format!("TRACE: {:02X} |", self.pc);

        for offset in 0..3 {
            match self.ram.read_byte(self.pc + offset) {
                Ok(byte) => line.push_str(&format!(" {:02X}", byte)),
                Err(_) => line.push_str(" --"),
            }
        }

        line.push_str(" |");
        for value in self.reg.as_slice() {
            line.push_str(&format!(" {:02X}", value));
        }

        line
    }
}

macro_rules! instructions {
    ( $( $( #[doc = $doc:expr] )+ $name:ident = $repr:literal , )+ ) => {
        /// Defines the instructions
        ///
        /// The two high bits of an opcode hold its number of operands.
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(TryFromPrimitive, IntoPrimitive)]
        pub enum Instruction {
            $(
                $( #[doc = $doc] )+
                $name = $repr,
            )+
        }

        impl Instruction {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];
        }

        impl ::std::fmt::Display for Instruction {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $( Self::$name => f.write_str(stringify!($name)) , )+
                }
            }
        }
    }
}

instructions! {
    /// Stop the execution of the program
    HLT = 0b0000_0001,
    /// Load an immediate value into a register
    /// @param reg The register to write
    /// @param value The value to load
    LDI = 0b1000_0010,
    /// Print the decimal value of a register on its own line
    /// @param reg The register to print
    PRN = 0b0100_0111,
    /// Add two registers and write the result to the first
    /// @param reg_a Summand and destination
    /// @param reg_b Summand
    ADD = 0b1010_0000,
    /// Multiply two registers and write the result to the first
    /// @param reg_a Factor and destination
    /// @param reg_b Factor
    MUL = 0b1010_0010,
    /// Decrement the stack pointer and store a register at its address
    /// @param reg The register to push
    PUSH = 0b0100_0101,
    /// Load the value at the stack pointer into a register, then increment
    /// the stack pointer
    /// @param reg The register to write
    POP = 0b0100_0110,
}

impl Instruction {
    /// Number of operand bytes following the opcode
    pub fn operand_count(self) -> usize {
        (u8::from(self) >> 6) as usize
    }

    /// Number of bytes the program counter advances by
    pub fn size(self) -> usize {
        1 + self.operand_count()
    }
}
