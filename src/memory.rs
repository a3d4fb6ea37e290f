use std::{error, fmt};

pub mod parse;

pub type Byte = u8; // 1 byte
pub type Address = usize;

/// Number of addressable cells of the LS-8
pub const RAM_SIZE: usize = 256;

/// Default memory
pub type Ram = Memory<RAM_SIZE>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    OutOfRange { address: Address, size: usize },
    ProgramTooLarge { len: usize, size: usize },
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::OutOfRange { address, size } => {
                write!(f, "address `0x{:x}` is outside of memory (size {})", address, size)
            }
            MemoryError::ProgramTooLarge { len, size } => {
                write!(f, "program of {} bytes does not fit into {} bytes of memory", len, size)
            }
        }
    }
}

impl error::Error for MemoryError {}

/// Emulates memory for use with the CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Memory<const S: usize> {
    /// The actual data of the memory
    pub data: [Byte; S],
}

impl<const S: usize> Default for Memory<S> {
    /// Initializes the memory
    fn default() -> Self {
        Memory { data: [0; S] }
    }
}

impl<const S: usize> Memory<S> {
    /// Reads a byte from the memory
    pub fn read_byte(&self, position: Address) -> Result<Byte, MemoryError> {
        self.data
            .get(position)
            .copied()
            .ok_or(MemoryError::OutOfRange { address: position, size: S })
    }

    /// Writes a byte to the memory
    pub fn write_byte(&mut self, position: Address, value: Byte) -> Result<(), MemoryError> {
        let cell = self
            .data
            .get_mut(position)
            .ok_or(MemoryError::OutOfRange { address: position, size: S })?;
        *cell = value;

        Ok(())
    }

    /// Writes an array of bytes to the memory
    pub fn write_array(&mut self, position: Address, data: &[Byte]) -> Result<(), MemoryError> {
        let end = position + data.len();
        if end > S {
            return Err(MemoryError::OutOfRange { address: end - 1, size: S });
        }

        self.data[position..end].copy_from_slice(data);

        Ok(())
    }

    /// Places a program at address 0, one byte per cell.
    ///
    /// # Errors
    ///
    /// Fails without touching memory if the program is larger than the memory.
    pub fn load(&mut self, program: &[Byte]) -> Result<(), MemoryError> {
        if program.len() > S {
            return Err(MemoryError::ProgramTooLarge {
                len: program.len(),
                size: S,
            });
        }

        self.write_array(0, program)
    }
}

/// Writes a block of instructions directly into the memory
#[macro_export]
macro_rules! write_instructions {
    ( $mem:expr ; $pos:expr => $( $byte:expr ),+ ) => {
        $mem.write_array($pos, &[
            $(
                $byte as $crate::memory::Byte,
            )+
        ])
    };
}
