use crate::memory::Byte;

use super::ExecError;

/// Number of general purpose registers
pub const REGISTER_COUNT: usize = 8;
/// Register reserved for the stack pointer
pub const SP: Byte = 7;
/// Initial stack pointer, the stack grows down from here
pub const SP_INIT: Byte = 0xF4;

/// The register file `R0` to `R7`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registers {
    data: [Byte; REGISTER_COUNT],
}

impl Default for Registers {
    fn default() -> Self {
        let mut data = [0; REGISTER_COUNT];
        data[SP as usize] = SP_INIT;

        Self { data }
    }
}

impl Registers {
    /// Reads register `R<index>`
    pub fn get(&self, index: Byte) -> Result<Byte, ExecError> {
        self.data
            .get(index as usize)
            .copied()
            .ok_or(ExecError::InvalidRegister { index })
    }

    /// Writes register `R<index>`
    pub fn set(&mut self, index: Byte, value: Byte) -> Result<(), ExecError> {
        let register = self
            .data
            .get_mut(index as usize)
            .ok_or(ExecError::InvalidRegister { index })?;
        *register = value;

        Ok(())
    }

    /// Stack pointer
    pub fn sp(&self) -> Byte {
        self.data[SP as usize]
    }

    /// Moves the stack pointer
    pub fn set_sp(&mut self, value: Byte) {
        self.data[SP as usize] = value;
    }

    /// All registers, `R0` first
    pub fn as_slice(&self) -> &[Byte] {
        &self.data
    }
}
