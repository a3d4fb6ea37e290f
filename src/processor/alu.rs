use log::*;

use crate::memory::Byte;

use super::{Cpu, ExecError, Instruction};

impl Cpu {
    /// Arithmetic on two registers, the result is written to `reg_a`.
    ///
    /// Values wrap around at 256, like the 8 bit registers they live in.
    ///
    /// # Errors
    ///
    /// Only `ADD` and `MUL` are ALU operations, anything else is rejected
    /// with [`ExecError::UnsupportedAluOperation`].
    pub fn alu(&mut self, op: Instruction, reg_a: Byte, reg_b: Byte) -> Result<(), ExecError> {
        let a = self.reg.get(reg_a)?;
        let b = self.reg.get(reg_b)?;

        let result = match op {
            Instruction::ADD => a.wrapping_add(b),
            Instruction::MUL => a.wrapping_mul(b),
            _ => return Err(ExecError::UnsupportedAluOperation { instruction: op }),
        };
        self.reg.set(reg_a, result)?;

        debug!("{} R{} R{}: {} {} = {}", op, reg_a, reg_b, a, b, result);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::Result;
    use proptest::prelude::*;

    fn with_registers(a: Byte, b: Byte) -> Cpu {
        let mut cpu = Cpu::default();
        cpu.reg.set(0, a).unwrap();
        cpu.reg.set(1, b).unwrap();
        cpu
    }

    #[test]
    fn test_add() -> Result<()> {
        let mut cpu = with_registers(8, 9);
        cpu.alu(Instruction::ADD, 0, 1)?;

        assert_eq!(cpu.reg.get(0)?, 17);
        assert_eq!(cpu.reg.get(1)?, 9);

        Ok(())
    }

    #[test]
    fn test_mul_wraps() -> Result<()> {
        let mut cpu = with_registers(16, 17);
        cpu.alu(Instruction::MUL, 0, 1)?;

        assert_eq!(cpu.reg.get(0)?, (16 * 17 % 256) as Byte);

        Ok(())
    }

    #[test]
    fn test_same_register() -> Result<()> {
        let mut cpu = with_registers(200, 0);
        cpu.alu(Instruction::ADD, 0, 0)?;

        assert_eq!(cpu.reg.get(0)?, 144);

        Ok(())
    }

    #[test]
    fn test_unsupported_operation() {
        let mut cpu = with_registers(1, 2);

        for &op in Instruction::ALL
            .iter()
            .filter(|&&op| op != Instruction::ADD && op != Instruction::MUL)
        {
            assert_eq!(
                cpu.alu(op, 0, 1),
                Err(ExecError::UnsupportedAluOperation { instruction: op })
            );
        }
        assert_eq!(cpu.reg.get(0), Ok(1));
    }

    #[test]
    fn test_invalid_register() {
        let mut cpu = Cpu::default();

        assert_eq!(
            cpu.alu(Instruction::ADD, 0, 9),
            Err(ExecError::InvalidRegister { index: 9 })
        );
    }

    proptest! {
        #[test]
        fn add_is_modulo_256(x: Byte, y: Byte) {
            let mut cpu = with_registers(x, y);
            cpu.alu(Instruction::ADD, 0, 1).unwrap();

            prop_assert_eq!(cpu.reg.get(0).unwrap() as u32, (x as u32 + y as u32) % 256);
        }

        #[test]
        fn mul_is_modulo_256(x: Byte, y: Byte) {
            let mut cpu = with_registers(x, y);
            cpu.alu(Instruction::MUL, 0, 1).unwrap();

            prop_assert_eq!(cpu.reg.get(0).unwrap() as u32, (x as u32 * y as u32) % 256);
        }
    }
}
