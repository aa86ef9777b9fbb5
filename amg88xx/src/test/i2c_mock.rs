// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
extern crate alloc;

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, Ref, RefCell};

use embedded_hal::blocking::i2c;

use crate::common::{DEFAULT_MAX_TRANSFER, NUM_PIXELS};

/// The register map is addressed with a single byte.
const REGISTER_FILE_LENGTH: usize = 256;

/// Enough to hold a full pixel frame read one byte at a time, twice.
const RECENT_OPERATIONS_QUEUE_LENGTH: usize = 256;

const POWER_CONTROL: u8 = 0x00;
const RESET: u8 = 0x01;
const STATUS: u8 = 0x04;
const STATUS_CLEAR: u8 = 0x05;
const THERMISTOR: u8 = 0x0E;
const INTERRUPT_TABLE: u8 = 0x10;
const PIXEL_BASE: u8 = 0x80;

const FLAG_RESET: u8 = 0x30;
const INITIAL_RESET: u8 = 0x3F;

/// The registers restored by an initial reset.
const CONTROL_REGISTERS: [u8; 11] = [
    0x00, 0x01, 0x02, 0x03, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D,
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum MockError {
    /// The given register can't be read (or is out of the register map).
    IllegalAccess(u8),

    /// The given register should not be written to.
    IllegalWriteAddress(u8),

    /// The given value is illegal for the given register.
    IllegalWriteValue(u8, u8),

    /// An unknown I2C address was given.
    UnknownI2cAddress(u8),

    /// A read longer than the controller's buffer was attempted.
    TransferTooLong(usize),

    /// Nothing acknowledged the transaction (the sensor has been "unplugged").
    NotAcknowledged,

    /// The requested operation is not allowed.
    ///
    /// This covers things situations such as:
    /// * A write-read transaction writing more than the register address.
    /// * A write-read transaction with a 0-length read.
    /// * A write of more (or less) than one byte of data.
    IllegalOperation,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum I2cOperation {
    Write { register: u8, value: u8 },
    Read { register: u8, length: usize },
}

/// A fake AMG88xx.
///
/// Clones share the same state, so a clone can be kept to inspect a bus that has been moved into
/// a driver.
#[derive(Clone, Debug)]
pub(crate) struct MockSensorBus {
    i2c_address: u8,
    max_transfer: usize,
    registers: Rc<RefCell<[u8; REGISTER_FILE_LENGTH]>>,
    disconnected: Rc<Cell<bool>>,
    reads_until_failure: Rc<Cell<Option<usize>>>,
    recent_operations: Rc<RefCell<VecDeque<I2cOperation>>>,
}

impl MockSensorBus {
    pub(crate) fn new(i2c_address: u8) -> Self {
        Self {
            i2c_address,
            max_transfer: DEFAULT_MAX_TRANSFER,
            registers: Rc::new(RefCell::new([0u8; REGISTER_FILE_LENGTH])),
            disconnected: Rc::new(Cell::new(false)),
            reads_until_failure: Rc::new(Cell::new(None)),
            recent_operations: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    /// Reject reads longer than `max_transfer` bytes.
    pub(crate) fn with_max_transfer(mut self, max_transfer: usize) -> Self {
        self.max_transfer = max_transfer;
        self
    }

    /// Peek at a register without recording an operation.
    pub(crate) fn register(&self, register: u8) -> u8 {
        self.registers.borrow()[register as usize]
    }

    /// Set a register directly, bypassing the write checks.
    pub(crate) fn set_register(&self, register: u8, value: u8) {
        self.registers.borrow_mut()[register as usize] = value;
    }

    pub(crate) fn set_pixels(&self, pixels: &[u16]) {
        let mut registers = self.registers.borrow_mut();
        for (index, pixel) in pixels.iter().take(NUM_PIXELS).enumerate() {
            let offset = PIXEL_BASE as usize + index * 2;
            registers[offset..(offset + 2)].copy_from_slice(&pixel.to_le_bytes());
        }
    }

    pub(crate) fn set_thermistor(&self, raw: u16) {
        let offset = THERMISTOR as usize;
        self.registers.borrow_mut()[offset..(offset + 2)].copy_from_slice(&raw.to_le_bytes());
    }

    pub(crate) fn set_interrupt_table(&self, table: [u8; 8]) {
        let offset = INTERRUPT_TABLE as usize;
        self.registers.borrow_mut()[offset..(offset + 8)].copy_from_slice(&table);
    }

    pub(crate) fn interrupt_table(&self) -> [u8; 8] {
        let offset = INTERRUPT_TABLE as usize;
        let mut table = [0u8; 8];
        table.copy_from_slice(&self.registers.borrow()[offset..(offset + 8)]);
        table
    }

    /// Simulate the sensor being unplugged (or plugged back in).
    pub(crate) fn set_disconnected(&self, disconnected: bool) {
        self.disconnected.set(disconnected);
    }

    /// Let `count` more write-read transactions succeed, then fail every one after them.
    pub(crate) fn fail_reads_after(&self, count: usize) {
        self.reads_until_failure.set(Some(count));
    }

    fn add_operation(&self, operation: I2cOperation) {
        let mut recent_ops = self.recent_operations.borrow_mut();
        recent_ops.push_front(operation);
        recent_ops.truncate(RECENT_OPERATIONS_QUEUE_LENGTH);
    }

    /// The most recent operations, newest first.
    pub(crate) fn recent_operations(&self) -> Ref<VecDeque<I2cOperation>> {
        self.recent_operations.borrow()
    }

    /// The most recent operations, in the order they were performed.
    pub(crate) fn operations_in_order(&self) -> Vec<I2cOperation> {
        self.recent_operations.borrow().iter().rev().copied().collect()
    }

    pub(crate) fn clear_recent_operations(&self) {
        self.recent_operations.borrow_mut().clear()
    }

    fn flag_reset(registers: &mut [u8; REGISTER_FILE_LENGTH]) {
        registers[STATUS as usize] = 0;
        let table_start = INTERRUPT_TABLE as usize;
        registers[table_start..(table_start + 8)].fill(0);
    }

    pub(crate) fn set(&mut self, register: u8, value: u8) -> Result<(), MockError> {
        let valid = match register {
            POWER_CONTROL => matches!(value, 0x00 | 0x10 | 0x20 | 0x21),
            RESET => matches!(value, FLAG_RESET | INITIAL_RESET),
            0x02 => value & !0x01 == 0,
            0x03 => value & !0x03 == 0,
            STATUS_CLEAR => value & !0x0E == 0,
            0x07 => value & !0x20 == 0,
            0x08 | 0x0A | 0x0C => true,
            // Only bits 8-11 of the levels are stored in the high registers.
            0x09 | 0x0B | 0x0D => value & !0x0F == 0,
            _ => return Err(MockError::IllegalWriteAddress(register)),
        };
        if !valid {
            return Err(MockError::IllegalWriteValue(register, value));
        }
        let mut registers = self.registers.borrow_mut();
        match (register, value) {
            (RESET, FLAG_RESET) => {
                Self::flag_reset(&mut registers);
                registers[RESET as usize] = value;
            }
            (RESET, INITIAL_RESET) => {
                Self::flag_reset(&mut registers);
                for control in CONTROL_REGISTERS.iter() {
                    registers[*control as usize] = 0;
                }
                registers[RESET as usize] = value;
            }
            (STATUS_CLEAR, _) => {
                // The clear register always reads as 0.
                registers[STATUS as usize] &= !value;
            }
            _ => registers[register as usize] = value,
        }
        Ok(())
    }
}

impl i2c::Write for MockSensorBus {
    type Error = MockError;

    fn write(&mut self, i2c_address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.disconnected.get() {
            return Err(MockError::NotAcknowledged);
        }
        if i2c_address != self.i2c_address {
            return Err(MockError::UnknownI2cAddress(i2c_address));
        }
        // Every register write is the register address followed by one byte of data.
        let (register, value) = match bytes {
            [register, value] => (*register, *value),
            _ => return Err(MockError::IllegalOperation),
        };
        self.set(register, value)?;
        self.add_operation(I2cOperation::Write { register, value });
        Ok(())
    }
}

impl i2c::WriteRead for MockSensorBus {
    type Error = MockError;

    fn write_read(
        &mut self,
        i2c_address: u8,
        write_buffer: &[u8],
        out_buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        if self.disconnected.get() {
            return Err(MockError::NotAcknowledged);
        }
        if i2c_address != self.i2c_address {
            return Err(MockError::UnknownI2cAddress(i2c_address));
        }
        // Write-reads should only be writing the register address
        if write_buffer.len() != 1 || out_buffer.is_empty() {
            return Err(MockError::IllegalOperation);
        }
        match self.reads_until_failure.get() {
            Some(0) => return Err(MockError::NotAcknowledged),
            Some(remaining) => self.reads_until_failure.set(Some(remaining - 1)),
            None => (),
        }
        if out_buffer.len() > self.max_transfer {
            return Err(MockError::TransferTooLong(out_buffer.len()));
        }
        let register = write_buffer[0];
        let start = register as usize;
        let end = start + out_buffer.len();
        if end > REGISTER_FILE_LENGTH {
            return Err(MockError::IllegalAccess(register));
        }
        self.add_operation(I2cOperation::Read {
            register,
            length: out_buffer.len(),
        });
        out_buffer.copy_from_slice(&self.registers.borrow()[start..end]);
        Ok(())
    }
}

/// A mock sensor, already powered up, with a thermistor reading of 25 ℃ and a pixel gradient
/// from 20 ℃ (first pixel) to 35.75 ℃ (last pixel).
pub(crate) fn mock_amg88xx_at_address(i2c_address: u8) -> MockSensorBus {
    let mock = MockSensorBus::new(i2c_address);
    mock.set_thermistor(0x0190);
    mock.set_pixels(&example_pixels());
    mock
}

/// Raw pixel values, 20 ℃ increasing by 0.25 ℃ per pixel.
pub(crate) fn example_pixels() -> [u16; NUM_PIXELS] {
    let mut pixels = [0u16; NUM_PIXELS];
    for (index, pixel) in pixels.iter_mut().enumerate() {
        *pixel = 80 + index as u16;
    }
    pixels
}

#[cfg(test)]
mod test {
    use embedded_hal::blocking::i2c::{Write, WriteRead};

    use super::*;
    use crate::RegisterAddress;

    #[test]
    fn initial_reset_restores_defaults() {
        let mut mock = mock_amg88xx_at_address(0x69);
        mock.write(0x69, &[0x03, 0x03]).unwrap();
        mock.set_register(STATUS, 0x0E);
        mock.set_interrupt_table([0xFF; 8]);
        mock.write(0x69, &[RESET, INITIAL_RESET]).unwrap();
        assert_eq!(mock.register(0x03), 0x00);
        assert_eq!(mock.register(STATUS), 0x00);
        assert_eq!(mock.interrupt_table(), [0u8; 8]);
        // Outputs are left alone
        assert_eq!(mock.register(THERMISTOR), 0x90);
    }

    #[test]
    fn rejects_reserved_bits() {
        let mut mock = mock_amg88xx_at_address(0x69);
        assert_eq!(
            mock.write(0x69, &[0x09, 0x10]),
            Err(MockError::IllegalWriteValue(0x09, 0x10))
        );
        assert_eq!(
            mock.write(0x69, &[RegisterAddress::PixelBase.as_raw(), 0x00]),
            Err(MockError::IllegalWriteAddress(0x80))
        );
        assert!(mock.recent_operations().is_empty());
    }

    #[test]
    fn rejects_long_reads() {
        let mut mock = mock_amg88xx_at_address(0x69).with_max_transfer(4);
        let mut buf = [0u8; 5];
        assert_eq!(
            mock.write_read(0x69, &[PIXEL_BASE], &mut buf),
            Err(MockError::TransferTooLong(5))
        );
        assert!(mock.write_read(0x69, &[PIXEL_BASE], &mut buf[..4]).is_ok());
    }

    #[test]
    fn fails_after_count() {
        let mut mock = mock_amg88xx_at_address(0x69);
        mock.fail_reads_after(2);
        let mut buf = [0u8; 2];
        assert!(mock.write_read(0x69, &[THERMISTOR], &mut buf).is_ok());
        assert!(mock.write_read(0x69, &[THERMISTOR], &mut buf).is_ok());
        assert_eq!(
            mock.write_read(0x69, &[THERMISTOR], &mut buf),
            Err(MockError::NotAcknowledged)
        );
        assert_eq!(mock.recent_operations().len(), 2);
    }
}
