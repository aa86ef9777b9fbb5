// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The default I²C address of the sensor, used when the AD_SELECT pin is pulled high.
pub const DEFAULT_I2C_ADDRESS: u8 = 0x69;

/// The alternate I²C address of the sensor, used when the AD_SELECT pin is pulled low.
pub const ALTERNATE_I2C_ADDRESS: u8 = 0x68;

/// Register addresses for the AMG88xx.
///
/// The registers are all 8 bits wide. The interrupt table and pixel array are contiguous blocks,
/// only their first address is listed.
// NOTE: To make it easier to compare against the datasheet, discriminant values should *always* be
// explicitly written out.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RegisterAddress {
    /// Power control (PCTL).
    PowerControl = 0x00,

    /// Reset (RST).
    Reset = 0x01,

    /// Frame rate (FPSC).
    FrameRate = 0x02,

    /// Interrupt control (INTC).
    InterruptControl = 0x03,

    /// Status (STAT).
    Status = 0x04,

    /// Status clear (SCLR).
    StatusClear = 0x05,

    /// Average (AVE).
    Average = 0x07,

    /// Bits 0-7 of the upper interrupt level (INTHL).
    InterruptHighLow = 0x08,

    /// Bits 8-11 of the upper interrupt level (INTHH).
    InterruptHighHigh = 0x09,

    /// Bits 0-7 of the lower interrupt level (INTLL).
    InterruptLowLow = 0x0A,

    /// Bits 8-11 of the lower interrupt level (INTLH).
    InterruptLowHigh = 0x0B,

    /// Bits 0-7 of the interrupt hysteresis level (IHYSL).
    HysteresisLow = 0x0C,

    /// Bits 8-11 of the interrupt hysteresis level (IHYSH).
    HysteresisHigh = 0x0D,

    /// Bits 0-7 of the thermistor output (TTHL).
    ThermistorLow = 0x0E,

    /// Bits 8-11 of the thermistor output (TTHH).
    ThermistorHigh = 0x0F,

    /// The first byte of the 8 byte interrupt table (INT0).
    InterruptTable = 0x10,

    /// The low byte of the first pixel (T01L). The pixel array extends to 0xFF.
    PixelBase = 0x80,
}

impl RegisterAddress {
    /// The raw address, usable as the register pointer in an I²C transaction.
    pub const fn as_raw(self) -> u8 {
        self as u8
    }
}
