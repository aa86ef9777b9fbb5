// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Constants and configuration shared across the driver.
//!
//! The AMG88xx family (AMG8833, AMG8834, AMG8853, AMG8854) all share the same 8x8 pixel array and
//! register map, they differ only in gain and field of view.
use crate::address::DEFAULT_I2C_ADDRESS;
use crate::calculations::PixelEncoding;
use crate::error::LibraryError;
use crate::register::FrameRate;

/// The height of the pixel array.
pub const HEIGHT: usize = 8;

/// The width of the pixel array.
pub const WIDTH: usize = 8;

/// The number of pixels in the pixel array.
pub const NUM_PIXELS: usize = HEIGHT * WIDTH;

/// Each pixel is stored as two bytes.
pub const PIXEL_BYTES: usize = NUM_PIXELS * 2;

/// The number of bytes in the interrupt table, one bit per pixel.
pub const INTERRUPT_TABLE_LENGTH: usize = NUM_PIXELS / 8;

/// The thermistor is stored as two bytes.
pub const THERMISTOR_BYTES: usize = 2;

/// The default maximum number of bytes read in a single I²C transaction.
///
/// Many I²C controllers (and the Arduino `Wire` library) have a 32 byte buffer.
pub const DEFAULT_MAX_TRANSFER: usize = 32;

/// How long to wait after the power-up sequence for the sensor to settle, in milliseconds.
pub const SETTLING_DELAY_MS: u8 = 100;

/// Settings used when bringing up a sensor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// The 7-bit I²C address of the sensor.
    ///
    /// The default is 0x69, used when the AD_SELECT pin is high.
    pub address: u8,

    /// How pixel values should be decoded.
    ///
    /// The default is [two's complement][PixelEncoding::TwosComplement].
    pub pixel_encoding: PixelEncoding,

    /// The largest number of bytes to read in one I²C transaction.
    ///
    /// Longer reads (like the pixel array) are split into multiple transactions. Must not be zero.
    pub max_transfer: usize,

    /// The frame rate set during power-up.
    pub frame_rate: FrameRate,
}

impl Config {
    /// The default configuration for a sensor at the given address.
    pub fn new(address: u8) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }

    pub fn with_pixel_encoding(mut self, pixel_encoding: PixelEncoding) -> Self {
        self.pixel_encoding = pixel_encoding;
        self
    }

    pub fn with_max_transfer(mut self, max_transfer: usize) -> Self {
        self.max_transfer = max_transfer;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: FrameRate) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Check that this configuration can be used.
    pub fn validate(&self) -> Result<(), LibraryError> {
        if self.address > 0x7F {
            Err(LibraryError::InvalidData("I²C addresses are only 7 bits"))
        } else if self.max_transfer == 0 {
            Err(LibraryError::InvalidData(
                "The maximum transfer size must be at least one byte",
            ))
        } else {
            Ok(())
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_I2C_ADDRESS,
            pixel_encoding: PixelEncoding::default(),
            max_transfer: DEFAULT_MAX_TRANSFER,
            frame_rate: FrameRate::default(),
        }
    }
}
