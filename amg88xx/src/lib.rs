// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! A pure-Rust library for accessing the Panasonic AMG88xx (Grid-EYE) thermal sensors over I²C.
//!
//! The AMG88xx is an 8x8 array of thermopiles with an on-board thermistor. Unlike higher
//! resolution thermal cameras, it does its own calibration, so the driver only needs to decode
//! the fixed-point values the sensor reports. On top of that the sensor can compare every pixel
//! against a pair of temperature levels and assert its INT pin when one is crossed, recording
//! which pixels triggered in an interrupt table.
//!
//! This library uses the [`embedded-hal`][embedded-hal] I²C and delay traits, meaning you should
//! be able to use this library on other platforms, as long as there's an `embedded-hal` I²C
//! implementation available. This library is also `no_std` compatible.
//!
//! [embedded-hal]: https://docs.rs/embedded-hal/*/embedded_hal/blocking/i2c/index.html
//!
//! # Example
//! ```no_run
//! use amg88xx::Amg88xx;
//! use linux_embedded_hal::{Delay, I2cdev};
//!
//! let i2c_bus = I2cdev::new("/dev/i2c-1").expect("/dev/i2c-1 needs to be an I2C controller");
//! // Default address for these sensors is 0x69
//! let mut sensor = Amg88xx::new(i2c_bus, 0x69, &mut Delay)?;
//! let ambient: f32 = sensor.read_thermistor()?;
//! let mut temperatures = [0f32; amg88xx::common::NUM_PIXELS];
//! sensor.read_pixels(&mut temperatures)?;
//! # Ok::<(), amg88xx::Error<I2cdev>>(())
//! ```
//! This brings up the sensor on I²C bus #1 (`/dev/i2c-1`) at the default address, then reads the
//! thermistor and a full frame of pixel temperatures in ℃. Bringing up the sensor resets it,
//! disables interrupts and waits 100ms for it to settle.
//!
//! # Interrupts
//! ```no_run
//! # use amg88xx::{Amg88xx, InterruptMode};
//! # use linux_embedded_hal::{Delay, I2cdev};
//! # let i2c_bus = I2cdev::new("/dev/i2c-1").unwrap();
//! # let mut sensor = Amg88xx::new(i2c_bus, 0x69, &mut Delay)?;
//! sensor.set_interrupt_mode(InterruptMode::AbsoluteValue)?;
//! // Hysteresis defaults to 95% of the upper level
//! sensor.set_interrupt_levels(30f32, 15f32)?;
//! sensor.enable_interrupt()?;
//! // ...later, once INT has been asserted
//! let table = sensor.interrupt_table()?;
//! for (row, column) in table.triggered() {
//!     println!("({}, {}) is outside the levels", row, column);
//! }
//! sensor.clear_interrupt()?;
//! # Ok::<(), amg88xx::Error<I2cdev>>(())
//! ```
//!
//! # Pixel Encoding
//! Pixel values are 12-bit two's complement numbers on current hardware. Some older drivers
//! decoded them as signed-magnitude (as the thermistor is encoded), which gives the same results
//! for positive temperatures but not for negative ones. If you need to match that behaviour, use
//! [`Config::with_pixel_encoding`] with [`PixelEncoding::SignedMagnitude`].
//!
//! Most users of the low-level API will probably find the [`register`] and [`calculations`]
//! modules most relevant to their needs.

#![no_std]

pub mod address;
pub mod calculations;
pub mod common;
pub mod driver;
pub mod error;
pub mod register;
#[cfg(test)]
mod test;
mod util;

pub use address::{RegisterAddress, ALTERNATE_I2C_ADDRESS, DEFAULT_I2C_ADDRESS};
pub use calculations::PixelEncoding;
pub use common::Config;
pub use driver::Amg88xx;
pub use error::{Error, LibraryError};
pub use register::*;
pub use util::Num;
