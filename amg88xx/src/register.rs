// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use core::convert::TryFrom;

use arrayvec::ArrayVec;
use bitvec::prelude::*;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::address::RegisterAddress;
use crate::calculations::{celsius_to_raw_level, MAX_LEVEL, MIN_LEVEL};
use crate::common::{HEIGHT, INTERRUPT_TABLE_LENGTH, NUM_PIXELS, WIDTH};
use crate::error::LibraryError;
use crate::util::{is_bit_set, Num};

/// Trait for common register functionality.
///
/// Every control register on the AMG88xx is a single byte. Types implementing this trait are
/// images of a register: they can be converted to and from the byte stored on the sensor.
pub trait Register: Copy + Into<u8> + TryFrom<u8, Error = LibraryError> {
    /// A bit mask of which bits are meaningful when writing this register.
    ///
    /// Read-only registers have an empty mask.
    fn write_mask() -> u8;

    /// The address of this register in the sensor's register map.
    fn address() -> RegisterAddress;
}

/// The operating modes of the sensor.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PowerMode {
    /// Normal operation, the default.
    Normal = 0x00,

    /// Sleep mode. Only the reset register and a return to normal mode are accepted while asleep.
    Sleep = 0x10,

    /// Stand-by mode, updating the output every 60 seconds.
    StandBy60 = 0x20,

    /// Stand-by mode, updating the output every 10 seconds.
    StandBy10 = 0x21,
}

impl Default for PowerMode {
    fn default() -> Self {
        Self::Normal
    }
}

/// The two kinds of software reset.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ResetKind {
    /// Clear the status register, the interrupt flag and the interrupt table.
    Flag = 0x30,

    /// A flag reset, and a return of all the control registers to their initial values.
    Initial = 0x3F,
}

/// The frame rates supported by the sensor.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameRate {
    /// 10 frames per second, the default.
    Ten,

    /// 1 frame per second.
    One,
}

impl FrameRate {
    /// Attempt to create a `FrameRate` from the raw value of the frame rate register.
    pub(crate) fn from_raw(raw_value: u8) -> Result<Self, LibraryError> {
        match raw_value {
            0 => Ok(Self::Ten),
            1 => Ok(Self::One),
            _ => Err(LibraryError::InvalidData("Invalid frame rate given")),
        }
    }

    /// Map a frame rate variant into the representation used by the sensor.
    pub(crate) fn as_raw(&self) -> u8 {
        match self {
            Self::Ten => 0,
            Self::One => 1,
        }
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::Ten
    }
}

impl TryFrom<u8> for FrameRate {
    type Error = LibraryError;

    /// Create a `FrameRate` from a number of frames per second.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            10 => Ok(Self::Ten),
            _ => Err(LibraryError::InvalidData(
                "The given number does not match a valid frame rate",
            )),
        }
    }
}

impl From<FrameRate> for f32 {
    fn from(frame_rate: FrameRate) -> Self {
        match frame_rate {
            FrameRate::Ten => 10f32,
            FrameRate::One => 1f32,
        }
    }
}

/// How pixel temperatures are compared against the interrupt levels.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum InterruptMode {
    /// Compare the difference between the current and previous frame to the levels.
    Difference = 0,

    /// Compare the pixel temperature to the levels.
    AbsoluteValue = 1,
}

impl Default for InterruptMode {
    fn default() -> Self {
        Self::Difference
    }
}

/// The power control register (0x00).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerControl {
    pub(crate) power_mode: PowerMode,
}

impl PowerControl {
    pub fn new(power_mode: PowerMode) -> Self {
        Self { power_mode }
    }

    pub fn power_mode(&self) -> PowerMode {
        self.power_mode
    }

    pub fn set_power_mode(&mut self, power_mode: PowerMode) {
        self.power_mode = power_mode;
    }
}

impl Register for PowerControl {
    fn write_mask() -> u8 {
        0x31
    }

    fn address() -> RegisterAddress {
        RegisterAddress::PowerControl
    }
}

impl TryFrom<u8> for PowerControl {
    type Error = LibraryError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        let power_mode = PowerMode::try_from_primitive(raw)
            .map_err(|_| LibraryError::InvalidData("Invalid power mode"))?;
        Ok(Self { power_mode })
    }
}

impl From<PowerControl> for u8 {
    fn from(register: PowerControl) -> Self {
        register.power_mode.into()
    }
}

/// The reset register (0x01).
///
/// The sensor does not store the value written, but the driver keeps the last reset it issued.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reset {
    pub(crate) kind: ResetKind,
}

impl Reset {
    pub fn new(kind: ResetKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> ResetKind {
        self.kind
    }
}

impl Default for Reset {
    fn default() -> Self {
        Self::new(ResetKind::Initial)
    }
}

impl Register for Reset {
    fn write_mask() -> u8 {
        0xFF
    }

    fn address() -> RegisterAddress {
        RegisterAddress::Reset
    }
}

impl TryFrom<u8> for Reset {
    type Error = LibraryError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        let kind = ResetKind::try_from_primitive(raw)
            .map_err(|_| LibraryError::InvalidData("Invalid reset value"))?;
        Ok(Self { kind })
    }
}

impl From<Reset> for u8 {
    fn from(register: Reset) -> Self {
        register.kind.into()
    }
}

/// The frame rate register (0x02).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameRateControl {
    pub(crate) frame_rate: FrameRate,
}

impl FrameRateControl {
    pub fn new(frame_rate: FrameRate) -> Self {
        Self { frame_rate }
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.frame_rate
    }

    pub fn set_frame_rate(&mut self, frame_rate: FrameRate) {
        self.frame_rate = frame_rate;
    }
}

impl Register for FrameRateControl {
    fn write_mask() -> u8 {
        0x01
    }

    fn address() -> RegisterAddress {
        RegisterAddress::FrameRate
    }
}

impl TryFrom<u8> for FrameRateControl {
    type Error = LibraryError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        let frame_rate = FrameRate::from_raw(raw & Self::write_mask())?;
        Ok(Self { frame_rate })
    }
}

impl From<FrameRateControl> for u8 {
    fn from(register: FrameRateControl) -> Self {
        register.frame_rate.as_raw()
    }
}

/// The interrupt control register (0x03).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptControl {
    /// Whether the INT pin is driven when an interrupt occurs. Bit 0.
    pub(crate) interrupt_enabled: bool,

    /// How pixels are compared against the interrupt levels. Bit 1.
    pub(crate) interrupt_mode: InterruptMode,
}

impl InterruptControl {
    pub fn interrupt_enabled(&self) -> bool {
        self.interrupt_enabled
    }

    pub fn set_interrupt_enabled(&mut self, enabled: bool) {
        self.interrupt_enabled = enabled;
    }

    pub fn interrupt_mode(&self) -> InterruptMode {
        self.interrupt_mode
    }

    pub fn set_interrupt_mode(&mut self, mode: InterruptMode) {
        self.interrupt_mode = mode;
    }
}

impl Register for InterruptControl {
    fn write_mask() -> u8 {
        0x03
    }

    fn address() -> RegisterAddress {
        RegisterAddress::InterruptControl
    }
}

impl TryFrom<u8> for InterruptControl {
    type Error = LibraryError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        let interrupt_mode = if is_bit_set(raw, 1) {
            InterruptMode::AbsoluteValue
        } else {
            InterruptMode::Difference
        };
        Ok(Self {
            interrupt_enabled: is_bit_set(raw, 0),
            interrupt_mode,
        })
    }
}

impl From<InterruptControl> for u8 {
    fn from(register: InterruptControl) -> Self {
        let mode: u8 = register.interrupt_mode.into();
        (register.interrupt_enabled as u8) | (mode << 1)
    }
}

/// The status register (0x04). Read-only.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    /// An interrupt has occurred. Bit 1.
    pub(crate) interrupt: bool,

    /// A pixel temperature output overflowed. Bit 2.
    pub(crate) pixel_overflow: bool,

    /// The thermistor temperature output overflowed. Bit 3.
    pub(crate) thermistor_overflow: bool,
}

impl Status {
    pub fn interrupt(&self) -> bool {
        self.interrupt
    }

    pub fn pixel_overflow(&self) -> bool {
        self.pixel_overflow
    }

    pub fn thermistor_overflow(&self) -> bool {
        self.thermistor_overflow
    }
}

impl Register for Status {
    fn write_mask() -> u8 {
        0x00
    }

    fn address() -> RegisterAddress {
        RegisterAddress::Status
    }
}

impl TryFrom<u8> for Status {
    type Error = LibraryError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Ok(Self {
            interrupt: is_bit_set(raw, 1),
            pixel_overflow: is_bit_set(raw, 2),
            thermistor_overflow: is_bit_set(raw, 3),
        })
    }
}

impl From<Status> for u8 {
    fn from(register: Status) -> Self {
        ((register.interrupt as u8) << 1)
            | ((register.pixel_overflow as u8) << 2)
            | ((register.thermistor_overflow as u8) << 3)
    }
}

/// The status clear register (0x05). Write-only, set bits clear the matching [`Status`] flag.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusClear {
    pub(crate) interrupt: bool,

    pub(crate) pixel_overflow: bool,

    pub(crate) thermistor_overflow: bool,
}

impl StatusClear {
    /// Clear every status flag.
    pub fn all() -> Self {
        Self {
            interrupt: true,
            pixel_overflow: true,
            thermistor_overflow: true,
        }
    }

    pub fn with_interrupt(mut self, clear: bool) -> Self {
        self.interrupt = clear;
        self
    }

    pub fn with_pixel_overflow(mut self, clear: bool) -> Self {
        self.pixel_overflow = clear;
        self
    }

    pub fn with_thermistor_overflow(mut self, clear: bool) -> Self {
        self.thermistor_overflow = clear;
        self
    }
}

impl Register for StatusClear {
    fn write_mask() -> u8 {
        0x0E
    }

    fn address() -> RegisterAddress {
        RegisterAddress::StatusClear
    }
}

impl TryFrom<u8> for StatusClear {
    type Error = LibraryError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Ok(Self {
            interrupt: is_bit_set(raw, 1),
            pixel_overflow: is_bit_set(raw, 2),
            thermistor_overflow: is_bit_set(raw, 3),
        })
    }
}

impl From<StatusClear> for u8 {
    fn from(register: StatusClear) -> Self {
        ((register.interrupt as u8) << 1)
            | ((register.pixel_overflow as u8) << 2)
            | ((register.thermistor_overflow as u8) << 3)
    }
}

/// The average register (0x07).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Average {
    /// Output twice the moving average. Bit 5.
    pub(crate) moving_average_mode: bool,
}

impl Average {
    pub fn moving_average_mode(&self) -> bool {
        self.moving_average_mode
    }

    pub fn set_moving_average_mode(&mut self, enabled: bool) {
        self.moving_average_mode = enabled;
    }
}

impl Register for Average {
    fn write_mask() -> u8 {
        0x20
    }

    fn address() -> RegisterAddress {
        RegisterAddress::Average
    }
}

impl TryFrom<u8> for Average {
    type Error = LibraryError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Ok(Self {
            moving_average_mode: is_bit_set(raw, 5),
        })
    }
}

impl From<Average> for u8 {
    fn from(register: Average) -> Self {
        (register.moving_average_mode as u8) << 5
    }
}

/// The three interrupt levels, each stored across a pair of registers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LevelKind {
    /// Interrupts trigger above this level.
    Upper,

    /// Interrupts trigger below this level.
    Lower,

    Hysteresis,
}

impl LevelKind {
    /// The registers holding the (bits 0-7, bits 8-11) of this level.
    pub fn registers(&self) -> (RegisterAddress, RegisterAddress) {
        match self {
            Self::Upper => (
                RegisterAddress::InterruptHighLow,
                RegisterAddress::InterruptHighHigh,
            ),
            Self::Lower => (
                RegisterAddress::InterruptLowLow,
                RegisterAddress::InterruptLowHigh,
            ),
            Self::Hysteresis => (
                RegisterAddress::HysteresisLow,
                RegisterAddress::HysteresisHigh,
            ),
        }
    }
}

/// A raw interrupt level, clamped to ±4095.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptLevel(i16);

impl InterruptLevel {
    /// Create a level from a raw value, clamping it to the range the registers accept.
    pub fn from_raw(raw: i32) -> Self {
        Self(raw.clamp(MIN_LEVEL as i32, MAX_LEVEL as i32) as i16)
    }

    /// Create a level from a temperature in degrees Celsius.
    pub fn from_celsius<F: Num>(temperature: F) -> Self {
        Self(celsius_to_raw_level(temperature))
    }

    pub fn raw(&self) -> i16 {
        self.0
    }

    /// Bits 0-7 of the level.
    pub fn low_byte(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Bits 8-11 of the level.
    pub fn high_nibble(&self) -> u8 {
        ((self.0 >> 8) & 0x0F) as u8
    }
}

/// The per-pixel interrupt flags (0x10-0x17).
///
/// Each bit represents a pixel, with the least significant bit of the first byte being the first
/// pixel.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct InterruptTable {
    flags: BitArray<[u8; INTERRUPT_TABLE_LENGTH], Lsb0>,
}

impl InterruptTable {
    pub fn from_bytes(bytes: [u8; INTERRUPT_TABLE_LENGTH]) -> Self {
        Self {
            flags: BitArray::new(bytes),
        }
    }

    /// The raw bytes as read from the sensor.
    pub fn as_bytes(&self) -> [u8; INTERRUPT_TABLE_LENGTH] {
        self.flags.into_inner()
    }

    /// Check if the pixel at the given row and column (both 0-indexed) has triggered an
    /// interrupt.
    ///
    /// Out of range coordinates are never triggered.
    pub fn is_triggered(&self, row: usize, column: usize) -> bool {
        if row >= HEIGHT || column >= WIDTH {
            false
        } else {
            self.flags[row * WIDTH + column]
        }
    }

    /// Check if any pixel has triggered an interrupt.
    pub fn any(&self) -> bool {
        self.flags.any()
    }

    /// The number of pixels that have triggered an interrupt.
    pub fn count(&self) -> usize {
        self.flags.count_ones()
    }

    /// The (row, column) coordinates of every pixel that has triggered an interrupt, ordered by
    /// row then column.
    pub fn triggered(&self) -> ArrayVec<(usize, usize), NUM_PIXELS> {
        self.flags
            .iter_ones()
            .map(|index| (index / WIDTH, index % WIDTH))
            .collect()
    }
}
