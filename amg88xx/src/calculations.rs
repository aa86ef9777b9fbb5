// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Conversions between the sensor's fixed-point values and temperatures.
//!
//! The AMG88xx reports everything as 12-bit fixed-point numbers spread across two little endian
//! bytes. The thermistor is always in signed-magnitude form (bit 11 is the sign, bits 0-10 the
//! magnitude), while the pixels are two's complement on current hardware. Some earlier boards
//! (and drivers written for them) treated the pixels as signed-magnitude as well, so the pixel
//! encoding is selectable with [`PixelEncoding`]. The two encodings agree for positive values and
//! disagree for *every* negative value.
use crate::common::NUM_PIXELS;
use crate::util::{i16_from_bits, Buffer, Num};

/// The largest raw interrupt level that will be written to the sensor.
pub const MAX_LEVEL: i16 = 4095;

/// The smallest raw interrupt level that will be written to the sensor.
pub const MIN_LEVEL: i16 = -4095;

/// The number of significant bits in a pixel or thermistor value.
const VALUE_BITS: u8 = 12;

/// How the 12-bit pixel values are encoded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelEncoding {
    /// Two's complement, as documented in the current datasheet. This is the default.
    TwosComplement,

    /// Signed magnitude, the same encoding the thermistor uses.
    SignedMagnitude,
}

impl PixelEncoding {
    /// Decode the low 12 bits of a raw word to a signed integer.
    pub fn decode_raw(&self, word: u16) -> i16 {
        match self {
            Self::TwosComplement => twos_complement_12(word),
            Self::SignedMagnitude => signed_magnitude_12(word),
        }
    }

    /// Decode the low 12 bits of a raw word to a float, *without* scaling to a temperature.
    pub fn decode<F: Num>(&self, word: u16) -> F {
        F::coerce_from(self.decode_raw(word))
    }
}

impl Default for PixelEncoding {
    fn default() -> Self {
        Self::TwosComplement
    }
}

/// Decode a 12-bit signed-magnitude value.
///
/// Bits 0-10 are the magnitude, bit 11 is set for negative values. The upper four bits are
/// ignored.
pub fn signed_magnitude_12(word: u16) -> i16 {
    let magnitude = (word & 0x07FF) as i16;
    if word & 0x0800 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Decode a 12-bit two's complement value by sign extending it to 16 bits.
///
/// The upper four bits are ignored.
pub fn twos_complement_12(word: u16) -> i16 {
    i16_from_bits(word, VALUE_BITS)
}

/// [`signed_magnitude_12`], converted to a float.
pub fn decode_signed_magnitude_12<F: Num>(word: u16) -> F {
    F::coerce_from(signed_magnitude_12(word))
}

/// [`twos_complement_12`], converted to a float.
pub fn decode_twos_complement_12<F: Num>(word: u16) -> F {
    F::coerce_from(twos_complement_12(word))
}

/// Convert a raw thermistor word to degrees Celsius.
pub fn raw_thermistor_to_celsius<F: Num>(word: u16) -> F {
    decode_signed_magnitude_12::<F>(word) * F::THERMISTOR_RESOLUTION
}

/// Convert a raw pixel word to degrees Celsius.
pub fn raw_pixel_to_celsius<F: Num>(word: u16, encoding: PixelEncoding) -> F {
    encoding.decode::<F>(word) * F::PIXEL_RESOLUTION
}

/// Convert little endian pixel data from the sensor into temperatures.
///
/// Pixels are converted until either `pixel_bytes` or `destination` runs out (a trailing odd byte
/// is ignored), and the number of pixels converted is returned.
pub fn raw_pixels_to_temperatures<F: Num>(
    pixel_bytes: &[u8],
    encoding: PixelEncoding,
    destination: &mut [F],
) -> usize {
    let count = (pixel_bytes.len() / 2).min(destination.len()).min(NUM_PIXELS);
    let mut pixel_bytes = pixel_bytes;
    for temperature in destination[..count].iter_mut() {
        *temperature = raw_pixel_to_celsius(pixel_bytes.get_u16_le(), encoding);
    }
    count
}

/// Convert a temperature (in ℃) to the raw value used by the interrupt level registers.
///
/// The value is truncated towards zero, then clamped to ±4095.
pub fn celsius_to_raw_level<F: Num>(temperature: F) -> i16 {
    let raw = (temperature / F::PIXEL_RESOLUTION).truncate();
    raw.clamp(MIN_LEVEL as i32, MAX_LEVEL as i32) as i16
}

/// The hysteresis used when one isn't given explicitly, 95% of the upper level.
///
/// Calculated as `high - high / 20` so that round values stay exact in both `f32` and `f64`. For
/// `f32` levels the raw hysteresis is the same as multiplying by 0.95 in double precision and
/// rounding back to `f32`, *not* the same as `high * 0.95f32`, which truncates one step lower for
/// a few levels (-1014.7368 ℃ for example).
pub fn default_hysteresis<F: Num>(high: F) -> F {
    high - high / F::TWENTY
}
