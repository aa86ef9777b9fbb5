// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c;
use paste::paste;

use crate::address::RegisterAddress;
use crate::calculations::*;
use crate::common::*;
use crate::error::Error;
use crate::register::*;
use crate::util::{log, Buffer, Num};

/// DRY macro for the set_* methods in `Amg88xx` that modify a register field.
///
/// The new register value is only cached once the write has succeeded. Most of the fields are
/// boolean values, so that's the default type. Otherwise, add the type in before the docstring.
macro_rules! set_register_field {
    { $register:ident, $field:ident, $doc:literal } => {
        set_register_field! {
            $register,
            $field,
            bool,
            $doc
        }
    };
    { $register:ident, $field:ident, $typ:ty, $doc:literal } => {
    paste! {
        #[doc = $doc]
        pub fn [< set_ $field >](&mut self, new_value: $typ) -> Result<(), Error<I2C>> {
            let mut updated = self.$register;
            updated.[< set_ $field >](new_value);
            write_register(&mut self.bus, self.address, updated)?;
            self.$register = updated;
            Ok(())
        }
    }};
}

/// A driver for the Panasonic AMG88xx (Grid-EYE) 8x8 thermal sensors.
///
/// The sensor's control registers are never read back. Instead the driver keeps an image of each
/// one and writes the whole byte whenever a field changes, so the getters here are free.
#[derive(Clone, Debug)]
pub struct Amg88xx<I2C> {
    /// The I²C bus this sensor is accessible on.
    bus: I2C,

    /// The I²C address this sensor is accessible at.
    address: u8,

    /// How pixel values are decoded.
    pixel_encoding: PixelEncoding,

    /// The largest read performed in a single transaction.
    max_transfer: usize,

    power_control: PowerControl,

    /// The last reset issued.
    reset: Reset,

    frame_rate_control: FrameRateControl,

    average: Average,

    interrupt_control: InterruptControl,

    /// Buffer for reading pixel data off of the sensor.
    pixel_buffer: [u8; PIXEL_BYTES],
}

impl<I2C> Amg88xx<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    /// Bring up the sensor at the given address with the default configuration.
    ///
    /// The sensor is set to normal mode, reset, has interrupts disabled and is set to 10 FPS.
    /// `delay` is used to wait for the sensor to settle afterwards.
    pub fn new<D>(bus: I2C, address: u8, delay: &mut D) -> Result<Self, Error<I2C>>
    where
        D: DelayMs<u8>,
    {
        Self::new_with_config(bus, Config::new(address), delay)
    }

    /// Bring up a sensor using the given configuration.
    ///
    /// If nothing acknowledges the first write (setting normal mode) the error is returned
    /// immediately and nothing else is written.
    pub fn new_with_config<D>(bus: I2C, config: Config, delay: &mut D) -> Result<Self, Error<I2C>>
    where
        D: DelayMs<u8>,
    {
        config.validate()?;
        let mut sensor = Self {
            bus,
            address: config.address,
            pixel_encoding: config.pixel_encoding,
            max_transfer: config.max_transfer,
            power_control: PowerControl::new(PowerMode::Normal),
            reset: Reset::new(ResetKind::Initial),
            frame_rate_control: FrameRateControl::new(config.frame_rate),
            average: Average::default(),
            interrupt_control: InterruptControl::default(),
            pixel_buffer: [0u8; PIXEL_BYTES],
        };
        sensor.power_up(delay)?;
        Ok(sensor)
    }

    fn power_up<D: DelayMs<u8>>(&mut self, delay: &mut D) -> Result<(), Error<I2C>> {
        log!(debug, "Starting AMG88xx at {=u8:#x}", self.address);
        // Normal mode goes first as it doubles as the presence check.
        if let Err(err) = write_register(&mut self.bus, self.address, self.power_control) {
            log!(warn, "No AMG88xx responded at {=u8:#x}", self.address);
            return Err(err);
        }
        write_register(&mut self.bus, self.address, self.reset)?;
        write_register(&mut self.bus, self.address, self.interrupt_control)?;
        write_register(&mut self.bus, self.address, self.frame_rate_control)?;
        delay.delay_ms(SETTLING_DELAY_MS);
        log!(info, "AMG88xx at {=u8:#x} ready", self.address);
        Ok(())
    }

    /// The I²C address of this sensor.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// How pixel values are being decoded. Set when the driver is created.
    pub fn pixel_encoding(&self) -> PixelEncoding {
        self.pixel_encoding
    }

    /// The largest number of bytes read in one transaction.
    pub fn max_transfer(&self) -> usize {
        self.max_transfer
    }

    /// The current power mode. The driver always starts in [normal mode][PowerMode::Normal].
    pub fn power_mode(&self) -> PowerMode {
        self.power_control.power_mode()
    }

    set_register_field! {
        power_control,
        power_mode,
        PowerMode,
        "Change the sensor's power mode."
    }

    /// The current frame rate.
    pub fn frame_rate(&self) -> FrameRate {
        self.frame_rate_control.frame_rate()
    }

    set_register_field! {
        frame_rate_control,
        frame_rate,
        FrameRate,
        "Set the sensor's frame rate."
    }

    /// Check if the sensor is outputting the twice moving average.
    pub fn moving_average_mode(&self) -> bool {
        self.average.moving_average_mode()
    }

    set_register_field! {
        average,
        moving_average_mode,
        "Enable (or disable) the twice moving average output mode."
    }

    /// Check if the INT pin is enabled.
    pub fn interrupt_enabled(&self) -> bool {
        self.interrupt_control.interrupt_enabled()
    }

    set_register_field! {
        interrupt_control,
        interrupt_enabled,
        "Enable (or disable) the INT pin."
    }

    /// Enable the INT pin, leaving the interrupt mode as is.
    pub fn enable_interrupt(&mut self) -> Result<(), Error<I2C>> {
        self.set_interrupt_enabled(true)
    }

    /// Disable the INT pin, leaving the interrupt mode as is.
    pub fn disable_interrupt(&mut self) -> Result<(), Error<I2C>> {
        self.set_interrupt_enabled(false)
    }

    /// How pixels are compared with the interrupt levels.
    ///
    /// The default is [difference mode][InterruptMode::Difference].
    pub fn interrupt_mode(&self) -> InterruptMode {
        self.interrupt_control.interrupt_mode()
    }

    set_register_field! {
        interrupt_control,
        interrupt_mode,
        InterruptMode,
        "Set how pixels are compared with the interrupt levels."
    }

    /// The last reset the driver issued.
    pub fn last_reset(&self) -> ResetKind {
        self.reset.kind()
    }

    /// Set the upper and lower interrupt levels (in ℃), with the hysteresis at 95% of `high`.
    pub fn set_interrupt_levels<F: Num>(&mut self, high: F, low: F) -> Result<(), Error<I2C>> {
        self.set_interrupt_levels_with_hysteresis(high, low, default_hysteresis(high))
    }

    /// Set the upper and lower interrupt levels as well as the hysteresis, all in ℃.
    ///
    /// Each value is truncated to the sensor's 0.25 ℃ resolution and clamped to ±4095 steps
    /// (about ±1024 ℃). All six registers are written, upper level first.
    pub fn set_interrupt_levels_with_hysteresis<F: Num>(
        &mut self,
        high: F,
        low: F,
        hysteresis: F,
    ) -> Result<(), Error<I2C>> {
        self.set_interrupt_level(LevelKind::Upper, InterruptLevel::from_celsius(high))?;
        self.set_interrupt_level(LevelKind::Lower, InterruptLevel::from_celsius(low))?;
        self.set_interrupt_level(
            LevelKind::Hysteresis,
            InterruptLevel::from_celsius(hysteresis),
        )
    }

    /// Write a single interrupt level.
    pub fn set_interrupt_level(
        &mut self,
        kind: LevelKind,
        level: InterruptLevel,
    ) -> Result<(), Error<I2C>> {
        let (low_register, high_register) = kind.registers();
        log!(trace, "Setting {} level to {=i16}", kind, level.raw());
        write_raw_register(&mut self.bus, self.address, low_register, level.low_byte())
            .map_err(Error::I2cWriteError)?;
        write_raw_register(
            &mut self.bus,
            self.address,
            high_register,
            level.high_nibble(),
        )
        .map_err(Error::I2cWriteError)
    }

    /// Copy the raw interrupt table into `destination`.
    ///
    /// At most 8 bytes are read (one bit per pixel, first pixel in the LSB of the first byte), and
    /// the number of bytes copied is returned.
    pub fn interrupt_flags(&mut self, destination: &mut [u8]) -> Result<usize, Error<I2C>> {
        let count = destination.len().min(INTERRUPT_TABLE_LENGTH);
        self.read(RegisterAddress::InterruptTable, &mut destination[..count])?;
        Ok(count)
    }

    /// Read the interrupt table.
    pub fn interrupt_table(&mut self) -> Result<InterruptTable, Error<I2C>> {
        let mut flags = [0u8; INTERRUPT_TABLE_LENGTH];
        self.read(RegisterAddress::InterruptTable, &mut flags)?;
        Ok(InterruptTable::from_bytes(flags))
    }

    /// Clear the interrupt flag, the status register and the interrupt table.
    ///
    /// This is a flag reset, the control registers are untouched.
    pub fn clear_interrupt(&mut self) -> Result<(), Error<I2C>> {
        let register = Reset::new(ResetKind::Flag);
        write_register(&mut self.bus, self.address, register)?;
        self.reset = register;
        Ok(())
    }

    /// Read the status register.
    pub fn status(&mut self) -> Result<Status, Error<I2C>> {
        read_register(&mut self.bus, self.address)
    }

    /// Clear individual status flags.
    pub fn clear_status(&mut self, flags: StatusClear) -> Result<(), Error<I2C>> {
        write_register(&mut self.bus, self.address, flags)
    }

    /// Read the raw value of the on-board thermistor.
    pub fn read_thermistor_raw(&mut self) -> Result<u16, Error<I2C>> {
        let mut raw = [0u8; THERMISTOR_BYTES];
        self.read(RegisterAddress::ThermistorLow, &mut raw)?;
        Ok(u16::from_le_bytes(raw))
    }

    /// Read the temperature of the on-board thermistor, in ℃.
    pub fn read_thermistor<F: Num>(&mut self) -> Result<F, Error<I2C>> {
        Ok(raw_thermistor_to_celsius(self.read_thermistor_raw()?))
    }

    fn load_pixels(&mut self, count: usize) -> Result<&[u8], Error<I2C>> {
        let byte_count = count * 2;
        read_block(
            &mut self.bus,
            self.address,
            RegisterAddress::PixelBase.as_raw(),
            &mut self.pixel_buffer[..byte_count],
            self.max_transfer,
        )
        .map_err(Error::I2cWriteReadError)?;
        Ok(&self.pixel_buffer[..byte_count])
    }

    /// Read pixel temperatures (in ℃) into `destination`, in row-major order.
    ///
    /// At most 64 pixels are read, starting from the first pixel, and the number of pixels read is
    /// returned. An empty `destination` does not touch the bus.
    pub fn read_pixels<F: Num>(&mut self, destination: &mut [F]) -> Result<usize, Error<I2C>> {
        let count = destination.len().min(NUM_PIXELS);
        if count == 0 {
            return Ok(0);
        }
        let encoding = self.pixel_encoding;
        let pixel_bytes = self.load_pixels(count)?;
        Ok(raw_pixels_to_temperatures(pixel_bytes, encoding, destination))
    }

    /// Read the raw pixel words into `destination`.
    ///
    /// The same limits as [`read_pixels`][Amg88xx::read_pixels] apply.
    pub fn read_pixels_raw(&mut self, destination: &mut [u16]) -> Result<usize, Error<I2C>> {
        let count = destination.len().min(NUM_PIXELS);
        if count == 0 {
            return Ok(0);
        }
        let mut pixel_bytes = self.load_pixels(count)?;
        for word in destination[..count].iter_mut() {
            *word = pixel_bytes.get_u16_le();
        }
        Ok(count)
    }

    /// Read a full frame of pixel temperatures (in ℃).
    pub fn read_image<F: Num>(&mut self) -> Result<[F; NUM_PIXELS], Error<I2C>> {
        let mut image = [F::ZERO; NUM_PIXELS];
        self.read_pixels(&mut image)?;
        Ok(image)
    }

    /// The height of the thermal image, in pixels.
    pub fn height(&self) -> usize {
        HEIGHT
    }

    /// The width of the thermal image, in pixels.
    pub fn width(&self) -> usize {
        WIDTH
    }

    /// Release the I²C bus.
    pub fn destroy(self) -> I2C {
        self.bus
    }

    fn read(&mut self, start: RegisterAddress, buffer: &mut [u8]) -> Result<(), Error<I2C>> {
        read_block(
            &mut self.bus,
            self.address,
            start.as_raw(),
            buffer,
            self.max_transfer,
        )
        .map_err(Error::I2cWriteReadError)
    }
}

/// Read consecutive registers into `buffer`, at most `max_transfer` bytes at a time.
///
/// Each chunk is a separate write-read transaction starting at the register following the last
/// chunk, so `ceil(buffer.len() / max_transfer)` transactions are performed. `max_transfer` must
/// not be zero.
pub(crate) fn read_block<I2C: i2c::WriteRead>(
    bus: &mut I2C,
    i2c_address: u8,
    start: u8,
    buffer: &mut [u8],
    max_transfer: usize,
) -> Result<(), I2C::Error> {
    for (index, chunk) in buffer.chunks_mut(max_transfer).enumerate() {
        let register = start.wrapping_add((index * max_transfer) as u8);
        log!(
            trace,
            "Reading {=usize} bytes from {=u8:#x}",
            chunk.len(),
            register
        );
        bus.write_read(i2c_address, &[register], chunk)?;
    }
    Ok(())
}

fn read_register<R, I2C>(bus: &mut I2C, address: u8) -> Result<R, Error<I2C>>
where
    I2C: i2c::WriteRead + i2c::Write,
    R: Register,
{
    let mut register_value = [0u8; 1];
    bus.write_read(address, &[R::address().as_raw()], &mut register_value)
        .map_err(Error::I2cWriteReadError)?;
    Ok(R::try_from(register_value[0])?)
}

fn write_register<R, I2C>(bus: &mut I2C, address: u8, register: R) -> Result<(), Error<I2C>>
where
    I2C: i2c::Write + i2c::WriteRead,
    R: Register,
{
    let register_value: u8 = register.into();
    write_raw_register(
        bus,
        address,
        R::address(),
        register_value & R::write_mask(),
    )
    .map_err(Error::I2cWriteError)
}

fn write_raw_register<I2C: i2c::Write>(
    bus: &mut I2C,
    i2c_address: u8,
    register_address: RegisterAddress,
    register_data: u8,
) -> Result<(), I2C::Error> {
    bus.write(i2c_address, &[register_address.as_raw(), register_data])
}
