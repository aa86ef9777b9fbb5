use std::convert::TryFrom;
use std::env;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use anyhow::{anyhow, bail};
use linux_embedded_hal::{Delay, I2cdev};

use amg88xx::{Amg88xx, Config, FrameRate, PixelEncoding};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 || args.len() > 5 {
        bail!("Usage: <I2C bus> <sensor address> [frame rate] [signed-magnitude]");
    }
    let address = parse_address(&args[2])?;
    let mut config = Config::new(address);
    if let Some(frame_rate) = args.get(3) {
        config = config.with_frame_rate(FrameRate::try_from(frame_rate.parse::<u8>()?)?);
    }
    if args.get(4).map(String::as_str) == Some("signed-magnitude") {
        config = config.with_pixel_encoding(PixelEncoding::SignedMagnitude);
    }
    let bus = I2cdev::new(Path::new(&args[1]))?;
    let mut sensor = Amg88xx::new_with_config(bus, config, &mut Delay)?;
    let frame_period = Duration::from_secs_f32(1f32 / f32::from(sensor.frame_rate()));
    // The first frame after power-up can be stale, skip it.
    sleep(frame_period);
    let temperatures = sensor.read_image::<f32>()?;
    let ambient: f32 = sensor.read_thermistor()?;
    println!("Thermistor: {:4.2}", ambient);
    print_temperatures(&temperatures, sensor.width());
    println!();
    Ok(())
}

fn parse_address(arg: &str) -> anyhow::Result<u8> {
    let address = if let Some(hex_digits) = arg.strip_prefix("0x") {
        u8::from_str_radix(hex_digits, 16)?
    } else {
        arg.parse()?
    };
    if address > 0x7F {
        Err(anyhow!("{:#x} is not a 7-bit I²C address", address))
    } else {
        Ok(address)
    }
}

fn print_temperatures(temperatures: &[f32], width: usize) {
    for (count, temperature) in temperatures.iter().enumerate() {
        if count % width == 0 {
            println!();
        }
        print!("{:6.2}  ", temperature);
    }
}
