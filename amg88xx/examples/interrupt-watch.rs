use std::env;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use anyhow::{bail, Context};
use linux_embedded_hal::{Delay, I2cdev};

use amg88xx::common::{NUM_PIXELS, WIDTH};
use amg88xx::{Amg88xx, InterruptMode};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 5 {
        bail!("Four arguments required: <I2C bus> <sensor address> <high level> <low level>");
    }
    let address: u8 = if let Some(hex_digits) = args[2].strip_prefix("0x") {
        u8::from_str_radix(hex_digits, 16)?
    } else {
        args[2].parse()?
    };
    let high: f32 = args[3].parse().context("The high level must be a number")?;
    let low: f32 = args[4].parse().context("The low level must be a number")?;
    let bus = I2cdev::new(Path::new(&args[1]))?;
    let mut sensor = Amg88xx::new(bus, address, &mut Delay)?;
    sensor.set_interrupt_mode(InterruptMode::AbsoluteValue)?;
    sensor.set_interrupt_levels(high, low)?;
    sensor.enable_interrupt()?;
    println!("Watching for pixels above {} ℃ or below {} ℃", high, low);
    loop {
        let status = sensor.status()?;
        if status.interrupt() {
            let table = sensor.interrupt_table()?;
            let mut temperatures = [0f32; NUM_PIXELS];
            sensor.read_pixels(&mut temperatures)?;
            println!("{} pixel(s) triggered:", table.count());
            for (row, column) in table.triggered() {
                println!(
                    "  ({}, {}): {:.2} ℃",
                    row,
                    column,
                    temperatures[row * WIDTH + column]
                );
            }
            sensor.clear_interrupt()?;
        }
        sleep(Duration::from_millis(100));
    }
}
