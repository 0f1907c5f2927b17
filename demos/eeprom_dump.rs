//! EEPROM write and dump example.
//!
//! Writes the bytes 0..31 at address 0x3FE0 of a 24C128/24C256 EEPROM at
//! slave address 0x51, then dumps the first lines of its contents.
//!
//! Usage: cargo run --example eeprom_dump [lines]
//!
//! Set `RUST_LOG=debug` to trace every bridge command.

use std::time::Duration;

use cyusb_i2c::{BridgeConfig, DeviceFilter, I2cBridge, I2cEeprom};

/// EEPROM slave address (A0 = 1, A1 = A2 = 0).
const EEPROM_ADDR: u8 = 0x51;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let lines: u32 = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 16,
    };

    println!("Opening USB-Serial bridge...");
    let mut bridge = I2cBridge::open(&DeviceFilter::default(), BridgeConfig::default().verbose(true))?;
    println!("Endpoints: {:?}", bridge.transport().endpoints());

    let eeprom = I2cEeprom::new(EEPROM_ADDR, 2)?;

    let data: Vec<u8> = (0..32).collect();
    eeprom.write(&mut bridge, 0x3FE0, &data)?;
    println!("Wrote {} bytes at 0x3FE0", data.len());

    // Let the EEPROM finish its internal write cycle
    std::thread::sleep(Duration::from_millis(10));

    for line in eeprom.dump(&mut bridge, lines) {
        println!("{}", line?);
    }

    Ok(())
}
