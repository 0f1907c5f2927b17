//! Pure Rust I2C master driver for Cypress USB-Serial bridges.
//!
//! This crate drives the I2C function of the Cypress CY7C652xx /
//! CYUSBS23x USB-Serial bridge family. It uses
//! [nusb](https://crates.io/crates/nusb) as the USB backend, so no C
//! dependencies or `libusb` are required.
//!
//! # Quick Start
//!
//! ```no_run
//! use cyusb_i2c::{BridgeConfig, DeviceFilter, I2cBridge, I2cEeprom};
//!
//! // Open the first bridge with the factory VID/PID
//! let mut bridge = I2cBridge::open(&DeviceFilter::default(), BridgeConfig::default())?;
//!
//! // 24C256-style EEPROM at 0x51 with a 2-byte address pointer
//! let eeprom = I2cEeprom::new(0x51, 2)?;
//! eeprom.write(&mut bridge, 0x0000, b"hello")?;
//! let data = eeprom.read(&mut bridge, 0x0000, 5)?;
//! # Ok::<(), cyusb_i2c::Error>(())
//! ```
//!
//! # Features
//!
//! - **Transaction engine**: [`I2cBridge`] issues the adapter's reset,
//!   status, write and read commands in the required order and waits for
//!   each completion report.
//! - **Memory devices**: [`I2cEeprom`] composes random reads and addressed
//!   writes for EEPROMs with 1- to 4-byte addressing, with range checks
//!   ahead of any bus traffic.
//! - **Pluggable transport**: [`Transport`] abstracts the USB primitives;
//!   [`MockTransport`] records calls for testing without hardware.
//! - **`embedded-hal`**: with the `embedded-hal` feature, [`I2cBridge`]
//!   implements `embedded_hal::i2c::I2c`.

mod bridge;
pub mod constants;
pub mod device_info;
pub mod eeprom;
pub mod error;
pub mod events;
#[cfg(feature = "embedded-hal")]
pub mod hal;
pub mod transport;
pub mod types;

// ---- Convenience re-exports ----

pub use bridge::{BridgeConfig, I2cBridge};
pub use constants::CYPRESS_VID;
pub use device_info::{find_device, find_devices, DeviceFilter};
pub use eeprom::{DumpLine, I2cEeprom};
pub use error::{Error, Result};
pub use events::{BridgeEvent, BridgeObserver, LogObserver};
pub use transport::{MockTransport, Transport, TransportOp, UsbTransport};
pub use types::*;
