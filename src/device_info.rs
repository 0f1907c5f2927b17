//! Device discovery and enumeration.
//!
//! Use [`find_devices`] to list connected bridges, or [`DeviceFilter`]
//! for more precise matching by serial number, interface subclass, or
//! device index.

use nusb::{self, DeviceInfo, MaybeFuture};
use std::time::Duration;

use crate::constants::{pid, CYPRESS_VID, I2C_SUBCLASS};
use crate::error::{Error, Result};

/// Filtering criteria for finding a USB-Serial bridge.
///
/// # Example
///
/// ```no_run
/// use cyusb_i2c::DeviceFilter;
///
/// let filter = DeviceFilter::new(0x04b4, 0x0004)
///     .serial("14A0B1C2")
///     .index(0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFilter {
    /// USB vendor ID to match.
    pub vendor_id: u16,
    /// USB product ID to match.
    pub product_id: u16,
    /// Interface subclass selecting the I2C function. Defaults to 3.
    pub subclass: u8,
    /// If set, match against the USB serial number string.
    pub serial: Option<String>,
    /// Select the Nth matching device (0-based). Defaults to 0.
    pub index: usize,
}

impl Default for DeviceFilter {
    fn default() -> Self {
        Self::new(CYPRESS_VID, pid::USB_SERIAL)
    }
}

impl DeviceFilter {
    /// Create a new filter matching the given vendor and product IDs.
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
            subclass: I2C_SUBCLASS,
            serial: None,
            index: 0,
        }
    }

    /// Select the interface by subclass.
    pub fn subclass(mut self, subclass: u8) -> Self {
        self.subclass = subclass;
        self
    }

    /// Require the serial number to match.
    pub fn serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    /// Select the Nth matching device (0-based).
    pub fn index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }
}

/// USB string descriptor read timeout.
const STRING_TIMEOUT: Duration = Duration::from_secs(1);

/// List all connected devices matching the given vendor and product IDs.
pub fn find_devices(vendor: u16, product: u16) -> Result<Vec<DeviceInfo>> {
    let devices: Vec<DeviceInfo> = nusb::list_devices()
        .wait()?
        .filter(|d| d.vendor_id() == vendor && d.product_id() == product)
        .collect();
    Ok(devices)
}

/// Find a single device matching the given filter criteria.
///
/// When a serial number is requested, each candidate is opened briefly to
/// read its string descriptor.
pub fn find_device(filter: &DeviceFilter) -> Result<DeviceInfo> {
    let mut match_count = 0usize;

    for dev_info in find_devices(filter.vendor_id, filter.product_id)? {
        if let Some(ref expected_serial) = filter.serial {
            let device = dev_info.open().wait()?;
            let desc = device.device_descriptor();
            let Some(idx) = desc.serial_number_string_index() else {
                continue;
            };
            let serial = device
                .get_string_descriptor(idx, 0x0409, STRING_TIMEOUT)
                .wait()
                .unwrap_or_default();
            if serial != *expected_serial {
                continue;
            }
        }

        if match_count == filter.index {
            return Ok(dev_info);
        }
        match_count += 1;
    }

    Err(Error::DeviceNotFound)
}
