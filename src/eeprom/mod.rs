//! Byte-addressable I2C memory devices (24Cxx-style EEPROMs).
//!
//! An [`I2cEeprom`] describes one memory chip on the bus: its slave address,
//! the width of its internal address pointer, and the framing used for each
//! phase. It holds no connection state; every access borrows the
//! [`I2cBridge`] it runs on, so any number of views can share one adapter.
//!
//! - A write is a single bus transaction: the big-endian memory address
//!   followed by the data, in one bulk payload.
//! - A read is the random-read idiom: reset the adapter, write the address
//!   with the bus left open, then read the data with a repeated START.
//!
//! # Example
//!
//! ```no_run
//! use cyusb_i2c::{BridgeConfig, DeviceFilter, I2cBridge, I2cEeprom};
//!
//! let mut bridge = I2cBridge::open(&DeviceFilter::default(), BridgeConfig::default())?;
//! let eeprom = I2cEeprom::new(0x51, 2)?;
//!
//! eeprom.write(&mut bridge, 0x3FE0, &[0xDE, 0xAD])?;
//! for line in eeprom.dump(&mut bridge, 4) {
//!     println!("{}", line?);
//! }
//! # Ok::<(), cyusb_i2c::Error>(())
//! ```

mod dump;

pub use dump::{Dump, DumpLine, DUMP_LINE_LEN};

use crate::bridge::I2cBridge;
use crate::constants::I2C_MAX_ADDRESS;
use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::types::Framing;

/// A memory device addressed through an [`I2cBridge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cEeprom {
    address: u8,
    address_width: u8,
    write_framing: Framing,
    read_framing: Framing,
}

impl I2cEeprom {
    /// Describe a device at the 7-bit slave `address` whose memory address
    /// is `address_width` bytes wide (1 to 4).
    ///
    /// Writes default to [`Framing::OPEN`] and reads to [`Framing::CLOSED`].
    pub fn new(address: u8, address_width: u8) -> Result<Self> {
        if address > I2C_MAX_ADDRESS {
            return Err(Error::InvalidArgument(
                "I2C address must be 7-bit (0x00-0x7F)",
            ));
        }
        if !(1..=4).contains(&address_width) {
            return Err(Error::InvalidArgument(
                "address width must be between 1 and 4 bytes",
            ));
        }
        Ok(Self {
            address,
            address_width,
            write_framing: Framing::OPEN,
            read_framing: Framing::CLOSED,
        })
    }

    /// Override the framing of the write and address phases.
    pub fn with_write_framing(mut self, framing: Framing) -> Self {
        self.write_framing = framing;
        self
    }

    /// Override the framing of the data read phase.
    pub fn with_read_framing(mut self, framing: Framing) -> Self {
        self.read_framing = framing;
        self
    }

    /// The 7-bit slave address.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Width of the memory address in bytes.
    pub fn address_width(&self) -> u8 {
        self.address_width
    }

    /// Framing of the write and address phases.
    pub fn write_framing(&self) -> Framing {
        self.write_framing
    }

    /// Framing of the data read phase.
    pub fn read_framing(&self) -> Framing {
        self.read_framing
    }

    /// Size of the addressable space: `256^address_width` bytes.
    pub fn capacity(&self) -> u64 {
        1u64 << (8 * self.address_width as u32)
    }

    /// Reject accesses running past the end of the address space.
    ///
    /// A zero-length access is checked as if it touched `start` alone.
    pub fn check_range(&self, start: u32, length: usize) -> Result<()> {
        let end = start as u64 + length.max(1) as u64;
        if end > self.capacity() {
            return Err(Error::AddressOutOfRange {
                start,
                length,
                capacity: self.capacity(),
            });
        }
        Ok(())
    }

    /// The memory address as sent on the wire: big-endian, exactly
    /// `address_width` bytes.
    ///
    /// Only the low `address_width` bytes of `start` are kept, so an address
    /// beyond [`capacity`](Self::capacity) wraps. Run
    /// [`check_range`](Self::check_range) first; [`write`](Self::write) and
    /// [`read`](Self::read) do.
    pub fn address_prefix(&self, start: u32) -> Vec<u8> {
        let bytes = start.to_be_bytes();
        bytes[bytes.len() - self.address_width as usize..].to_vec()
    }

    /// Write `data` starting at memory address `start`.
    ///
    /// Issues exactly one bridge write. The range is checked before any
    /// USB traffic.
    pub fn write<T: Transport>(
        &self,
        bridge: &mut I2cBridge<T>,
        start: u32,
        data: &[u8],
    ) -> Result<()> {
        self.check_range(start, data.len())?;

        let mut payload = self.address_prefix(start);
        payload.extend_from_slice(data);
        bridge.write(self.address, &payload, self.write_framing)
    }

    /// Read `length` bytes starting at memory address `start`.
    ///
    /// Resets the adapter, then issues the address phase (a bridge write)
    /// and the data phase (a bridge read). The range is checked before any
    /// USB traffic.
    pub fn read<T: Transport>(
        &self,
        bridge: &mut I2cBridge<T>,
        start: u32,
        length: usize,
    ) -> Result<Vec<u8>> {
        if length == 0 {
            return Err(Error::InvalidArgument("read length must not be zero"));
        }
        self.check_range(start, length)?;

        bridge.reset()?;
        bridge.write(self.address, &self.address_prefix(start), self.write_framing)?;
        bridge.read(self.address, length, self.read_framing)
    }

    /// Iterate over the first `lines` blocks of [`DUMP_LINE_LEN`] bytes.
    ///
    /// Each block is fetched with [`read`](Self::read) only when the
    /// iterator is advanced.
    pub fn dump<'b, T: Transport>(&self, bridge: &'b mut I2cBridge<T>, lines: u32) -> Dump<'b, T> {
        Dump::new(*self, bridge, lines)
    }
}
