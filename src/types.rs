//! Type definitions for bridge communication.
//!
//! These types model the wire-level pieces of the I2C command protocol:
//! start/stop framing, the command descriptor packed into a vendor control
//! transfer, and the adapter status word.

use std::fmt;

use crate::constants::*;
use crate::error::{Error, Result};

/// I2C start/stop framing for a single adapter command.
///
/// `start` emits a START (or repeated START) before the address byte;
/// `stop` releases the bus with a STOP after the last data byte. Leaving
/// `stop` clear keeps the bus claimed for a following command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Framing {
    /// Emit a START condition before the transfer.
    pub start: bool,
    /// Emit a STOP condition after the transfer.
    pub stop: bool,
}

impl Framing {
    /// START without STOP: the bus stays open for a following command.
    pub const OPEN: Self = Self {
        start: true,
        stop: false,
    };

    /// START and STOP: a self-contained transaction.
    pub const CLOSED: Self = Self {
        start: true,
        stop: true,
    };

    /// Create a framing from explicit start/stop flags.
    pub const fn new(start: bool, stop: bool) -> Self {
        Self { start, stop }
    }

    /// Wire encoding of the framing bits (low byte of the value field).
    pub(crate) fn wire_value(self) -> u16 {
        let mut v = 0;
        if self.start {
            v |= I2C_CTRL_START;
        }
        if self.stop {
            v |= I2C_CTRL_STOP;
        }
        v
    }
}

/// Transfer direction of an I2C command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Host to slave; payload goes out on the bulk OUT endpoint.
    Write,
    /// Slave to host; data comes back on the bulk IN endpoint.
    Read,
}

/// An I2C command as dispatched to the adapter in one vendor control
/// transfer.
///
/// The control transfer's `wValue` packs the slave address and framing as
/// `(address << 8) | (stop << 1) | start`; `wIndex` carries the number of
/// bytes that follow on the bulk endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct I2cCommand {
    address: u8,
    framing: Framing,
    length: u16,
    direction: Direction,
}

impl I2cCommand {
    /// Build a command, validating the address and transfer length.
    pub fn new(
        direction: Direction,
        address: u8,
        length: usize,
        framing: Framing,
    ) -> Result<Self> {
        if address > I2C_MAX_ADDRESS {
            return Err(Error::InvalidArgument(
                "I2C address must be 7-bit (0x00-0x7F)",
            ));
        }
        let length = u16::try_from(length)
            .map_err(|_| Error::InvalidArgument("transfer length exceeds 65535 bytes"))?;
        Ok(Self {
            address,
            framing,
            length,
            direction,
        })
    }

    /// The 7-bit slave address.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// The start/stop framing.
    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Number of payload bytes.
    pub fn length(&self) -> u16 {
        self.length
    }

    /// The transfer direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Vendor request code (`bRequest`).
    pub fn request(&self) -> u8 {
        match self.direction {
            Direction::Write => I2C_WRITE_REQUEST,
            Direction::Read => I2C_READ_REQUEST,
        }
    }

    /// Packed `wValue`: address in the high byte, framing in the low bits.
    pub fn value(&self) -> u16 {
        ((self.address as u16) << I2C_CTRL_ADDR_SHIFT) | self.framing.wire_value()
    }

    /// `wIndex`: the payload length.
    pub fn index(&self) -> u16 {
        self.length
    }

    /// Split a packed `wValue` back into address and framing.
    pub fn decode_value(value: u16) -> (u8, Framing) {
        let address = (value >> I2C_CTRL_ADDR_SHIFT) as u8 & I2C_MAX_ADDRESS;
        let framing = Framing {
            start: value & I2C_CTRL_START != 0,
            stop: value & I2C_CTRL_STOP != 0,
        };
        (address, framing)
    }
}

/// The 3-byte status word returned by the get-status request.
///
/// Only bit 0 of byte 0 has a defined meaning: when set the adapter is busy
/// or the previous transfer failed, and no new command may be issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceStatus {
    raw: [u8; I2C_STATUS_LEN],
}

impl DeviceStatus {
    /// Create from the raw status bytes.
    pub fn from_raw(raw: [u8; I2C_STATUS_LEN]) -> Self {
        Self { raw }
    }

    /// Parse from a control transfer reply, which must hold at least 3 bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let raw = data
            .get(..I2C_STATUS_LEN)
            .and_then(|s| <[u8; I2C_STATUS_LEN]>::try_from(s).ok())
            .ok_or(Error::ShortTransfer {
                expected: I2C_STATUS_LEN,
                actual: data.len(),
            })?;
        Ok(Self { raw })
    }

    /// The raw status bytes.
    pub fn raw(self) -> [u8; I2C_STATUS_LEN] {
        self.raw
    }

    /// The busy/error flag is set.
    pub fn is_busy(self) -> bool {
        self.raw[0] & I2C_STATUS_BUSY != 0
    }

    /// The adapter accepts a new command.
    pub fn is_ok(self) -> bool {
        !self.is_busy()
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}{:02x}{:02x}",
            self.raw[0], self.raw[1], self.raw[2]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_command_matches_usbmon_trace() {
        // Co s 40 c6 5101 0022: 34-byte write to 0x51, start only
        let cmd = I2cCommand::new(Direction::Write, 0x51, 34, Framing::OPEN).unwrap();
        assert_eq!(cmd.request(), 0xC6);
        assert_eq!(cmd.value(), 0x5101);
        assert_eq!(cmd.index(), 0x0022);
    }

    #[test]
    fn read_command_matches_usbmon_trace() {
        // Co s 40 c7 5103 0020: 32-byte read from 0x51, start and stop
        let cmd = I2cCommand::new(Direction::Read, 0x51, 32, Framing::CLOSED).unwrap();
        assert_eq!(cmd.request(), 0xC7);
        assert_eq!(cmd.value(), 0x5103);
        assert_eq!(cmd.index(), 0x0020);
    }

    #[test]
    fn stop_without_start() {
        let cmd = I2cCommand::new(Direction::Write, 0x50, 1, Framing::new(false, true)).unwrap();
        assert_eq!(cmd.value(), 0x5002);
        assert_eq!(
            I2cCommand::decode_value(0x5002),
            (0x50, Framing::new(false, true))
        );
    }

    #[test]
    fn rejects_8bit_address() {
        assert!(matches!(
            I2cCommand::new(Direction::Read, 0x80, 1, Framing::CLOSED),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_oversized_length() {
        assert!(I2cCommand::new(Direction::Write, 0x50, 0xFFFF, Framing::OPEN).is_ok());
        assert!(matches!(
            I2cCommand::new(Direction::Write, 0x50, 0x1_0000, Framing::OPEN),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn status_busy_bit() {
        assert!(DeviceStatus::from_raw([0x80, 0, 0]).is_ok());
        assert!(DeviceStatus::from_raw([0x20, 0, 0]).is_ok());
        assert!(DeviceStatus::from_raw([0x01, 0, 0]).is_busy());
        assert!(DeviceStatus::from_raw([0xA1, 0, 0]).is_busy());
        // Only byte 0 carries the flag
        assert!(DeviceStatus::from_raw([0x00, 0x01, 0x01]).is_ok());
    }

    #[test]
    fn status_short_reply() {
        assert!(matches!(
            DeviceStatus::from_bytes(&[0x80, 0x00]),
            Err(Error::ShortTransfer {
                expected: 3,
                actual: 2
            })
        ));
        let st = DeviceStatus::from_bytes(&[0xA0, 0x00, 0x00, 0xFF]).unwrap();
        assert_eq!(st.raw(), [0xA0, 0x00, 0x00]);
        assert_eq!(st.to_string(), "a00000");
    }
}
