//! Protocol constants for the Cypress USB-Serial bridge.
//!
//! These constants define the USB identifiers and vendor request codes of
//! the bridge's I2C interface. Most users should not need to use these
//! directly.

// ---- Vendor ID and known Product IDs ----

/// Cypress Semiconductor vendor ID.
pub const CYPRESS_VID: u16 = 0x04B4;

/// Known USB-Serial bridge product IDs.
pub mod pid {
    /// CY7C65211 / CYUSBS23x factory default (single-channel USB-Serial).
    pub const USB_SERIAL: u16 = 0x0004;
}

/// Interface subclass of the bridge's vendor-class I2C interface.
pub const I2C_SUBCLASS: u8 = 3;

// ---- I2C vendor request codes ----

/// Start an I2C write; the payload follows on the bulk OUT endpoint.
pub(crate) const I2C_WRITE_REQUEST: u8 = 0xC6;
/// Start an I2C read; the data arrives on the bulk IN endpoint.
pub(crate) const I2C_READ_REQUEST: u8 = 0xC7;
/// Read the 3-byte I2C status word.
pub(crate) const I2C_GET_STATUS_REQUEST: u8 = 0xC8;
/// Reset the I2C read or write state machine.
pub(crate) const I2C_RESET_REQUEST: u8 = 0xC9;

// ---- Reset sub-commands (wValue of I2C_RESET_REQUEST) ----

/// Reset the read state machine.
pub(crate) const I2C_RESET_READ: u16 = 0;
/// Reset the write state machine.
pub(crate) const I2C_RESET_WRITE: u16 = 1;

// ---- Status / completion ----

/// Length of the status word and of the interrupt completion report.
pub const I2C_STATUS_LEN: usize = 3;

/// Busy/error flag in byte 0 of the status word.
pub(crate) const I2C_STATUS_BUSY: u8 = 0x01;

// ---- Value field layout ----

/// START condition flag in the command value field.
pub(crate) const I2C_CTRL_START: u16 = 1 << 0;
/// STOP condition flag in the command value field.
pub(crate) const I2C_CTRL_STOP: u16 = 1 << 1;
/// Bit offset of the 7-bit slave address in the command value field.
pub(crate) const I2C_CTRL_ADDR_SHIFT: u16 = 8;

/// Highest valid 7-bit I2C slave address.
pub const I2C_MAX_ADDRESS: u8 = 0x7F;
