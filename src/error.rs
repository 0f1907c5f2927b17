//! Error types for the cyusb-i2c crate.

use crate::types::DeviceStatus;

/// The error type for bridge operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from the nusb USB layer.
    #[error("USB error: {0}")]
    Usb(#[from] nusb::Error),

    /// A USB transfer error.
    #[error("USB transfer error: {0}")]
    Transfer(#[from] nusb::transfer::TransferError),

    /// A USB transfer did not complete within the configured timeout.
    #[error("USB transfer timed out")]
    Timeout,

    /// No matching device was found.
    #[error("device not found")]
    DeviceNotFound,

    /// The device has no usable configuration.
    #[error("USB configuration not found")]
    ConfigurationMissing,

    /// No interface with the requested subclass exists.
    #[error("no interface with subclass {subclass} found")]
    InterfaceNotFound {
        /// The interface subclass that was searched for.
        subclass: u8,
    },

    /// The I2C interface lacks one of the required endpoints.
    #[error("{0} endpoint not found")]
    EndpointMissing(&'static str),

    /// The adapter reported busy/error; the operation was not issued.
    #[error("I2C bus busy (status {0})")]
    Busy(DeviceStatus),

    /// The requested range does not fit in the device's address space.
    #[error("address range {start:#x}+{length} exceeds device capacity of {capacity} bytes")]
    AddressOutOfRange {
        /// First address of the access.
        start: u32,
        /// Number of bytes accessed.
        length: usize,
        /// Size of the addressable space.
        capacity: u64,
    },

    /// A transfer moved fewer bytes than the protocol requires.
    #[error("short transfer: expected {expected} bytes, got {actual}")]
    ShortTransfer {
        /// Bytes the protocol requires.
        expected: usize,
        /// Bytes actually transferred.
        actual: usize,
    },

    /// Invalid argument(s) were provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// A specialized `Result` type for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;
