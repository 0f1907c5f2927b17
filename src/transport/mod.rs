//! USB transport primitives consumed by the transaction engine.
//!
//! [`Transport`] is the seam between the I2C command protocol and the USB
//! stack. [`UsbTransport`] drives a real adapter through nusb;
//! [`MockTransport`] records every call and replays scripted replies, for
//! testing code built on [`I2cBridge`](crate::I2cBridge) without hardware.

pub mod mock;
mod usb;

pub use mock::{MockTransport, TransportOp};
pub use usb::{EndpointSet, UsbTransport};

use crate::error::Result;

/// Blocking USB transfer primitives of one adapter interface.
///
/// Control transfers are vendor requests addressed to the device. The
/// bulk and interrupt endpoints are the ones bound to the I2C interface
/// when the transport was opened.
pub trait Transport {
    /// Vendor control transfer, device to host. Returns the bytes received.
    fn control_in(&mut self, request: u8, value: u16, index: u16, length: u16) -> Result<Vec<u8>>;

    /// Vendor control transfer, host to device.
    fn control_out(&mut self, request: u8, value: u16, index: u16, data: &[u8]) -> Result<()>;

    /// Write `data` to the bulk OUT endpoint. Returns the bytes accepted.
    fn bulk_write(&mut self, data: &[u8]) -> Result<usize>;

    /// Read up to `length` bytes from the bulk IN endpoint.
    fn bulk_read(&mut self, length: usize) -> Result<Vec<u8>>;

    /// Wait for a report of up to `length` bytes on the interrupt IN endpoint.
    fn interrupt_read(&mut self, length: usize) -> Result<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn control_in(&mut self, request: u8, value: u16, index: u16, length: u16) -> Result<Vec<u8>> {
        (**self).control_in(request, value, index, length)
    }

    fn control_out(&mut self, request: u8, value: u16, index: u16, data: &[u8]) -> Result<()> {
        (**self).control_out(request, value, index, data)
    }

    fn bulk_write(&mut self, data: &[u8]) -> Result<usize> {
        (**self).bulk_write(data)
    }

    fn bulk_read(&mut self, length: usize) -> Result<Vec<u8>> {
        (**self).bulk_read(length)
    }

    fn interrupt_read(&mut self, length: usize) -> Result<Vec<u8>> {
        (**self).interrupt_read(length)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn control_in(&mut self, request: u8, value: u16, index: u16, length: u16) -> Result<Vec<u8>> {
        (**self).control_in(request, value, index, length)
    }

    fn control_out(&mut self, request: u8, value: u16, index: u16, data: &[u8]) -> Result<()> {
        (**self).control_out(request, value, index, data)
    }

    fn bulk_write(&mut self, data: &[u8]) -> Result<usize> {
        (**self).bulk_write(data)
    }

    fn bulk_read(&mut self, length: usize) -> Result<Vec<u8>> {
        (**self).bulk_read(length)
    }

    fn interrupt_read(&mut self, length: usize) -> Result<Vec<u8>> {
        (**self).interrupt_read(length)
    }
}
