//! nusb-backed transport for a real adapter.

use std::time::Duration;

use nusb::descriptors::TransferType;
use nusb::transfer::{
    Buffer, Bulk, Completion, ControlIn, ControlOut, ControlType, In, Interrupt, Out, Recipient,
    TransferError,
};
use nusb::{self, DeviceInfo, Endpoint, MaybeFuture};

use super::Transport;
use crate::device_info::{find_device, DeviceFilter};
use crate::error::{Error, Result};

/// Default timeout for every USB transfer.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Endpoint addresses of the adapter's I2C interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointSet {
    /// The USB interface number.
    pub interface_num: u8,
    /// Interrupt IN endpoint carrying completion reports.
    pub interrupt_in: u8,
    /// Bulk IN endpoint carrying read data.
    pub bulk_in: u8,
    /// Bulk OUT endpoint carrying write payloads.
    pub bulk_out: u8,
}

impl EndpointSet {
    /// Pick the interrupt IN, bulk IN and bulk OUT endpoints from an
    /// interface's `(address, transfer type)` list. The first match of each
    /// kind wins.
    pub fn resolve(
        interface_num: u8,
        endpoints: impl IntoIterator<Item = (u8, TransferType)>,
    ) -> Result<Self> {
        let mut interrupt_in = None;
        let mut bulk_in = None;
        let mut bulk_out = None;

        for (address, kind) in endpoints {
            let is_in = address & 0x80 != 0;
            let slot = match (kind, is_in) {
                (TransferType::Interrupt, true) => &mut interrupt_in,
                (TransferType::Bulk, true) => &mut bulk_in,
                (TransferType::Bulk, false) => &mut bulk_out,
                _ => continue,
            };
            slot.get_or_insert(address);
        }

        Ok(Self {
            interface_num,
            interrupt_in: interrupt_in.ok_or(Error::EndpointMissing("interrupt IN"))?,
            bulk_in: bulk_in.ok_or(Error::EndpointMissing("bulk IN"))?,
            bulk_out: bulk_out.ok_or(Error::EndpointMissing("bulk OUT"))?,
        })
    }
}

/// An opened adapter with its I2C interface claimed.
///
/// Owns the USB device, the claimed interface and the three endpoints of
/// the I2C function. Every transfer is blocking and bounded by
/// [`timeout`](Self::timeout); an expired transfer surfaces as
/// [`Error::Timeout`].
pub struct UsbTransport {
    #[allow(dead_code)] // Kept to ensure the USB device stays open
    device: nusb::Device,
    interface: nusb::Interface,
    endpoints: EndpointSet,
    interrupt_in: Endpoint<Interrupt, In>,
    bulk_in: Endpoint<Bulk, In>,
    bulk_out: Endpoint<Bulk, Out>,
    timeout: Duration,
}

impl std::fmt::Debug for UsbTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsbTransport")
            .field("endpoints", &self.endpoints)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

// ---- Construction / Opening ----

impl UsbTransport {
    /// Open the first device matching `filter`.
    pub fn open(filter: &DeviceFilter) -> Result<Self> {
        let dev_info = find_device(filter)?;
        Self::from_device_info(dev_info, filter.subclass)
    }

    /// Open an already-discovered device and claim the interface with the
    /// given subclass.
    pub fn from_device_info(dev_info: DeviceInfo, subclass: u8) -> Result<Self> {
        let device = dev_info.open().wait()?;

        ensure_configuration(&device)?;
        let endpoints = find_i2c_interface(&device, subclass)?;

        log::debug!(
            "I2C interface {}: interrupt IN {:#04x}, bulk IN {:#04x}, bulk OUT {:#04x}",
            endpoints.interface_num,
            endpoints.interrupt_in,
            endpoints.bulk_in,
            endpoints.bulk_out
        );

        let interface = device
            .detach_and_claim_interface(endpoints.interface_num)
            .wait()?;

        let interrupt_in = interface.endpoint::<Interrupt, In>(endpoints.interrupt_in)?;
        let bulk_in = interface.endpoint::<Bulk, In>(endpoints.bulk_in)?;
        let bulk_out = interface.endpoint::<Bulk, Out>(endpoints.bulk_out)?;

        Ok(Self {
            device,
            interface,
            endpoints,
            interrupt_in,
            bulk_in,
            bulk_out,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// The resolved endpoint addresses.
    pub fn endpoints(&self) -> EndpointSet {
        self.endpoints
    }

    /// Set the timeout applied to every USB transfer.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Get the current transfer timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Select the first configuration if the device is unconfigured.
fn ensure_configuration(device: &nusb::Device) -> Result<()> {
    if device.active_configuration().is_ok() {
        return Ok(());
    }

    let value = device
        .configurations()
        .next()
        .map(|c| c.configuration_value())
        .ok_or(Error::ConfigurationMissing)?;
    device.set_configuration(value).wait()?;

    device
        .active_configuration()
        .map(|_| ())
        .map_err(|_| Error::ConfigurationMissing)
}

/// Locate the interface with the requested subclass and resolve its
/// endpoints.
fn find_i2c_interface(device: &nusb::Device, subclass: u8) -> Result<EndpointSet> {
    let config = device
        .active_configuration()
        .map_err(|_| Error::ConfigurationMissing)?;

    for iface_group in config.interfaces() {
        for alt in iface_group.alt_settings() {
            if alt.subclass() != subclass {
                continue;
            }
            return EndpointSet::resolve(
                alt.interface_number(),
                alt.endpoints().map(|ep| (ep.address(), ep.transfer_type())),
            );
        }
    }

    Err(Error::InterfaceNotFound { subclass })
}

/// Map a transfer error, reporting a cancelled (timed-out) transfer as
/// [`Error::Timeout`].
fn transfer_error(err: TransferError) -> Error {
    match err {
        TransferError::Cancelled => Error::Timeout,
        other => Error::Transfer(other),
    }
}

/// IN transfers must request a whole number of max-size packets.
fn in_request_len(length: usize, max_packet_size: usize) -> usize {
    if max_packet_size == 0 {
        return length;
    }
    length.max(1).div_ceil(max_packet_size) * max_packet_size
}

/// Extract at most `length` received bytes from an IN completion.
fn completion_data(completion: Completion, length: usize) -> Result<Vec<u8>> {
    completion.status.map_err(transfer_error)?;
    let mut data = completion.buffer.into_vec();
    data.truncate(completion.actual_len.min(length));
    Ok(data)
}

// ---- Transfer primitives ----

impl Transport for UsbTransport {
    fn control_in(&mut self, request: u8, value: u16, index: u16, length: u16) -> Result<Vec<u8>> {
        self.interface
            .control_in(
                ControlIn {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request,
                    value,
                    index,
                    length,
                },
                self.timeout,
            )
            .wait()
            .map_err(transfer_error)
    }

    fn control_out(&mut self, request: u8, value: u16, index: u16, data: &[u8]) -> Result<()> {
        self.interface
            .control_out(
                ControlOut {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request,
                    value,
                    index,
                    data,
                },
                self.timeout,
            )
            .wait()
            .map_err(transfer_error)
    }

    fn bulk_write(&mut self, data: &[u8]) -> Result<usize> {
        let mut buf = Buffer::new(data.len());
        buf.extend_from_slice(data);

        let completion = self.bulk_out.transfer_blocking(buf, self.timeout);
        completion.status.map_err(transfer_error)?;
        Ok(completion.actual_len)
    }

    fn bulk_read(&mut self, length: usize) -> Result<Vec<u8>> {
        let request_len = in_request_len(length, self.bulk_in.max_packet_size());
        let completion = self
            .bulk_in
            .transfer_blocking(Buffer::new(request_len), self.timeout);
        completion_data(completion, length)
    }

    fn interrupt_read(&mut self, length: usize) -> Result<Vec<u8>> {
        let request_len = in_request_len(length, self.interrupt_in.max_packet_size());
        let completion = self
            .interrupt_in
            .transfer_blocking(Buffer::new(request_len), self.timeout);
        completion_data(completion, length)
    }
}
