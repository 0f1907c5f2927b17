//! I2C transaction engine.
//!
//! [`I2cBridge`] turns a logical I2C transfer into the adapter's command
//! sequence:
//!
//! 1. read the status word and abort with [`Error::Busy`] if the busy flag
//!    is set;
//! 2. dispatch the command (address, framing, length) in a vendor control
//!    transfer;
//! 3. move the payload over the bulk OUT or bulk IN endpoint;
//! 4. block on the interrupt endpoint until the adapter reports completion.
//!
//! The engine never retries. After any error, [`I2cBridge::reset`] returns
//! the adapter's state machines to idle.
//!
//! # Example
//!
//! ```no_run
//! use cyusb_i2c::{BridgeConfig, DeviceFilter, Framing, I2cBridge};
//!
//! let mut bridge = I2cBridge::open(&DeviceFilter::default(), BridgeConfig::default())?;
//! bridge.reset()?;
//! bridge.write(0x51, &[0x00, 0x00], Framing::OPEN)?;
//! let data = bridge.read(0x51, 16, Framing::CLOSED)?;
//! # Ok::<(), cyusb_i2c::Error>(())
//! ```

use crate::constants::*;
use crate::device_info::DeviceFilter;
use crate::error::{Error, Result};
use crate::events::{BridgeEvent, BridgeObserver, LogObserver};
use crate::transport::{Transport, UsbTransport};
use crate::types::{DeviceStatus, Direction, Framing, I2cCommand};

/// Engine options fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BridgeConfig {
    /// Report every protocol step to the observer.
    pub verbose: bool,
}

impl BridgeConfig {
    /// Enable or disable protocol tracing.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// The I2C-over-USB transaction engine for one adapter.
///
/// Owns the transport (and through it the adapter's endpoints) for its
/// whole lifetime. All operations take `&mut self`: the adapter has a
/// single command slot, so transfers are strictly serialized.
pub struct I2cBridge<T: Transport> {
    transport: T,
    config: BridgeConfig,
    observer: Box<dyn BridgeObserver>,
}

impl<T: Transport + std::fmt::Debug> std::fmt::Debug for I2cBridge<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I2cBridge")
            .field("transport", &self.transport)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ---- Construction ----

impl I2cBridge<UsbTransport> {
    /// Open the first adapter matching `filter`.
    pub fn open(filter: &DeviceFilter, config: BridgeConfig) -> Result<Self> {
        Ok(Self::new(UsbTransport::open(filter)?, config))
    }
}

impl<T: Transport> I2cBridge<T> {
    /// Wrap a transport, reporting events to a [`LogObserver`].
    pub fn new(transport: T, config: BridgeConfig) -> Self {
        Self::with_observer(transport, config, Box::new(LogObserver))
    }

    /// Wrap a transport with a custom event observer.
    pub fn with_observer(
        transport: T,
        config: BridgeConfig,
        observer: Box<dyn BridgeObserver>,
    ) -> Self {
        Self {
            transport,
            config,
            observer,
        }
    }

    /// The engine configuration.
    pub fn config(&self) -> BridgeConfig {
        self.config
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Release the underlying transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn emit(&self, event: BridgeEvent) {
        if self.config.verbose {
            self.observer.on_event(&event);
        }
    }
}

// ---- Bridge commands ----

impl<T: Transport> I2cBridge<T> {
    /// Reset the adapter's I2C read and write state machines.
    ///
    /// Discards any transfer in progress on the adapter. Safe to call
    /// repeatedly.
    pub fn reset(&mut self) -> Result<()> {
        self.transport
            .control_in(I2C_RESET_REQUEST, I2C_RESET_READ, 0, 0)?;
        self.transport
            .control_in(I2C_RESET_REQUEST, I2C_RESET_WRITE, 0, 0)?;
        self.emit(BridgeEvent::Reset);
        Ok(())
    }

    /// Read the adapter's status word.
    pub fn status(&mut self) -> Result<DeviceStatus> {
        let data = self.transport.control_in(
            I2C_GET_STATUS_REQUEST,
            0,
            0,
            I2C_STATUS_LEN as u16,
        )?;
        let status = DeviceStatus::from_bytes(&data)?;
        self.emit(BridgeEvent::Status(status));
        Ok(status)
    }

    /// Whether the adapter can accept a new command.
    pub fn status_ok(&mut self) -> Result<bool> {
        Ok(self.status()?.is_ok())
    }

    /// Write `payload` to the slave at `address`.
    ///
    /// Returns once the adapter has reported completion on the interrupt
    /// endpoint. Fails with [`Error::Busy`] without touching the bus if the
    /// adapter is busy.
    pub fn write(&mut self, address: u8, payload: &[u8], framing: Framing) -> Result<()> {
        if payload.is_empty() {
            return Err(Error::InvalidArgument("write payload must not be empty"));
        }
        let cmd = I2cCommand::new(Direction::Write, address, payload.len(), framing)?;

        self.ensure_ready()?;
        self.dispatch(&cmd)?;

        let sent = self.transport.bulk_write(payload)?;
        if sent != payload.len() {
            return Err(Error::ShortTransfer {
                expected: payload.len(),
                actual: sent,
            });
        }
        self.emit(BridgeEvent::PayloadSent(sent));

        self.wait_for_completion()
    }

    /// Read `length` bytes from the slave at `address`.
    ///
    /// Returns exactly `length` bytes once the adapter has reported
    /// completion. Fails with [`Error::Busy`] without touching the bus if
    /// the adapter is busy.
    pub fn read(&mut self, address: u8, length: usize, framing: Framing) -> Result<Vec<u8>> {
        if length == 0 {
            return Err(Error::InvalidArgument("read length must not be zero"));
        }
        let cmd = I2cCommand::new(Direction::Read, address, length, framing)?;

        self.ensure_ready()?;
        self.dispatch(&cmd)?;

        let data = self.transport.bulk_read(length)?;
        if data.len() != length {
            return Err(Error::ShortTransfer {
                expected: length,
                actual: data.len(),
            });
        }
        self.emit(BridgeEvent::PayloadReceived(data.len()));

        self.wait_for_completion()?;
        Ok(data)
    }
}

// ---- Sequencing helpers ----

impl<T: Transport> I2cBridge<T> {
    /// Fresh status check ahead of every command.
    fn ensure_ready(&mut self) -> Result<()> {
        let status = self.status()?;
        if status.is_busy() {
            self.emit(BridgeEvent::Busy(status));
            return Err(Error::Busy(status));
        }
        Ok(())
    }

    fn dispatch(&mut self, cmd: &I2cCommand) -> Result<()> {
        self.transport
            .control_out(cmd.request(), cmd.value(), cmd.index(), &[])?;
        self.emit(BridgeEvent::CommandDispatched(*cmd));
        Ok(())
    }

    /// Block until the adapter's completion report arrives. The report
    /// content is not interpreted.
    fn wait_for_completion(&mut self) -> Result<()> {
        let report = self.transport.interrupt_read(I2C_STATUS_LEN)?;
        self.emit(BridgeEvent::Completed(report));
        Ok(())
    }
}
