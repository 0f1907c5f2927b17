//! Diagnostic events emitted by the transaction engine.
//!
//! When [`BridgeConfig::verbose`](crate::BridgeConfig::verbose) is set, the
//! engine reports each protocol step to a [`BridgeObserver`]. The default
//! observer, [`LogObserver`], forwards them to the `log` facade.

use crate::types::{DeviceStatus, I2cCommand};

/// A protocol step of the transaction engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// Read and write state machines were reset.
    Reset,
    /// A status word was read.
    Status(DeviceStatus),
    /// The adapter reported busy; the pending command was dropped.
    Busy(DeviceStatus),
    /// An I2C command was dispatched over the control endpoint.
    CommandDispatched(I2cCommand),
    /// Payload bytes were sent on the bulk OUT endpoint.
    PayloadSent(usize),
    /// Data bytes were received on the bulk IN endpoint.
    PayloadReceived(usize),
    /// The completion report arrived on the interrupt endpoint.
    Completed(Vec<u8>),
}

/// Receiver of engine diagnostics.
pub trait BridgeObserver: Send {
    /// Handle one event.
    fn on_event(&self, event: &BridgeEvent);
}

/// Observer writing events to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl BridgeObserver for LogObserver {
    fn on_event(&self, event: &BridgeEvent) {
        match event {
            BridgeEvent::Reset => log::debug!("I2C reset"),
            BridgeEvent::Status(status) => log::trace!("I2C status {status}"),
            BridgeEvent::Busy(status) => log::warn!("device busy (status {status})"),
            BridgeEvent::CommandDispatched(cmd) => log::debug!(
                "I2C {:?} addr={:#04x} len={} start={} stop={}",
                cmd.direction(),
                cmd.address(),
                cmd.length(),
                cmd.framing().start,
                cmd.framing().stop
            ),
            BridgeEvent::PayloadSent(n) => log::trace!("bulk OUT {n} bytes"),
            BridgeEvent::PayloadReceived(n) => log::trace!("bulk IN {n} bytes"),
            BridgeEvent::Completed(report) => log::trace!("completion {report:02x?}"),
        }
    }
}
