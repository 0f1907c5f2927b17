//! `embedded-hal` 1.0 trait implementations.
//!
//! Enable the `embedded-hal` feature to use an [`I2cBridge`] anywhere an
//! `embedded_hal::i2c::I2c` bus is expected:
//!
//! ```toml
//! [dependencies]
//! cyusb-i2c = { version = "0.1", features = ["embedded-hal"] }
//! ```
//!
//! The adapter executes one command per direction change, so adjacent
//! operations of the same kind are merged into a single command. Each
//! command begins with a (repeated) START; only the last one ends with a
//! STOP. Empty operations are dropped before grouping, and a transaction
//! with no data at all (such as an address-only write used for ACK
//! polling) is rejected with [`Error::InvalidArgument`] because the
//! adapter cannot issue it.

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};

use crate::bridge::I2cBridge;
use crate::error::Error;
use crate::transport::Transport;
use crate::types::Framing;

// ---- Error conversion ----

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::Busy(_) => ErrorKind::Bus,
            _ => ErrorKind::Other,
        }
    }
}

// ---- embedded-hal I2C for I2cBridge ----

impl<T: Transport> ErrorType for I2cBridge<T> {
    type Error = Error;
}

/// Number of bytes an operation moves.
fn op_len(op: &Operation<'_>) -> usize {
    match op {
        Operation::Read(buf) => buf.len(),
        Operation::Write(buf) => buf.len(),
    }
}

impl<T: Transport> I2c for I2cBridge<T> {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        // Empty operations move no data; the adapter cannot issue them.
        let active: Vec<usize> = (0..operations.len())
            .filter(|&k| op_len(&operations[k]) > 0)
            .collect();
        if active.is_empty() {
            return Err(Error::InvalidArgument(
                "zero-length I2C transactions are not supported by the adapter",
            ));
        }

        let mut g = 0;
        while g < active.len() {
            let is_read = matches!(operations[active[g]], Operation::Read(_));
            let mut h = g + 1;
            while h < active.len()
                && matches!(operations[active[h]], Operation::Read(_)) == is_read
            {
                h += 1;
            }
            let framing = Framing::new(true, h == active.len());
            let members = &active[g..h];
            g = h;

            if is_read {
                let total: usize = members.iter().map(|&k| op_len(&operations[k])).sum();
                let data = self.read(address, total, framing)?;
                let mut offset = 0;
                for &k in members {
                    if let Operation::Read(buf) = &mut operations[k] {
                        let end = offset + buf.len();
                        buf.copy_from_slice(&data[offset..end]);
                        offset = end;
                    }
                }
            } else {
                let mut payload = Vec::new();
                for &k in members {
                    if let Operation::Write(buf) = &operations[k] {
                        payload.extend_from_slice(buf);
                    }
                }
                self.write(address, &payload, framing)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::BridgeConfig;
    use crate::transport::{MockTransport, TransportOp};

    fn commands(ops: &[TransportOp]) -> Vec<(u8, u16, u16)> {
        ops.iter()
            .filter_map(|op| match op {
                TransportOp::ControlOut {
                    request,
                    value,
                    index,
                    ..
                } => Some((*request, *value, *index)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn write_read_uses_repeated_start() {
        let mut mock = MockTransport::new();
        mock.push_bulk_in([0x12, 0x34]);
        let mut bridge = I2cBridge::new(mock, BridgeConfig::default());

        let mut buf = [0u8; 2];
        bridge.write_read(0x48, &[0x01], &mut buf).unwrap();
        assert_eq!(buf, [0x12, 0x34]);
        assert_eq!(
            commands(bridge.transport().ops()),
            vec![(0xC6, 0x4801, 1), (0xC7, 0x4803, 2)]
        );
    }

    #[test]
    fn adjacent_operations_merge() {
        let mut mock = MockTransport::new();
        mock.push_bulk_in([1, 2, 3]);
        let mut bridge = I2cBridge::new(mock, BridgeConfig::default());

        let mut a = [0u8; 1];
        let mut b = [0u8; 2];
        bridge
            .transaction(
                0x50,
                &mut [
                    Operation::Write(&[0x00]),
                    Operation::Write(&[0x10]),
                    Operation::Read(&mut a),
                    Operation::Read(&mut b),
                ],
            )
            .unwrap();
        assert_eq!(a, [1]);
        assert_eq!(b, [2, 3]);

        let ops = bridge.transport().ops();
        assert_eq!(commands(ops), vec![(0xC6, 0x5001, 2), (0xC7, 0x5003, 3)]);
        assert!(ops.contains(&TransportOp::BulkWrite(vec![0x00, 0x10])));
    }

    #[test]
    fn plain_write_closes_bus() {
        let mut bridge = I2cBridge::new(MockTransport::new(), BridgeConfig::default());
        I2c::write(&mut bridge, 0x50, &[0xAA, 0xBB]).unwrap();
        assert_eq!(commands(bridge.transport().ops()), vec![(0xC6, 0x5003, 2)]);
    }

    #[test]
    fn busy_maps_to_bus_error() {
        let mut mock = MockTransport::new();
        mock.push_status([0x01, 0x00, 0x00]);
        let mut bridge = I2cBridge::new(mock, BridgeConfig::default());
        let err = I2c::write(&mut bridge, 0x50, &[0]).unwrap_err();
        assert_eq!(embedded_hal::i2c::Error::kind(&err), ErrorKind::Bus);
    }

    #[test]
    fn stop_moves_to_last_nonempty_group() {
        let mut bridge = I2cBridge::new(MockTransport::new(), BridgeConfig::default());
        bridge
            .transaction(0x50, &mut [Operation::Write(&[0x01]), Operation::Read(&mut [])])
            .unwrap();
        assert_eq!(commands(bridge.transport().ops()), vec![(0xC6, 0x5003, 1)]);
    }

    #[test]
    fn empty_operations_between_groups_are_dropped() {
        let mut mock = MockTransport::new();
        mock.push_bulk_in([9]);
        let mut bridge = I2cBridge::new(mock, BridgeConfig::default());
        let mut buf = [0u8; 1];
        bridge
            .transaction(
                0x50,
                &mut [
                    Operation::Write(&[0x01]),
                    Operation::Write(&[]),
                    Operation::Write(&[0x02]),
                    Operation::Read(&mut buf),
                    Operation::Write(&[]),
                ],
            )
            .unwrap();
        assert_eq!(buf, [9]);
        assert_eq!(
            commands(bridge.transport().ops()),
            vec![(0xC6, 0x5001, 2), (0xC7, 0x5003, 1)]
        );
    }

    #[test]
    fn address_only_write_is_rejected() {
        let mut bridge = I2cBridge::new(MockTransport::new(), BridgeConfig::default());
        let err = I2c::write(&mut bridge, 0x50, &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(bridge
            .transaction(0x50, &mut [Operation::Read(&mut [])])
            .is_err());
        assert!(bridge.transport().ops().is_empty());
    }
}
