//! Recording transport for tests.

use std::collections::VecDeque;

use super::Transport;
use crate::constants::{I2C_GET_STATUS_REQUEST, I2C_STATUS_LEN};
use crate::error::{Error, Result};

/// One call made on a [`MockTransport`], in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOp {
    /// `control_in(request, value, index, length)`.
    ControlIn {
        request: u8,
        value: u16,
        index: u16,
        length: u16,
    },
    /// `control_out(request, value, index, data)`.
    ControlOut {
        request: u8,
        value: u16,
        index: u16,
        data: Vec<u8>,
    },
    /// `bulk_write(data)`.
    BulkWrite(Vec<u8>),
    /// `bulk_read(length)`.
    BulkRead(usize),
    /// `interrupt_read(length)`.
    InterruptRead(usize),
}

/// Scripted transport that records every call.
///
/// Status requests are answered from a queue of status words, falling back
/// to an idle status (`80 00 00`) once the queue is empty. Bulk reads are
/// answered from a queue of payloads, falling back to zero bytes of the
/// requested length. Bulk writes accept every byte unless limited with
/// [`limit_bulk_write`](Self::limit_bulk_write). Interrupt reads always
/// complete with `00 00 00`.
#[derive(Debug, Default)]
pub struct MockTransport {
    ops: Vec<TransportOp>,
    status: VecDeque<[u8; I2C_STATUS_LEN]>,
    bulk_in: VecDeque<Vec<u8>>,
    fail_interrupt: bool,
    bulk_write_limit: Option<usize>,
}

/// Status word reported when no other is queued.
const IDLE_STATUS: [u8; I2C_STATUS_LEN] = [0x80, 0x00, 0x00];

impl MockTransport {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a status word for the next get-status request.
    pub fn push_status(&mut self, status: [u8; I2C_STATUS_LEN]) {
        self.status.push_back(status);
    }

    /// Queue a payload for the next bulk read.
    pub fn push_bulk_in(&mut self, data: impl Into<Vec<u8>>) {
        self.bulk_in.push_back(data.into());
    }

    /// Make every interrupt read fail with [`Error::Timeout`].
    pub fn fail_interrupt(&mut self, fail: bool) {
        self.fail_interrupt = fail;
    }

    /// Accept at most `limit` bytes per bulk write, or everything with `None`.
    pub fn limit_bulk_write(&mut self, limit: Option<usize>) {
        self.bulk_write_limit = limit;
    }

    /// All calls recorded so far.
    pub fn ops(&self) -> &[TransportOp] {
        &self.ops
    }

    /// Take the recorded calls, leaving the log empty.
    pub fn take_ops(&mut self) -> Vec<TransportOp> {
        std::mem::take(&mut self.ops)
    }
}

impl Transport for MockTransport {
    fn control_in(&mut self, request: u8, value: u16, index: u16, length: u16) -> Result<Vec<u8>> {
        self.ops.push(TransportOp::ControlIn {
            request,
            value,
            index,
            length,
        });
        if request == I2C_GET_STATUS_REQUEST {
            let status = self.status.pop_front().unwrap_or(IDLE_STATUS);
            return Ok(status[..(length as usize).min(I2C_STATUS_LEN)].to_vec());
        }
        Ok(vec![0; length as usize])
    }

    fn control_out(&mut self, request: u8, value: u16, index: u16, data: &[u8]) -> Result<()> {
        self.ops.push(TransportOp::ControlOut {
            request,
            value,
            index,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn bulk_write(&mut self, data: &[u8]) -> Result<usize> {
        self.ops.push(TransportOp::BulkWrite(data.to_vec()));
        Ok(self.bulk_write_limit.map_or(data.len(), |n| n.min(data.len())))
    }

    fn bulk_read(&mut self, length: usize) -> Result<Vec<u8>> {
        self.ops.push(TransportOp::BulkRead(length));
        let mut data = self.bulk_in.pop_front().unwrap_or_else(|| vec![0; length]);
        data.truncate(length);
        Ok(data)
    }

    fn interrupt_read(&mut self, length: usize) -> Result<Vec<u8>> {
        self.ops.push(TransportOp::InterruptRead(length));
        if self.fail_interrupt {
            return Err(Error::Timeout);
        }
        Ok(vec![0; length])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_queue_then_idle() {
        let mut mock = MockTransport::new();
        mock.push_status([0x01, 0x00, 0x00]);
        assert_eq!(
            mock.control_in(I2C_GET_STATUS_REQUEST, 0, 0, 3).unwrap(),
            vec![0x01, 0x00, 0x00]
        );
        assert_eq!(
            mock.control_in(I2C_GET_STATUS_REQUEST, 0, 0, 3).unwrap(),
            IDLE_STATUS.to_vec()
        );
        assert_eq!(mock.take_ops().len(), 2);
        assert!(mock.ops().is_empty());
    }

    #[test]
    fn bulk_read_truncates_to_request() {
        let mut mock = MockTransport::new();
        mock.push_bulk_in([1, 2, 3, 4]);
        assert_eq!(mock.bulk_read(2).unwrap(), vec![1, 2]);
        assert_eq!(mock.bulk_read(3).unwrap(), vec![0, 0, 0]);
    }
}
