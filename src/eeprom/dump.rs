//! Line-by-line memory dump.

use std::fmt;
use std::iter::FusedIterator;

use super::I2cEeprom;
use crate::bridge::I2cBridge;
use crate::error::Result;
use crate::transport::Transport;

/// Bytes per dump line.
pub const DUMP_LINE_LEN: usize = 32;

/// One block of a memory dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpLine {
    /// Memory address of the first byte.
    pub address: u32,
    /// The bytes read.
    pub data: Vec<u8>,
}

impl fmt::Display for DumpLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x} ", self.address)?;
        for b in &self.data {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Lazy iterator over [`DUMP_LINE_LEN`]-byte blocks, created by
/// [`I2cEeprom::dump`].
///
/// Every line is an independent random read; a failed line is yielded as
/// an error and iteration continues with the next one.
pub struct Dump<'b, T: Transport> {
    eeprom: I2cEeprom,
    bridge: &'b mut I2cBridge<T>,
    line: u32,
    lines: u32,
}

impl<'b, T: Transport> Dump<'b, T> {
    pub(super) fn new(eeprom: I2cEeprom, bridge: &'b mut I2cBridge<T>, lines: u32) -> Self {
        Self {
            eeprom,
            bridge,
            line: 0,
            lines,
        }
    }
}

impl<T: Transport> Iterator for Dump<'_, T> {
    type Item = Result<DumpLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.line >= self.lines {
            return None;
        }
        // Saturates past 4 GiB so the range check rejects the line.
        let address = u32::try_from(u64::from(self.line) * DUMP_LINE_LEN as u64)
            .unwrap_or(u32::MAX);
        self.line += 1;

        Some(
            self.eeprom
                .read(self.bridge, address, DUMP_LINE_LEN)
                .map(|data| DumpLine { address, data }),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.lines - self.line) as usize;
        (remaining, Some(remaining))
    }
}

impl<T: Transport> ExactSizeIterator for Dump<'_, T> {}

impl<T: Transport> FusedIterator for Dump<'_, T> {}
