//! End-to-end tests against a simulated 24C-series EEPROM behind the
//! bridge.
//!
//! `SimBridge` implements the adapter side of the I2C command protocol: it
//! checks that every command is followed by a bulk transfer of the
//! announced length and a completion wait, and keeps a 16-bit address
//! pointer into 64 KiB of memory.

use cyusb_i2c::{
    BridgeConfig, DumpLine, Error, Framing, I2cBridge, I2cCommand, I2cEeprom, Result, Transport,
};

const MEM_SIZE: usize = 0x1_0000;
const SLAVE: u8 = 0x51;

/// One engine transaction as seen by the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Txn {
    Reset(u16),
    Write { framing: Framing, payload: Vec<u8> },
    Read { framing: Framing, length: usize },
}

#[derive(Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Command { request: u8, value: u16, length: usize },
    Completion,
}

struct SimBridge {
    mem: Vec<u8>,
    pointer: usize,
    phase: Phase,
    log: Vec<Txn>,
}

impl SimBridge {
    fn new() -> Self {
        Self {
            mem: vec![0xFF; MEM_SIZE],
            pointer: 0,
            phase: Phase::Idle,
            log: Vec::new(),
        }
    }

    fn take_log(&mut self) -> Vec<Txn> {
        std::mem::take(&mut self.log)
    }
}

impl Transport for SimBridge {
    fn control_in(&mut self, request: u8, value: u16, _index: u16, length: u16) -> Result<Vec<u8>> {
        match request {
            0xC8 => {
                assert_eq!(self.phase, Phase::Idle, "status read mid-transaction");
                assert_eq!(length, 3);
                Ok(vec![0x80, 0x00, 0x00])
            }
            0xC9 => {
                assert_eq!(length, 0);
                self.phase = Phase::Idle;
                self.log.push(Txn::Reset(value));
                Ok(Vec::new())
            }
            other => panic!("unexpected control IN request {other:#04x}"),
        }
    }

    fn control_out(&mut self, request: u8, value: u16, index: u16, data: &[u8]) -> Result<()> {
        assert_eq!(self.phase, Phase::Idle, "command issued before completion");
        assert!(data.is_empty());
        let (address, _) = I2cCommand::decode_value(value);
        assert_eq!(address, SLAVE);
        self.phase = Phase::Command {
            request,
            value,
            length: index as usize,
        };
        Ok(())
    }

    fn bulk_write(&mut self, data: &[u8]) -> Result<usize> {
        let Phase::Command {
            request: 0xC6,
            value,
            length,
        } = self.phase
        else {
            panic!("bulk OUT without a write command");
        };
        assert_eq!(data.len(), length);

        self.pointer = ((data[0] as usize) << 8) | data[1] as usize;
        for &b in &data[2..] {
            self.mem[self.pointer] = b;
            self.pointer = (self.pointer + 1) % MEM_SIZE;
        }

        let (_, framing) = I2cCommand::decode_value(value);
        self.log.push(Txn::Write {
            framing,
            payload: data.to_vec(),
        });
        self.phase = Phase::Completion;
        Ok(data.len())
    }

    fn bulk_read(&mut self, length: usize) -> Result<Vec<u8>> {
        let Phase::Command {
            request: 0xC7,
            value,
            length: announced,
        } = self.phase
        else {
            panic!("bulk IN without a read command");
        };
        assert_eq!(length, announced);

        let data = (0..length)
            .map(|i| self.mem[(self.pointer + i) % MEM_SIZE])
            .collect();
        self.pointer = (self.pointer + length) % MEM_SIZE;

        let (_, framing) = I2cCommand::decode_value(value);
        self.log.push(Txn::Read { framing, length });
        self.phase = Phase::Completion;
        Ok(data)
    }

    fn interrupt_read(&mut self, length: usize) -> Result<Vec<u8>> {
        assert_eq!(self.phase, Phase::Completion, "completion wait out of order");
        self.phase = Phase::Idle;
        Ok(vec![0x00; length])
    }
}

fn setup() -> (I2cBridge<SimBridge>, I2cEeprom) {
    let _ = env_logger::builder().is_test(true).try_init();
    let bridge = I2cBridge::new(SimBridge::new(), BridgeConfig::default().verbose(true));
    (bridge, I2cEeprom::new(SLAVE, 2).unwrap())
}

#[test]
fn write_32_bytes_at_3fe0() {
    let (mut bridge, eeprom) = setup();
    let data: Vec<u8> = (0..32).collect();
    eeprom.write(&mut bridge, 0x3FE0, &data).unwrap();

    let mut payload = vec![0x3F, 0xE0];
    payload.extend_from_slice(&data);
    assert_eq!(
        bridge.transport_mut().take_log(),
        vec![Txn::Write {
            framing: Framing::OPEN,
            payload
        }]
    );
}

#[test]
fn read_back_written_bytes() {
    let (mut bridge, eeprom) = setup();
    let data: Vec<u8> = (0..32).collect();
    eeprom.write(&mut bridge, 0x3FE0, &data).unwrap();
    bridge.transport_mut().take_log();

    assert_eq!(eeprom.read(&mut bridge, 0x3FE0, 32).unwrap(), data);
    assert_eq!(
        bridge.transport_mut().take_log(),
        vec![
            Txn::Reset(0),
            Txn::Reset(1),
            Txn::Write {
                framing: Framing::OPEN,
                payload: vec![0x3F, 0xE0]
            },
            Txn::Read {
                framing: Framing::CLOSED,
                length: 32
            },
        ]
    );
}

#[test]
fn read_from_zero_composes_two_transactions() {
    let (mut bridge, eeprom) = setup();
    let data: Vec<u8> = (0..32).collect();
    eeprom.write(&mut bridge, 0x0000, &data).unwrap();
    bridge.transport_mut().take_log();

    assert_eq!(eeprom.read(&mut bridge, 0x0000, 32).unwrap(), data);
    let log = bridge.transport_mut().take_log();
    let transactions: Vec<&Txn> = log
        .iter()
        .filter(|t| !matches!(t, Txn::Reset(_)))
        .collect();
    assert_eq!(
        transactions,
        vec![
            &Txn::Write {
                framing: Framing::OPEN,
                payload: vec![0x00, 0x00]
            },
            &Txn::Read {
                framing: Framing::CLOSED,
                length: 32
            },
        ]
    );
}

#[test]
fn dump_two_lines() {
    let (mut bridge, eeprom) = setup();
    let data: Vec<u8> = (0..64).collect();
    eeprom.write(&mut bridge, 0, &data).unwrap();

    let lines: Vec<DumpLine> = eeprom
        .dump(&mut bridge, 2)
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(
        lines,
        vec![
            DumpLine {
                address: 0,
                data: data[..32].to_vec()
            },
            DumpLine {
                address: 32,
                data: data[32..].to_vec()
            },
        ]
    );
    assert_eq!(
        lines[1].to_string(),
        "0x20 202122232425262728292a2b2c2d2e2f303132333435363738393a3b3c3d3e3f"
    );
}

#[test]
fn views_share_one_bridge() {
    let (mut bridge, eeprom) = setup();
    let other = I2cEeprom::new(SLAVE, 2)
        .unwrap()
        .with_read_framing(Framing::CLOSED);

    eeprom.write(&mut bridge, 0x1234, &[0xCA, 0xFE]).unwrap();
    assert_eq!(other.read(&mut bridge, 0x1234, 2).unwrap(), vec![0xCA, 0xFE]);
}

#[test]
fn last_byte_of_space() {
    let (mut bridge, eeprom) = setup();
    eeprom.write(&mut bridge, 0xFFFF, &[0x42]).unwrap();
    assert_eq!(eeprom.read(&mut bridge, 0xFFFF, 1).unwrap(), vec![0x42]);
    assert!(matches!(
        eeprom.read(&mut bridge, 0xFFFF, 2),
        Err(Error::AddressOutOfRange {
            start: 0xFFFF,
            length: 2,
            capacity: 0x1_0000
        })
    ));
}
