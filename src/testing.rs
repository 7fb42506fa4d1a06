// Licensed under the Apache-2.0 license

//! Hand-written collaborators for unit tests: a simulated I2C bus populated
//! with register-file devices, and a scripted byte transport.

use std::collections::{HashMap, VecDeque};
use std::vec::Vec;

use crate::config::UartConfig;
use crate::i2c::common::{AckMode, BusEvent, Direction, I2cConfig};
use crate::i2c::traits::{I2cBusControl, I2cBusStatus, I2cHardwareCore};
use crate::transport::ByteTransport;

/// Everything the engine asked the bus controller to do, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BusOp {
    Start,
    Stop,
    Address(u8, Direction),
    Send(u8),
    Receive(u8),
    AckMode(AckMode),
    ClearAckFailure,
}

struct Device {
    registers: [u8; 256],
    pointer: u8,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum BusState {
    Idle,
    Master,
    Transmitting,
    Receiving,
    Nacked,
}

pub struct MockBus {
    devices: HashMap<u8, Device>,
    ops: Vec<BusOp>,
    state: BusState,
    target: Option<u8>,
    pointer_pending: bool,
    stop_requested: bool,
    ack_failure: bool,
    transferred: usize,
    polls: usize,
    starts: usize,
    initialised: bool,
    /// Bus-busy flag never clears.
    pub stuck_busy: bool,
    /// Start requests are ignored, master mode is never reported.
    pub ignore_start: bool,
    /// Only this many data bytes complete; every later transfer hangs.
    pub stall_after: Option<usize>,
    /// Address phase hangs: neither selected nor NACKed.
    pub ignore_address: bool,
    /// Devices acknowledge their write address but refuse reads.
    pub nack_reads: bool,
    /// The bus goes busy for good once this many starts have been raised.
    pub busy_after_starts: Option<usize>,
}

impl MockBus {
    pub fn new() -> Self {
        Self {
            devices: HashMap::new(),
            ops: Vec::new(),
            state: BusState::Idle,
            target: None,
            pointer_pending: false,
            stop_requested: false,
            ack_failure: false,
            transferred: 0,
            polls: 0,
            starts: 0,
            initialised: false,
            stuck_busy: false,
            ignore_start: false,
            stall_after: None,
            ignore_address: false,
            nack_reads: false,
            busy_after_starts: None,
        }
    }

    /// Attach a device whose registers start with `contents`, zero elsewhere.
    pub fn add_device(&mut self, address: u8, contents: &[u8]) {
        let mut registers = [0u8; 256];
        registers[..contents.len()].copy_from_slice(contents);
        self.devices.insert(
            address,
            Device {
                registers,
                pointer: 0,
            },
        );
    }

    pub fn register(&self, address: u8, register: u8) -> u8 {
        self.devices[&address].registers[register as usize]
    }

    pub fn ops(&self) -> &[BusOp] {
        &self.ops
    }

    /// Addresses sent on the bus, in order.
    pub fn addressed(&self) -> Vec<u8> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                BusOp::Address(address, _) => Some(*address),
                _ => None,
            })
            .collect()
    }

    pub fn polls(&self) -> usize {
        self.polls
    }

    pub fn ack_failure_latched(&self) -> bool {
        self.ack_failure
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    fn stalled(&self, completed: usize) -> bool {
        self.stall_after.is_some_and(|limit| completed > limit)
    }

    fn device(&mut self) -> Option<&mut Device> {
        let target = self.target?;
        self.devices.get_mut(&target)
    }
}

impl I2cHardwareCore for MockBus {
    fn init(&mut self, _config: &I2cConfig) {
        self.initialised = true;
    }
}

impl I2cBusControl for MockBus {
    fn generate_start(&mut self) {
        self.ops.push(BusOp::Start);
        self.starts += 1;
        self.stop_requested = false;
        if !self.ignore_start {
            self.state = BusState::Master;
        }
    }

    fn generate_stop(&mut self) {
        self.ops.push(BusOp::Stop);
        // A stop requested while receiving takes effect after the byte in flight.
        if self.state == BusState::Receiving {
            self.stop_requested = true;
        } else {
            self.state = BusState::Idle;
            self.target = None;
        }
    }

    fn send_address(&mut self, address: u8, direction: Direction) {
        self.ops.push(BusOp::Address(address, direction));
        if self.ignore_address {
            return;
        }
        let refused = self.nack_reads && direction == Direction::Read;
        if self.devices.contains_key(&address) && !refused {
            self.target = Some(address);
            self.state = match direction {
                Direction::Write => {
                    self.pointer_pending = true;
                    BusState::Transmitting
                }
                Direction::Read => BusState::Receiving,
            };
        } else {
            self.ack_failure = true;
            self.state = BusState::Nacked;
        }
    }

    fn send_byte(&mut self, byte: u8) {
        self.ops.push(BusOp::Send(byte));
        self.transferred += 1;
        let pointer_pending = self.pointer_pending;
        self.pointer_pending = false;
        if let Some(device) = self.device() {
            if pointer_pending {
                device.pointer = byte;
            } else {
                device.registers[device.pointer as usize] = byte;
                device.pointer = device.pointer.wrapping_add(1);
            }
        }
    }

    fn receive_byte(&mut self) -> u8 {
        self.transferred += 1;
        let value = match self.device() {
            Some(device) => {
                let value = device.registers[device.pointer as usize];
                device.pointer = device.pointer.wrapping_add(1);
                value
            }
            None => 0xFF,
        };
        self.ops.push(BusOp::Receive(value));
        if self.stop_requested {
            self.stop_requested = false;
            self.state = BusState::Idle;
            self.target = None;
        }
        value
    }

    fn set_ack_mode(&mut self, mode: AckMode) {
        self.ops.push(BusOp::AckMode(mode));
    }

    fn clear_ack_failure(&mut self) {
        self.ops.push(BusOp::ClearAckFailure);
        self.ack_failure = false;
    }
}

impl I2cBusStatus for MockBus {
    fn is_bus_busy(&mut self) -> bool {
        self.polls += 1;
        self.stuck_busy || self.busy_after_starts.is_some_and(|limit| self.starts >= limit)
    }

    fn ack_failure(&mut self) -> bool {
        self.polls += 1;
        self.ack_failure
    }

    fn check_event(&mut self, event: BusEvent) -> bool {
        self.polls += 1;
        match event {
            BusEvent::MasterModeSelect => self.state == BusState::Master,
            BusEvent::TransmitterModeSelected => self.state == BusState::Transmitting,
            BusEvent::ReceiverModeSelected => self.state == BusState::Receiving,
            BusEvent::ByteTransmitting => {
                self.state == BusState::Transmitting && !self.stalled(self.transferred)
            }
            BusEvent::ByteReceived => {
                self.state == BusState::Receiving && !self.stalled(self.transferred + 1)
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MockTransportError;

enum Inbound {
    Byte(u8),
    /// The host goes quiet for this many polls.
    Gap(u32),
    Error,
}

/// Scripted host side of the serial link.
pub struct MockTransport {
    inbound: VecDeque<Inbound>,
    outbound: Vec<u8>,
    baud_rate: Option<u32>,
    /// Transmitter never reports ready.
    pub tx_stuck: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            inbound: VecDeque::new(),
            outbound: Vec::new(),
            baud_rate: None,
            tx_stuck: false,
        }
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes.iter().copied().map(Inbound::Byte));
    }

    pub fn stall(&mut self, polls: u32) {
        self.inbound.push_back(Inbound::Gap(polls));
    }

    pub fn push_error(&mut self) {
        self.inbound.push_back(Inbound::Error);
    }

    /// Drain everything the bridge has sent so far.
    pub fn take_sent(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.outbound)
    }

    pub fn pending_inbound(&self) -> usize {
        self.inbound.len()
    }

    pub fn baud_rate(&self) -> Option<u32> {
        self.baud_rate
    }
}

impl ByteTransport for MockTransport {
    type Error = MockTransportError;

    fn init(&mut self, config: &UartConfig) {
        self.baud_rate = Some(config.baud_rate);
    }

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        match self.inbound.front_mut() {
            None => Err(nb::Error::WouldBlock),
            Some(Inbound::Gap(0)) => {
                self.inbound.pop_front();
                self.read_byte()
            }
            Some(Inbound::Gap(remaining)) => {
                *remaining -= 1;
                Err(nb::Error::WouldBlock)
            }
            Some(Inbound::Byte(byte)) => {
                let byte = *byte;
                self.inbound.pop_front();
                Ok(byte)
            }
            Some(Inbound::Error) => {
                self.inbound.pop_front();
                Err(nb::Error::Other(MockTransportError))
            }
        }
    }

    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
        if self.tx_stuck {
            return Err(nb::Error::WouldBlock);
        }
        self.outbound.push(byte);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        Ok(())
    }
}
