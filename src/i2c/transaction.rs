// Licensed under the Apache-2.0 license

//! Bounded-time I2C master transactions.
//!
//! Every transaction is built from the same handful of bus steps: wait for
//! the bus to go idle, raise a start condition, send the address, move data
//! bytes, raise a stop condition. Each wait goes through [`I2cController::await_step`],
//! which polls the controller under the configured step budget and reports
//! one of three outcomes. Write, read, probe and the generic embedded-hal
//! transaction are all sequenced from these steps, so timeout and
//! acknowledge-failure handling exists in exactly one place.
//!
//! Whatever goes wrong after a start condition has been raised, the engine
//! leaves the bus with a stop condition and the acknowledge-failure flag
//! cleared, ready for the next command.

use crate::common::Logger;
use crate::i2c::common::{AckMode, BusEvent, Direction, MAX_SEVEN_BIT_ADDRESS};
use crate::i2c::i2c_controller::I2cController;
use crate::i2c::traits::I2cBusController;
use crate::timeout::{poll_until, Expired};
use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource, Operation};

/// Reasons a bus transaction did not complete.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The bus never became idle; no start condition was raised.
    BusBusy,
    /// Start condition or address phase did not complete in time.
    SelectTimeout,
    /// The device did not acknowledge its address. This is the ordinary
    /// "nobody home" outcome rather than a fault.
    NoAcknowledge,
    /// A data byte was not transmitted or received in time.
    TransferTimeout,
    /// The address does not fit in 7 bits.
    InvalidAddress,
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::BusBusy => ErrorKind::Bus,
            Error::NoAcknowledge => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            Error::SelectTimeout | Error::TransferTimeout | Error::InvalidAddress => {
                ErrorKind::Other
            }
        }
    }
}

/// A single bus condition the engine waits for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    BusIdle,
    MasterSelect,
    Address(Direction),
    ByteTransmitted,
    ByteReceived,
}

/// Result of waiting on one [`Step`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    /// Only reported while waiting on [`Step::Address`].
    AckFailure,
    Expired,
}

impl<H: I2cBusController, L: Logger> I2cController<H, L> {
    /// Poll the controller until `step` completes, the device refuses its
    /// address, or the step budget runs out. Single attempt, no retry.
    pub fn await_step(&mut self, step: Step) -> StepOutcome {
        let hw = &mut self.hardware;
        let mut nacked = false;
        let polled = poll_until(self.config.step_timeout, || match step {
            Step::BusIdle => !hw.is_bus_busy(),
            Step::MasterSelect => hw.check_event(BusEvent::MasterModeSelect),
            Step::Address(direction) => {
                let selected = match direction {
                    Direction::Write => BusEvent::TransmitterModeSelected,
                    Direction::Read => BusEvent::ReceiverModeSelected,
                };
                if hw.check_event(selected) {
                    return true;
                }
                nacked = hw.ack_failure();
                nacked
            }
            Step::ByteTransmitted => hw.check_event(BusEvent::ByteTransmitting),
            Step::ByteReceived => hw.check_event(BusEvent::ByteReceived),
        });
        match polled {
            Ok(()) if nacked => StepOutcome::AckFailure,
            Ok(()) => StepOutcome::Done,
            Err(Expired) => {
                self.logger
                    .warn(format_args!("i2c step {:?} timed out", step));
                StepOutcome::Expired
            }
        }
    }

    /// Write `payload` to `register` of the device at `address`.
    ///
    /// The stop condition is raised only after the final byte has been
    /// confirmed, so the last transfer is never cut short.
    ///
    /// # Errors
    ///
    /// Any failed step aborts the whole write; there is no partial success.
    pub fn write_register(&mut self, address: u8, register: u8, payload: &[u8]) -> Result<(), Error> {
        self.begin(address, Direction::Write, true)?;
        self.transmit(register)?;
        for &byte in payload {
            self.transmit(byte)?;
        }
        self.hardware.generate_stop();
        Ok(())
    }

    /// Fill `buffer` from `register` of the device at `address`.
    ///
    /// The register pointer is written first, then the device is re-addressed
    /// in read direction with a repeated start. An empty `buffer` only sets
    /// the pointer.
    ///
    /// # Errors
    ///
    /// Any failed step aborts the whole read.
    pub fn read_register(&mut self, address: u8, register: u8, buffer: &mut [u8]) -> Result<(), Error> {
        self.begin(address, Direction::Write, true)?;
        self.transmit(register)?;
        if buffer.is_empty() {
            self.hardware.generate_stop();
            return Ok(());
        }
        self.begin(address, Direction::Read, false)?;
        self.receive(buffer, true, true)
    }

    /// Address-only presence check. Returns whether the device acknowledged.
    ///
    /// # Errors
    ///
    /// Timeouts are errors; a missing acknowledge is `Ok(false)`.
    pub fn probe(&mut self, address: u8) -> Result<bool, Error> {
        match self.begin(address, Direction::Write, true) {
            Ok(()) => {
                self.hardware.generate_stop();
                self.logger
                    .debug(format_args!("probe {:#04x}: present", address));
                Ok(true)
            }
            Err(Error::NoAcknowledge) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Execute embedded-hal operations as one bus transaction.
    ///
    /// Adjacent operations of the same kind share an address phase; a change
    /// of direction issues a repeated start. The last byte of every read run
    /// is not acknowledged, and a single stop ends the transaction.
    ///
    /// # Errors
    ///
    /// The first failing step aborts the remaining operations.
    pub fn transaction_slice(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Error> {
        let mut current: Option<Direction> = None;
        let mut ops = operations.iter_mut().peekable();
        while let Some(op) = ops.next() {
            let next = ops.peek().map(|op| direction_of(op));
            match op {
                Operation::Write(bytes) => {
                    if current != Some(Direction::Write) {
                        self.begin(address, Direction::Write, current.is_none())?;
                        current = Some(Direction::Write);
                    }
                    for &byte in bytes.iter() {
                        self.transmit(byte)?;
                    }
                    if next.is_none() {
                        self.hardware.generate_stop();
                    }
                }
                Operation::Read(buffer) => {
                    if current != Some(Direction::Read) {
                        self.begin(address, Direction::Read, current.is_none())?;
                        current = Some(Direction::Read);
                    }
                    let run_ends = next != Some(Direction::Read);
                    self.receive(buffer, run_ends, next.is_none())?;
                }
            }
        }
        Ok(())
    }

    /// Start condition plus address phase. With `first` set, waits for the
    /// bus to go idle beforehand; repeated starts skip that wait.
    fn begin(&mut self, address: u8, direction: Direction, first: bool) -> Result<(), Error> {
        if address > MAX_SEVEN_BIT_ADDRESS {
            return Err(Error::InvalidAddress);
        }
        if first && self.await_step(Step::BusIdle) != StepOutcome::Done {
            return Err(Error::BusBusy);
        }

        self.hardware.generate_start();
        if self.await_step(Step::MasterSelect) != StepOutcome::Done {
            self.abort();
            return Err(Error::SelectTimeout);
        }

        self.hardware.send_address(address, direction);
        match self.await_step(Step::Address(direction)) {
            StepOutcome::Done => Ok(()),
            StepOutcome::AckFailure => {
                self.hardware.clear_ack_failure();
                self.hardware.generate_stop();
                self.logger
                    .debug(format_args!("no ack from {:#04x}", address));
                Err(Error::NoAcknowledge)
            }
            StepOutcome::Expired => {
                self.abort();
                Err(Error::SelectTimeout)
            }
        }
    }

    fn transmit(&mut self, byte: u8) -> Result<(), Error> {
        self.hardware.send_byte(byte);
        if self.await_step(Step::ByteTransmitted) != StepOutcome::Done {
            self.abort();
            return Err(Error::TransferTimeout);
        }
        Ok(())
    }

    /// Receive into `buffer`. With `nack_last`, the final byte is not
    /// acknowledged; with `stop`, the stop condition is requested before that
    /// byte is read so the device releases the bus right after it.
    fn receive(&mut self, buffer: &mut [u8], nack_last: bool, stop: bool) -> Result<(), Error> {
        let len = buffer.len();
        if len == 0 && stop {
            self.hardware.generate_stop();
        }
        for (index, slot) in buffer.iter_mut().enumerate() {
            if index + 1 == len && nack_last {
                self.hardware.set_ack_mode(AckMode::None);
                if stop {
                    self.hardware.generate_stop();
                }
            }
            if self.await_step(Step::ByteReceived) != StepOutcome::Done {
                self.hardware.set_ack_mode(AckMode::Current);
                self.abort();
                return Err(Error::TransferTimeout);
            }
            *slot = self.hardware.receive_byte();
        }
        if len > 0 {
            self.hardware.set_ack_mode(AckMode::Current);
        }
        Ok(())
    }

    /// Force the bus back to idle after a failed step.
    fn abort(&mut self) {
        if self.hardware.ack_failure() {
            self.hardware.clear_ack_failure();
        }
        self.hardware.generate_stop();
    }
}

fn direction_of(op: &Operation<'_>) -> Direction {
    match op {
        Operation::Write(_) => Direction::Write,
        Operation::Read(_) => Direction::Read,
    }
}
