// Licensed under the Apache-2.0 license

//! I2C controller owning the bus peripheral, its configuration and a logger.
//!
//! The bridge-specific register transactions live in
//! [`crate::i2c::transaction`]; this module additionally exposes the
//! controller through the embedded-hal `I2c` trait so ordinary device drivers
//! can share the same bounded-time engine.

use crate::common::{Logger, NoOpLogger};
use crate::i2c::common::I2cConfig;
use crate::i2c::traits::I2cBusController;
use crate::i2c::transaction::Error;
use embedded_hal::i2c::{Operation, SevenBitAddress};

pub struct I2cController<H: I2cBusController, L: Logger = NoOpLogger> {
    pub hardware: H,
    pub config: I2cConfig,
    pub logger: L,
}

impl<H: I2cBusController> I2cController<H, NoOpLogger> {
    pub fn new(hardware: H, config: I2cConfig) -> Self {
        Self::with_logger(hardware, config, NoOpLogger)
    }
}

impl<H: I2cBusController, L: Logger> I2cController<H, L> {
    pub fn with_logger(hardware: H, config: I2cConfig, logger: L) -> Self {
        Self {
            hardware,
            config,
            logger,
        }
    }

    /// Bring up the peripheral with the stored configuration.
    pub fn init(&mut self) {
        self.hardware.init(&self.config);
        self.logger.info(format_args!(
            "i2c master up at {} Hz",
            self.config.speed.hz()
        ));
    }
}

impl<H: I2cBusController, L: Logger> embedded_hal::i2c::ErrorType for I2cController<H, L> {
    type Error = Error;
}

impl<H: I2cBusController, L: Logger> embedded_hal::i2c::I2c for I2cController<H, L> {
    fn read(&mut self, addr: SevenBitAddress, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.transaction_slice(addr, &mut [Operation::Read(buffer)])
    }

    fn write(&mut self, addr: SevenBitAddress, bytes: &[u8]) -> Result<(), Self::Error> {
        self.transaction_slice(addr, &mut [Operation::Write(bytes)])
    }

    fn write_read(
        &mut self,
        addr: SevenBitAddress,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.transaction_slice(addr, &mut [Operation::Write(bytes), Operation::Read(buffer)])
    }

    fn transaction(
        &mut self,
        addr: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.transaction_slice(addr, operations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i2c::common::I2cConfigBuilder;
    use crate::testing::{BusOp, MockBus};
    use crate::timeout::PollTimeout;
    use embedded_hal::i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource};

    fn controller(bus: MockBus) -> I2cController<MockBus> {
        I2cController::new(
            bus,
            I2cConfigBuilder::new()
                .step_timeout(PollTimeout::from_polls(32))
                .build(),
        )
    }

    #[test]
    fn hal_write_read_uses_repeated_start() {
        let mut bus = MockBus::new();
        bus.add_device(0x48, &[0x11, 0x22, 0x33]);
        let mut i2c = controller(bus);

        let mut buf = [0u8; 2];
        i2c.write_read(0x48, &[0x01], &mut buf).unwrap();
        assert_eq!(buf, [0x22, 0x33]);

        let starts = i2c
            .hardware
            .ops()
            .iter()
            .filter(|op| matches!(op, BusOp::Start))
            .count();
        assert_eq!(starts, 2);
        assert_eq!(i2c.hardware.ops().last(), Some(&BusOp::AckMode(crate::i2c::AckMode::Current)));
    }

    #[test]
    fn hal_write_to_absent_device_reports_address_nack() {
        let mut i2c = controller(MockBus::new());
        let err = i2c.write(0x20, &[0x00]).unwrap_err();
        assert_eq!(
            err.kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        );
        assert!(i2c.hardware.ops().contains(&BusOp::ClearAckFailure));
        assert_eq!(i2c.hardware.ops().last(), Some(&BusOp::Stop));
    }

    #[test]
    fn hal_plain_read_starts_in_read_direction() {
        let mut bus = MockBus::new();
        bus.add_device(0x30, &[0xAB, 0xCD]);
        let mut i2c = controller(bus);

        let mut buf = [0u8; 1];
        i2c.read(0x30, &mut buf).unwrap();
        assert_eq!(buf, [0xAB]);
        assert!(i2c
            .hardware
            .ops()
            .contains(&BusOp::Address(0x30, crate::i2c::Direction::Read)));
    }

    #[test]
    fn hal_empty_transaction_touches_nothing() {
        let mut i2c = controller(MockBus::new());
        i2c.transaction(0x10, &mut []).unwrap();
        assert!(i2c.hardware.ops().is_empty());
    }
}
