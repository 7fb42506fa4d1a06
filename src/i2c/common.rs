// Licensed under the Apache-2.0 license

//! Common types and configuration for the I2C master side of the bridge.

use crate::timeout::PollTimeout;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum I2cSpeed {
    Standard = 100_000,
    Fast = 400_000,
}

impl I2cSpeed {
    #[must_use]
    pub fn hz(self) -> u32 {
        self as u32
    }
}

/// Transfer direction encoded in bit 0 of the address byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    Write = 0,
    Read = 1,
}

/// Acknowledge generation while receiving.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AckMode {
    /// Acknowledge the byte currently being received.
    Current,
    /// Do not acknowledge; used for the final byte of a read.
    None,
}

/// Controller events a master transaction waits on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusEvent {
    /// Start condition went out and the controller is bus master.
    MasterModeSelect,
    /// Address acknowledged in write direction.
    TransmitterModeSelected,
    /// Address acknowledged in read direction.
    ReceiverModeSelected,
    /// Data register ready for the next byte to transmit.
    ByteTransmitting,
    /// A byte has been received into the data register.
    ByteReceived,
}

/// Largest valid 7-bit address.
pub const MAX_SEVEN_BIT_ADDRESS: u8 = 0x7F;

pub struct I2cConfig {
    pub speed: I2cSpeed,
    /// Budget for each individual bus step (idle wait, select, byte transfer).
    pub step_timeout: PollTimeout,
}

pub struct I2cConfigBuilder {
    speed: I2cSpeed,
    step_timeout: Option<PollTimeout>,
}

impl Default for I2cConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl I2cConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            speed: I2cSpeed::Standard,
            step_timeout: None,
        }
    }
    #[must_use]
    pub fn speed(mut self, speed: I2cSpeed) -> Self {
        self.speed = speed;
        self
    }
    #[must_use]
    pub fn step_timeout(mut self, timeout: PollTimeout) -> Self {
        self.step_timeout = Some(timeout);
        self
    }
    #[must_use]
    pub fn build(self) -> I2cConfig {
        I2cConfig {
            speed: self.speed,
            step_timeout: self.step_timeout.unwrap_or_default(),
        }
    }
}
