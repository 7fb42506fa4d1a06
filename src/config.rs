// Licensed under the Apache-2.0 license

//! Bridge configuration: host link parameters, bus parameters and the poll
//! budgets applied while talking to the host.

use crate::i2c::common::{I2cConfig, I2cConfigBuilder};
use crate::timeout::PollTimeout;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum WordLength {
    Seven = 7,
    Eight = 8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

/// Serial parameters of the host link.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UartConfig {
    pub baud_rate: u32,
    pub word_length: WordLength,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    /// 115200 baud, 8N1.
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            word_length: WordLength::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

pub struct BridgeConfig {
    pub uart: UartConfig,
    pub i2c: I2cConfig,
    /// Budget for each request byte after the command identifier.
    pub byte_timeout: PollTimeout,
    /// Budget for each response byte to be accepted by the transmitter.
    pub respond_timeout: PollTimeout,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfigBuilder::new().build()
    }
}

pub struct BridgeConfigBuilder {
    uart: UartConfig,
    i2c: Option<I2cConfig>,
    byte_timeout: Option<PollTimeout>,
    respond_timeout: Option<PollTimeout>,
}

impl Default for BridgeConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            uart: UartConfig::default(),
            i2c: None,
            byte_timeout: None,
            respond_timeout: None,
        }
    }
    #[must_use]
    pub fn uart(mut self, uart: UartConfig) -> Self {
        self.uart = uart;
        self
    }
    #[must_use]
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.uart.baud_rate = baud_rate;
        self
    }
    #[must_use]
    pub fn i2c(mut self, config: I2cConfig) -> Self {
        self.i2c = Some(config);
        self
    }
    #[must_use]
    pub fn byte_timeout(mut self, timeout: PollTimeout) -> Self {
        self.byte_timeout = Some(timeout);
        self
    }
    #[must_use]
    pub fn respond_timeout(mut self, timeout: PollTimeout) -> Self {
        self.respond_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn build(self) -> BridgeConfig {
        BridgeConfig {
            uart: self.uart,
            i2c: self.i2c.unwrap_or_else(|| I2cConfigBuilder::new().build()),
            byte_timeout: self.byte_timeout.unwrap_or_default(),
            respond_timeout: self.respond_timeout.unwrap_or_default(),
        }
    }
}
