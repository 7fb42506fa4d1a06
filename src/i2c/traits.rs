// Licensed under the Apache-2.0 license

//! # I2C Bus Controller Traits
//!
//! The bridge drives the bus through a register-level controller: it raises
//! start and stop conditions, loads the data register and polls status
//! flags. These traits describe that controller as a set of small,
//! composable responsibilities so that a board crate only has to map them
//! onto its peripheral registers.
//!
//! ## Trait Hierarchy
//!
//! ```text
//! I2cHardwareCore (one-shot setup)
//!     ├── I2cBusControl (conditions, address/data registers, ack mode)
//!     ├── I2cBusStatus  (event and flag polling)
//!     └── I2cBusController (control + status, blanket impl)
//! ```
//!
//! None of the methods block. Waiting, and giving up on waiting, is the job
//! of the transaction engine in [`crate::i2c::transaction`].

use crate::i2c::common::{AckMode, BusEvent, Direction, I2cConfig};

/// Peripheral bring-up.
pub trait I2cHardwareCore {
    /// Initialise the controller as a 7-bit-addressing master with the given
    /// configuration. Called once from the adapter's startup state.
    fn init(&mut self, config: &I2cConfig);
}

/// Actions the master can take on the bus.
pub trait I2cBusControl: I2cHardwareCore {
    /// Request a start (or repeated start) condition.
    fn generate_start(&mut self);

    /// Request a stop condition after the current byte.
    fn generate_stop(&mut self);

    /// Load the address register with a 7-bit address and direction bit.
    fn send_address(&mut self, address: u8, direction: Direction);

    /// Load the data register with the next byte to transmit.
    fn send_byte(&mut self, byte: u8);

    /// Take the last received byte out of the data register.
    fn receive_byte(&mut self) -> u8;

    /// Select whether received bytes are acknowledged.
    fn set_ack_mode(&mut self, mode: AckMode);

    /// Clear a latched acknowledge-failure flag.
    fn clear_ack_failure(&mut self);
}

/// Status polling.
///
/// Methods take `&mut self` because reading status registers may clear
/// flags on real hardware.
pub trait I2cBusStatus: I2cHardwareCore {
    /// Another transaction is in progress on the bus.
    fn is_bus_busy(&mut self) -> bool;

    /// The addressed device did not acknowledge.
    fn ack_failure(&mut self) -> bool;

    /// The controller currently reports `event`.
    fn check_event(&mut self, event: BusEvent) -> bool;
}

/// A complete bus controller usable by the transaction engine.
pub trait I2cBusController: I2cBusControl + I2cBusStatus {}

/// Blanket implementation: anything that can both drive and report the bus is a controller
impl<T> I2cBusController for T where T: I2cBusControl + I2cBusStatus {}
