// Licensed under the Apache-2.0 license

//! I2C master side of the bridge.
//!
//! The controller traits abstract the register-level bus peripheral, the
//! transaction engine sequences bus steps under poll budgets, and the scan
//! module probes address ranges for present devices.

pub mod common;
pub mod i2c_controller;
pub mod scan;
pub mod traits;
pub mod transaction;

pub use common::{AckMode, BusEvent, Direction, I2cConfig, I2cConfigBuilder, I2cSpeed};
pub use i2c_controller::I2cController;
pub use traits::{I2cBusControl, I2cBusController, I2cBusStatus, I2cHardwareCore};
pub use transaction::Error;
