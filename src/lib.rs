// Licensed under the Apache-2.0 license

// Enforce Copilot coding guidelines - prevent panic-prone patterns in production code only
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::indexing_slicing))]
#![cfg_attr(not(test), warn(clippy::expect_used))]
#![cfg_attr(not(test), no_std)]

//! Serial-to-I2C bridge core.
//!
//! A host talks to the bridge over a byte transport. Each request frame is
//! decoded into a [`protocol::Command`], executed against the I2C bus (or
//! locally, for echo) and answered with a single response frame. Every wait on
//! the transport or the bus is bounded by a poll budget, so a stalled host or a
//! misbehaving device only ever costs one failed command.

pub mod adapter;
pub mod common;
pub mod config;
pub mod i2c;
pub mod protocol;
pub mod timeout;
pub mod transport;

#[cfg(test)]
mod testing;

pub use adapter::{Adapter, AdapterState, Phase};
pub use config::{BridgeConfig, BridgeConfigBuilder};
