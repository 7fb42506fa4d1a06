// Licensed under the Apache-2.0 license

//! Device scan built on the address-only probe.

use core::ops::RangeInclusive;

use heapless::Vec;

use crate::common::Logger;
use crate::i2c::common::MAX_SEVEN_BIT_ADDRESS;
use crate::i2c::i2c_controller::I2cController;
use crate::i2c::traits::I2cBusController;
use crate::i2c::transaction::Error;
use crate::protocol::command::MAX_PAYLOAD;

/// Addresses probed when no explicit list is given. 0x00-0x02 and
/// 0x78-0x7F are reserved by the bus specification.
pub const DEFAULT_SCAN_RANGE: RangeInclusive<u8> = 0x03..=0x77;

pub type AddressList = Vec<u8, MAX_PAYLOAD>;

impl<H: I2cBusController, L: Logger> I2cController<H, L> {
    /// Probe `addresses` in order, or [`DEFAULT_SCAN_RANGE`] when empty, and
    /// return the ones that acknowledged in the same order.
    ///
    /// Addresses that do not fit in 7 bits are skipped.
    ///
    /// # Errors
    ///
    /// A timeout on any probe aborts the whole scan.
    pub fn scan(&mut self, addresses: &[u8]) -> Result<AddressList, Error> {
        let mut found = AddressList::new();
        if addresses.is_empty() {
            for address in DEFAULT_SCAN_RANGE {
                self.scan_one(address, &mut found)?;
            }
        } else {
            for &address in addresses {
                if address > MAX_SEVEN_BIT_ADDRESS {
                    continue;
                }
                self.scan_one(address, &mut found)?;
            }
        }
        self.logger
            .info(format_args!("scan found {} device(s)", found.len()));
        Ok(found)
    }

    fn scan_one(&mut self, address: u8, found: &mut AddressList) -> Result<(), Error> {
        if self.probe(address)? {
            // At most one entry per probed address, and never more than 255 probes.
            let _ = found.push(address);
        }
        Ok(())
    }
}
