// Licensed under the Apache-2.0 license

//! Host link collaborator.
//!
//! The bridge only needs to move single bytes and to know whether the
//! receiver has one or the transmitter can take one. Readiness is expressed
//! with `nb`: `WouldBlock` means "flag not set yet", and the caller decides
//! how long to keep polling.

use crate::config::UartConfig;

pub trait ByteTransport {
    type Error: core::fmt::Debug;

    /// Configure the link. Called once from the adapter's startup state.
    fn init(&mut self, config: &UartConfig);

    /// Take one received byte, if the receiver holds one.
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error>;

    /// Hand one byte to the transmitter, if it can accept one.
    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error>;

    /// Complete once everything handed to the transmitter has left the wire.
    fn flush(&mut self) -> nb::Result<(), Self::Error>;
}

/// Adapts a HAL serial port implementing the `embedded_io` traits.
///
/// The port is assumed to be configured by its HAL already, so `init` does
/// nothing.
pub struct IoTransport<T> {
    port: T,
}

impl<T> IoTransport<T> {
    pub fn new(port: T) -> Self {
        Self { port }
    }

    pub fn release(self) -> T {
        self.port
    }
}

impl<T> ByteTransport for IoTransport<T>
where
    T: embedded_io::Read + embedded_io::ReadReady + embedded_io::Write + embedded_io::WriteReady,
{
    type Error = T::Error;

    fn init(&mut self, _config: &UartConfig) {}

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        if !self.port.read_ready()? {
            return Err(nb::Error::WouldBlock);
        }
        let mut byte = 0u8;
        match self.port.read(core::slice::from_mut(&mut byte))? {
            0 => Err(nb::Error::WouldBlock),
            _ => Ok(byte),
        }
    }

    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
        if !self.port.write_ready()? {
            return Err(nb::Error::WouldBlock);
        }
        match self.port.write(&[byte])? {
            0 => Err(nb::Error::WouldBlock),
            _ => Ok(()),
        }
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        self.port.flush()?;
        Ok(())
    }
}
