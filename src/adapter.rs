// Licensed under the Apache-2.0 license

//! Protocol state machine.
//!
//! The adapter cycles RECEIVE → EXECUTE → RESPOND → RECEIVE forever after a
//! single STARTUP. States are data: [`AdapterState::Execute`] owns the
//! command it was handed and [`AdapterState::Respond`] owns the response, so
//! the next RECEIVE can never overwrite a frame that is still being acted
//! on. [`Adapter::step`] is the transition function; [`Adapter::run`] just
//! applies it in a loop.

use crate::common::{Logger, NoOpLogger};
use crate::config::{BridgeConfig, UartConfig};
use crate::i2c::i2c_controller::I2cController;
use crate::i2c::traits::I2cBusController;
use crate::protocol::codec::{self, FrameError};
use crate::protocol::command::{Command, Payload, Response};
use crate::timeout::PollTimeout;
use crate::transport::ByteTransport;

/// Which phase the adapter is in, without the data the phase carries.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Startup,
    Receive,
    Execute,
    Respond,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdapterState {
    /// Bring up transport and bus. Entered once, at boot.
    Startup,
    /// Wait for the next request frame.
    Receive,
    /// Run a fully received command.
    Execute(Command),
    /// Send the outcome back to the host.
    Respond(Response),
}

impl AdapterState {
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            AdapterState::Startup => Phase::Startup,
            AdapterState::Receive => Phase::Receive,
            AdapterState::Execute(_) => Phase::Execute,
            AdapterState::Respond(_) => Phase::Respond,
        }
    }
}

/// Everything one bridge instance owns: the host link, the I2C controller
/// and the link-side settings.
pub struct Adapter<T: ByteTransport, H: I2cBusController, L: Logger = NoOpLogger> {
    transport: T,
    i2c: I2cController<H, L>,
    uart: UartConfig,
    byte_timeout: PollTimeout,
    respond_timeout: PollTimeout,
}

impl<T: ByteTransport, H: I2cBusController> Adapter<T, H, NoOpLogger> {
    pub fn new(transport: T, hardware: H, config: BridgeConfig) -> Self {
        Self::with_logger(transport, hardware, config, NoOpLogger)
    }
}

impl<T: ByteTransport, H: I2cBusController, L: Logger> Adapter<T, H, L> {
    pub fn with_logger(transport: T, hardware: H, config: BridgeConfig, logger: L) -> Self {
        Self {
            transport,
            i2c: I2cController::with_logger(hardware, config.i2c, logger),
            uart: config.uart,
            byte_timeout: config.byte_timeout,
            respond_timeout: config.respond_timeout,
        }
    }

    /// Hand back the transport and bus peripheral.
    pub fn release(self) -> (T, H) {
        (self.transport, self.i2c.hardware)
    }

    /// Perform one state's work and return the state to enter next.
    pub fn step(&mut self, state: AdapterState) -> AdapterState {
        match state {
            AdapterState::Startup => {
                self.startup();
                AdapterState::Receive
            }
            AdapterState::Receive => self.receive(),
            AdapterState::Execute(command) => AdapterState::Respond(self.execute(command)),
            AdapterState::Respond(response) => {
                self.respond(&response);
                AdapterState::Receive
            }
        }
    }

    /// Boot and serve commands forever.
    pub fn run(mut self) -> ! {
        let mut state = AdapterState::Startup;
        loop {
            state = self.step(state);
        }
    }

    /// Serve a single request, starting in RECEIVE. Returns the response
    /// that was sent, or `None` if the host stayed silent.
    pub fn serve_one(&mut self) -> Option<Response> {
        let mut state = self.step(AdapterState::Receive);
        loop {
            match state {
                AdapterState::Receive | AdapterState::Startup => return None,
                AdapterState::Respond(response) => {
                    self.respond(&response);
                    return Some(response);
                }
                other => state = self.step(other),
            }
        }
    }

    fn startup(&mut self) {
        self.transport.init(&self.uart);
        self.i2c.init();
        self.i2c.logger.info(format_args!(
            "bridge ready, host link at {} baud",
            self.uart.baud_rate
        ));
    }

    fn receive(&mut self) -> AdapterState {
        match codec::decode(&mut self.transport, self.byte_timeout) {
            Ok(command) => {
                self.i2c
                    .logger
                    .debug(format_args!("command {:?}", command.id()));
                AdapterState::Execute(command)
            }
            Err(FrameError::Idle) => AdapterState::Receive,
            Err(err) => {
                self.i2c
                    .logger
                    .warn(format_args!("request dropped: {:?}", err));
                AdapterState::Respond(Response::Failure)
            }
        }
    }

    /// Run `command` and produce the response the host will see. Every bus
    /// error collapses into [`Response::Failure`].
    pub fn execute(&mut self, command: Command) -> Response {
        match command {
            Command::Write {
                address,
                register,
                payload,
            } => match self.i2c.write_register(address, register, &payload) {
                Ok(()) => Response::byte(u8::try_from(payload.len()).unwrap_or(u8::MAX)),
                Err(_) => Response::Failure,
            },
            Command::Read {
                address,
                register,
                count,
            } => {
                let mut buffer = Payload::new();
                let _ = buffer.resize(usize::from(count), 0);
                match self.i2c.read_register(address, register, &mut buffer) {
                    Ok(()) => Response::Success(buffer),
                    Err(_) => Response::Failure,
                }
            }
            Command::Detect { addresses } => match self.i2c.scan(&addresses) {
                Ok(found) => Response::Success(found),
                Err(_) => Response::Failure,
            },
            Command::Echo { payload } => Response::Success(payload),
        }
    }

    fn respond(&mut self, response: &Response) {
        let frame = codec::encode(response);
        if let Err(err) = codec::send(&mut self.transport, &frame, self.respond_timeout) {
            self.i2c
                .logger
                .error(format_args!("response not sent: {:?}", err));
        }
    }
}
