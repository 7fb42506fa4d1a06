// Licensed under the Apache-2.0 license

//! Frame codec.
//!
//! Request layout, after the command identifier byte:
//!
//! | Command | Fields                          |
//! |---------|---------------------------------|
//! | Write   | address, register, N, N bytes   |
//! | Read    | address, register, N            |
//! | Detect  | M, M addresses (M = 0: default) |
//! | Echo    | N, N bytes                      |
//!
//! A response is a length byte followed by that many payload bytes, or a
//! lone `0x00` for a failure.
//!
//! Each byte after the identifier must arrive within the byte budget. A
//! frame that stalls is dropped whole: the caller never sees a partially
//! filled command.

use heapless::Vec;

use crate::protocol::command::{Command, CommandId, Payload, Response, MAX_PAYLOAD};
use crate::timeout::{poll_nb, PollError, PollTimeout};
use crate::transport::ByteTransport;

/// Longest request: identifier, address, register, count and a full payload.
pub const MAX_REQUEST_LEN: usize = 4 + MAX_PAYLOAD;

/// Longest response: length byte and a full payload.
pub const MAX_RESPONSE_LEN: usize = 1 + MAX_PAYLOAD;

/// Reasons no command could be decoded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameError<E> {
    /// No command identifier arrived; the host is idle. Not answered.
    Idle,
    /// The host stopped sending in the middle of a frame.
    Timeout,
    /// The identifier byte is not a known command.
    UnknownCommand(u8),
    /// The transport reported an error.
    Transport(E),
}

impl<E> From<PollError<E>> for FrameError<E> {
    fn from(err: PollError<E>) -> Self {
        match err {
            PollError::Expired => FrameError::Timeout,
            PollError::Other(e) => FrameError::Transport(e),
        }
    }
}

/// Receive one request frame.
///
/// # Errors
///
/// See [`FrameError`]. Every error other than `Idle` is answered with a
/// failure response by the adapter.
pub fn decode<T: ByteTransport>(
    transport: &mut T,
    timeout: PollTimeout,
) -> Result<Command, FrameError<T::Error>> {
    let id = match poll_nb(timeout, || transport.read_byte()) {
        Ok(id) => id,
        Err(PollError::Expired) => return Err(FrameError::Idle),
        Err(PollError::Other(e)) => return Err(FrameError::Transport(e)),
    };

    match CommandId::try_from(id).map_err(FrameError::UnknownCommand)? {
        CommandId::Write => {
            let address = read_one(transport, timeout)?;
            let register = read_one(transport, timeout)?;
            let count = read_one(transport, timeout)?;
            let payload = read_payload(transport, count, timeout)?;
            Ok(Command::Write {
                address,
                register,
                payload,
            })
        }
        CommandId::Read => {
            let address = read_one(transport, timeout)?;
            let register = read_one(transport, timeout)?;
            let count = read_one(transport, timeout)?;
            Ok(Command::Read {
                address,
                register,
                count,
            })
        }
        CommandId::Detect => {
            let count = read_one(transport, timeout)?;
            let addresses = read_payload(transport, count, timeout)?;
            Ok(Command::Detect { addresses })
        }
        CommandId::Echo => {
            let count = read_one(transport, timeout)?;
            let payload = read_payload(transport, count, timeout)?;
            Ok(Command::Echo { payload })
        }
    }
}

fn read_one<T: ByteTransport>(
    transport: &mut T,
    timeout: PollTimeout,
) -> Result<u8, FrameError<T::Error>> {
    Ok(poll_nb(timeout, || transport.read_byte())?)
}

fn read_payload<T: ByteTransport>(
    transport: &mut T,
    count: u8,
    timeout: PollTimeout,
) -> Result<Payload, FrameError<T::Error>> {
    let mut payload = Payload::new();
    for _ in 0..count {
        let byte = read_one(transport, timeout)?;
        // Capacity matches the largest count byte.
        let _ = payload.push(byte);
    }
    Ok(payload)
}

/// Serialise a response frame.
#[must_use]
pub fn encode(response: &Response) -> Vec<u8, MAX_RESPONSE_LEN> {
    let mut frame = Vec::new();
    match response {
        Response::Success(payload) => {
            let _ = frame.push(length_byte(payload.len()));
            let _ = frame.extend_from_slice(payload);
        }
        Response::Failure => {
            let _ = frame.push(0x00);
        }
    }
    frame
}

/// Push `frame` out through the transport and wait until it has left.
///
/// # Errors
///
/// `Timeout` if the transmitter stops accepting bytes or never completes.
pub fn send<T: ByteTransport>(
    transport: &mut T,
    frame: &[u8],
    timeout: PollTimeout,
) -> Result<(), FrameError<T::Error>> {
    for &byte in frame {
        poll_nb(timeout, || transport.write_byte(byte))?;
    }
    poll_nb(timeout, || transport.flush())?;
    Ok(())
}

/// Build the request frame a host sends for `command`.
#[must_use]
pub fn encode_request(command: &Command) -> Vec<u8, MAX_REQUEST_LEN> {
    let mut frame = Vec::new();
    let _ = frame.push(command.id() as u8);
    match command {
        Command::Write {
            address,
            register,
            payload,
        } => {
            let _ = frame.extend_from_slice(&[*address, *register, length_byte(payload.len())]);
            let _ = frame.extend_from_slice(payload);
        }
        Command::Read {
            address,
            register,
            count,
        } => {
            let _ = frame.extend_from_slice(&[*address, *register, *count]);
        }
        Command::Detect { addresses: bytes } | Command::Echo { payload: bytes } => {
            let _ = frame.push(length_byte(bytes.len()));
            let _ = frame.extend_from_slice(bytes);
        }
    }
    frame
}

/// Split a complete response frame into its payload.
///
/// Returns `None` if the frame is empty or its length does not match the
/// length byte. A lone `0x00` yields an empty payload: on the wire a failure
/// and an empty success look the same.
#[must_use]
pub fn parse_response(frame: &[u8]) -> Option<&[u8]> {
    let (&len, payload) = frame.split_first()?;
    (payload.len() == usize::from(len)).then_some(payload)
}

fn length_byte(len: usize) -> u8 {
    u8::try_from(len).unwrap_or(u8::MAX)
}
