// Licensed under the Apache-2.0 license

use heapless::Vec;

/// Largest payload, address list or read count a frame can carry.
pub const MAX_PAYLOAD: usize = 255;

pub type Payload = Vec<u8, MAX_PAYLOAD>;

/// First byte of every request frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandId {
    Write = 0x00,
    Read = 0x01,
    Detect = 0x02,
    Echo = 0x03,
}

impl TryFrom<u8> for CommandId {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(CommandId::Write),
            0x01 => Ok(CommandId::Read),
            0x02 => Ok(CommandId::Detect),
            0x03 => Ok(CommandId::Echo),
            other => Err(other),
        }
    }
}

/// A fully received host request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Write `payload` starting at `register` of the device at `address`.
    Write {
        address: u8,
        register: u8,
        payload: Payload,
    },
    /// Read `count` bytes starting at `register` of the device at `address`.
    Read { address: u8, register: u8, count: u8 },
    /// Probe `addresses`, or the default range when the list is empty.
    Detect { addresses: Payload },
    /// Send `payload` straight back.
    Echo { payload: Payload },
}

impl Command {
    #[must_use]
    pub fn id(&self) -> CommandId {
        match self {
            Command::Write { .. } => CommandId::Write,
            Command::Read { .. } => CommandId::Read,
            Command::Detect { .. } => CommandId::Detect,
            Command::Echo { .. } => CommandId::Echo,
        }
    }
}

/// Outcome of one command, as reported to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Success(Payload),
    /// Sent as a lone `0x00`; the cause is not reported.
    Failure,
}

impl Response {
    /// Success carrying a single byte.
    #[must_use]
    pub fn byte(value: u8) -> Self {
        let mut payload = Payload::new();
        let _ = payload.push(value);
        Response::Success(payload)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(_))
    }

    #[must_use]
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Response::Success(payload) => Some(payload),
            Response::Failure => None,
        }
    }
}
