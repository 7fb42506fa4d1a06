// Licensed under the Apache-2.0 license

//! Host wire protocol: typed commands and responses, and the codec that
//! moves them over the byte transport.

pub mod codec;
pub mod command;

pub use codec::{decode, encode, encode_request, parse_response, send, FrameError};
pub use command::{Command, CommandId, Payload, Response, MAX_PAYLOAD};
