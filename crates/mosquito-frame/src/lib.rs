//! MSP v1 framing and typed messages for the Mosquito flight controller.
//!
//! Every message on the wire is framed as:
//! - the 2-byte preamble `$M`
//! - a direction byte (`<` to the device, `>` from the device, `!` error)
//! - a 1-byte payload size and a 1-byte message kind
//! - the payload, followed by an XOR checksum
//!
//! [`MspParser`] decodes a byte at a time, [`Request`] and [`Message`] give
//! the typed view of what the host sends and what the device answers.

pub mod codec;
pub mod error;
pub mod kind;
pub mod message;
pub mod reader;
pub mod writer;

pub use codec::{
    checksum, decode_frame, encode_frame, Direction, Frame, MspParser, HEADER_SIZE, MAX_PAYLOAD,
    PREAMBLE,
};
pub use error::{FrameError, Result};
pub use kind::MessageKind;
pub use message::{Message, PidConstants, Request, PID_CONSTANT_COUNT};
pub use reader::FrameReader;
pub use writer::FrameWriter;
