use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::kind::MessageKind;

/// Frame header: preamble (2) + direction (1) + size (1) + kind (1) = 5 bytes.
pub const HEADER_SIZE: usize = 5;

/// Preamble bytes: "$M" (0x24 0x4D).
pub const PREAMBLE: [u8; 2] = *b"$M";

/// Largest payload a one-byte size field can describe.
pub const MAX_PAYLOAD: usize = u8::MAX as usize;

/// Which way a frame travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Host to device (`<`).
    ToDevice,
    /// Device to host (`>`).
    FromDevice,
    /// Device rejected the request (`!`).
    Error,
}

impl Direction {
    pub fn as_byte(self) -> u8 {
        match self {
            Direction::ToDevice => b'<',
            Direction::FromDevice => b'>',
            Direction::Error => b'!',
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'<' => Some(Direction::ToDevice),
            b'>' => Some(Direction::FromDevice),
            b'!' => Some(Direction::Error),
            _ => None,
        }
    }
}

/// A complete MSP frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub direction: Direction,
    /// Raw kind id. Kinds outside the device dictionary are still framed.
    pub kind: u8,
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(direction: Direction, kind: MessageKind, payload: impl Into<Bytes>) -> Self {
        Self {
            direction,
            kind: kind.id(),
            payload: payload.into(),
        }
    }

    /// The dictionary entry for this frame's kind, if any.
    pub fn message_kind(&self) -> Option<MessageKind> {
        MessageKind::from_id(self.kind)
    }

    /// The total wire size of this frame (header + payload + checksum).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len() + 1
    }
}

/// XOR checksum over size, kind and payload.
pub fn checksum(size: u8, kind: u8, payload: &[u8]) -> u8 {
    payload.iter().fold(size ^ kind, |acc, byte| acc ^ byte)
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────┬─────┬──────┬──────┬──────────────┬──────────┐
/// │ Preamble │ Dir │ Size │ Kind │ Payload      │ Checksum │
/// │ "$M"     │ 1B  │ 1B   │ 1B   │ (Size bytes) │ 1B (XOR) │
/// └──────────┴─────┴──────┴──────┴──────────────┴──────────┘
/// ```
pub fn encode_frame(
    direction: Direction,
    kind: u8,
    payload: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    let size = payload.len() as u8;
    dst.reserve(HEADER_SIZE + payload.len() + 1);
    dst.put_slice(&PREAMBLE);
    dst.put_u8(direction.as_byte());
    dst.put_u8(size);
    dst.put_u8(kind);
    dst.put_slice(payload);
    dst.put_u8(checksum(size, kind, payload));
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Bytes before the next `$` are discarded. Returns `Ok(None)` if the buffer
/// doesn't contain a complete frame yet. On success or on a corrupt frame,
/// consumes the frame bytes from the buffer so decoding can continue.
pub fn decode_frame(src: &mut BytesMut) -> Result<Option<Frame>> {
    match src.iter().position(|&byte| byte == PREAMBLE[0]) {
        Some(start) => src.advance(start),
        None => {
            src.clear();
            return Ok(None);
        }
    }

    if src.len() < HEADER_SIZE {
        return Ok(None); // Need more data
    }

    if src[1] != PREAMBLE[1] {
        src.advance(1);
        return decode_frame(src);
    }

    let direction = match Direction::from_byte(src[2]) {
        Some(direction) => direction,
        None => {
            let byte = src[2];
            src.advance(1);
            return Err(FrameError::InvalidDirection(byte));
        }
    };

    let size = src[3];
    let kind = src[4];
    let total = HEADER_SIZE + size as usize + 1;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    let expected = checksum(size, kind, &src[HEADER_SIZE..total - 1]);
    let actual = src[total - 1];
    if expected != actual {
        src.advance(total);
        return Err(FrameError::ChecksumMismatch {
            kind,
            expected,
            actual,
        });
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(size as usize).freeze();
    src.advance(1);

    Ok(Some(Frame {
        direction,
        kind,
        payload,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Idle,
    Preamble,
    Direction,
    Size,
    Kind,
    Payload,
    Checksum,
}

/// Incremental MSP decoder fed one byte at a time.
///
/// The parser never fails permanently: after an error it is back in its idle
/// state, waiting for the next `$`.
#[derive(Debug)]
pub struct MspParser {
    state: ParserState,
    direction: Direction,
    size: u8,
    kind: u8,
    checksum: u8,
    payload: BytesMut,
}

impl Default for MspParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MspParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::Idle,
            direction: Direction::FromDevice,
            size: 0,
            kind: 0,
            checksum: 0,
            payload: BytesMut::with_capacity(MAX_PAYLOAD),
        }
    }

    /// Feed one byte.
    ///
    /// Returns `Ok(Some(frame))` when the byte completes a frame, `Ok(None)`
    /// while a frame is incomplete (or the byte was skipped as noise), and an
    /// error when the byte proves the current frame corrupt.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>> {
        match self.state {
            ParserState::Idle => {
                if byte == PREAMBLE[0] {
                    self.state = ParserState::Preamble;
                }
            }
            ParserState::Preamble => {
                self.state = match byte {
                    b'M' => ParserState::Direction,
                    b'$' => ParserState::Preamble,
                    _ => ParserState::Idle,
                };
            }
            ParserState::Direction => match Direction::from_byte(byte) {
                Some(direction) => {
                    self.direction = direction;
                    self.state = ParserState::Size;
                }
                None => {
                    self.reset();
                    return Err(FrameError::InvalidDirection(byte));
                }
            },
            ParserState::Size => {
                self.size = byte;
                self.checksum = byte;
                self.payload.clear();
                self.state = ParserState::Kind;
            }
            ParserState::Kind => {
                self.kind = byte;
                self.checksum ^= byte;
                self.state = if self.size == 0 {
                    ParserState::Checksum
                } else {
                    ParserState::Payload
                };
            }
            ParserState::Payload => {
                self.payload.put_u8(byte);
                self.checksum ^= byte;
                if self.payload.len() == self.size as usize {
                    self.state = ParserState::Checksum;
                }
            }
            ParserState::Checksum => {
                let expected = self.checksum;
                let kind = self.kind;
                let direction = self.direction;
                let payload = self.payload.split().freeze();
                self.reset();
                if byte != expected {
                    return Err(FrameError::ChecksumMismatch {
                        kind,
                        expected,
                        actual: byte,
                    });
                }
                return Ok(Some(Frame {
                    direction,
                    kind,
                    payload,
                }));
            }
        }
        Ok(None)
    }

    /// Whether the parser is between frames.
    pub fn is_idle(&self) -> bool {
        self.state == ParserState::Idle
    }

    fn reset(&mut self) {
        self.state = ParserState::Idle;
        self.size = 0;
        self.kind = 0;
        self.checksum = 0;
        self.payload.clear();
    }
}
