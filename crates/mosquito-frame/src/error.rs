use crate::kind::MessageKind;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The byte after `$M` is not a known direction marker.
    #[error("invalid frame direction byte 0x{0:02x}")]
    InvalidDirection(u8),

    /// The trailing checksum does not match the frame contents.
    #[error("checksum mismatch for kind {kind} (expected 0x{expected:02x}, got 0x{actual:02x})")]
    ChecksumMismatch { kind: u8, expected: u8, actual: u8 },

    /// The payload exceeds what a one-byte size field can describe.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The payload length does not match the layout of the message kind.
    #[error("{kind} payload has {actual} bytes, expected {expected}")]
    PayloadLength {
        kind: MessageKind,
        expected: usize,
        actual: usize,
    },

    /// The message kind id is not part of the device dictionary.
    #[error("unknown message kind {0}")]
    UnknownKind(u8),

    /// The frame is well formed but carries a kind that cannot be decoded in
    /// this direction (e.g. a command kind inside a device reply).
    #[error("unexpected {0} frame")]
    UnexpectedKind(MessageKind),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete frame was received.
    #[error("connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
