use std::time::Duration;

use mosquito_frame::{FrameError, MessageKind};
use mosquito_transport::TransportError;

/// Errors surfaced by device operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The operation needs a live connection and there is none.
    #[error("not connected to a Mosquito")]
    NotConnected,

    /// Establishing the connection failed.
    #[error("connect failed: {0}")]
    Connect(#[from] TransportError),

    /// Writing a request failed or timed out.
    #[error("send failed: {0}")]
    SendFailure(#[source] FrameError),

    /// Reading from the device failed.
    #[error("receive failed: {0}")]
    ReceiveFailure(String),

    /// The device closed the connection.
    #[error("connection closed by device")]
    Closed,

    /// No reply of the expected kind arrived before the deadline.
    #[error("no {kind} reply after {after:?}")]
    Timeout { kind: MessageKind, after: Duration },

    /// An argument was outside the range the device accepts.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The pending request was abandoned because of an explicit disconnect.
    #[error("disconnected while waiting for a reply")]
    Disconnected,

    /// The device answered with an MSP error frame.
    #[error("device rejected {0} request")]
    DeviceRejected(MessageKind),

    /// The reply could not be decoded.
    #[error("malformed reply: {0}")]
    Frame(#[from] FrameError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
