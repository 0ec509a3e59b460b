use crate::address::DeviceAddress;

/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The address could not be resolved to any socket address.
    #[error("failed to resolve {address}: {source}")]
    Resolve {
        address: DeviceAddress,
        source: std::io::Error,
    },

    /// Failed to connect to the specified address.
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: DeviceAddress,
        source: std::io::Error,
    },

    /// The address string is not of the form `host:port`.
    #[error("invalid device address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: &'static str },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport has been shut down.
    #[error("transport shut down")]
    Shutdown,
}

pub type Result<T> = std::result::Result<T, TransportError>;
