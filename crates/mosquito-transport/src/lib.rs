//! TCP transport to a Mosquito flight controller.
//!
//! The Mosquito exposes a single TCP endpoint on its WiFi access point
//! (`192.168.4.1:80` by default). This crate owns establishing that
//! connection and hands out a [`DeviceStream`] that the framing layer reads
//! from and writes to.
//!
//! This is the lowest layer of the workspace. Everything else builds on top
//! of the [`DeviceStream`] type provided here.

pub mod address;
pub mod error;
pub mod stream;
pub mod tcp;

pub use address::{DeviceAddress, DEFAULT_HOST, DEFAULT_PORT};
pub use error::{Result, TransportError};
pub use stream::DeviceStream;
pub use tcp::TcpTransport;
