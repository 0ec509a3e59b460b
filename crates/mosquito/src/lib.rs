//! Host-side client for the Mosquito flight controller.
//!
//! The Mosquito talks MSP v1 over a TCP socket on its WiFi access point.
//! This crate bundles the layers of the workspace behind one dependency:
//!
//! - [`transport`]: TCP connection to the device
//! - [`frame`]: MSP framing and typed messages
//! - [`client`]: blocking request/response API ([`Mosquito`])
//!
//! ```no_run
//! use mosquito::{ClientConfig, Mosquito};
//!
//! let device = Mosquito::new(ClientConfig::default());
//! device.connect()?;
//! device.set_leds(Some(true), None, None)?;
//! let (roll, pitch, yaw) = device.get_attitude()?;
//! println!("roll={roll} pitch={pitch} yaw={yaw}");
//! device.disconnect();
//! # Ok::<(), mosquito::ClientError>(())
//! ```

/// Re-export transport types.
pub mod transport {
    pub use mosquito_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use mosquito_frame::*;
}

/// Re-export client types.
pub mod client {
    pub use mosquito_client::*;
}

pub use mosquito_client::{
    ClientConfig, ClientError, DeviceAddress, Leds, Mosquito, PidConstants, Result, MOTOR_COUNT,
};
