//! Request/response correlation and device API for the Mosquito.
//!
//! The wire protocol carries no correlation ids: a reply is matched to its
//! request purely by message kind. This crate turns that asynchronous
//! stream into blocking calls:
//!
//! - [`Link`] owns the TCP connection and a background reader thread.
//! - [`DispatchTable`] holds at most one [`Subscriber`] per message kind.
//! - [`Correlator`] registers a one-shot [`Subscription`], sends the
//!   request and waits for the reply or a deadline.
//! - [`Mosquito`] is the device API built from those round-trips.

pub mod config;
pub mod correlator;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod link;
pub mod state;

pub use config::{ClientConfig, DEFAULT_TIMEOUT};
pub use correlator::{Correlator, Subscription};
pub use device::Mosquito;
pub use dispatch::{CloseReason, DispatchTable, SlotToken, Subscriber};
pub use error::{ClientError, Result};
pub use link::Link;
pub use state::{DeviceState, Leds, MOTOR_COUNT};

pub use mosquito_frame::{Message, MessageKind, PidConstants, Request};
pub use mosquito_transport::DeviceAddress;
