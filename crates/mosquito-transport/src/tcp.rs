use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::address::DeviceAddress;
use crate::error::{Result, TransportError};
use crate::stream::DeviceStream;

/// TCP transport to a Mosquito.
pub struct TcpTransport;

impl TcpTransport {
    /// Connect to the device, trying every resolved address in turn.
    ///
    /// `timeout` bounds each connection attempt. The returned stream has no
    /// read or write timeout set.
    pub fn connect(address: &DeviceAddress, timeout: Duration) -> Result<DeviceStream> {
        let candidates = (address.host.as_str(), address.port)
            .to_socket_addrs()
            .map_err(|source| TransportError::Resolve {
                address: address.clone(),
                source,
            })?;

        let mut last_err = None;
        for candidate in candidates {
            debug!(%address, %candidate, ?timeout, "connecting");
            match TcpStream::connect_timeout(&candidate, timeout) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    info!(%address, %candidate, "connected to device");
                    return Ok(DeviceStream::from_tcp(stream));
                }
                Err(err) => {
                    debug!(%candidate, error = %err, "connection attempt failed");
                    last_err = Some(err);
                }
            }
        }

        Err(TransportError::Connect {
            address: address.clone(),
            source: last_err.unwrap_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::AddrNotAvailable,
                    "address resolved to no socket addresses",
                )
            }),
        })
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "tcp"
    }
}
