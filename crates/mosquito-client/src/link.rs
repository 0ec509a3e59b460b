//! The single connection to the device and its reader thread.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use mosquito_frame::{FrameError, FrameReader, FrameWriter, Request};
use mosquito_transport::{DeviceAddress, DeviceStream, TcpTransport, TransportError};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::dispatch::{lock, CloseReason, DispatchTable};
use crate::error::{ClientError, Result};

const READER_THREAD_NAME: &str = "mosquito-reader";

struct ActiveLink {
    address: DeviceAddress,
    writer: FrameWriter<DeviceStream>,
    /// Handle used only to shut the socket down.
    control: DeviceStream,
    reader: JoinHandle<()>,
}

/// Owns the connection: at most one stream and one reader thread at a time.
pub struct Link {
    table: Arc<DispatchTable>,
    active: Mutex<Option<ActiveLink>>,
}

impl Link {
    pub fn new(table: Arc<DispatchTable>) -> Self {
        Self {
            table,
            active: Mutex::new(None),
        }
    }

    /// Connect to `config.address`, dropping any previous connection first.
    pub fn connect(&self, config: &ClientConfig) -> Result<()> {
        let mut active = lock(&self.active);
        if let Some(previous) = active.take() {
            debug!(address = %previous.address, "reconnecting, closing previous link");
            self.teardown(previous);
        }

        let stream = TcpTransport::connect(&config.address, config.connect_timeout)?;
        let control = stream.try_clone()?;
        let reader = FrameReader::for_device(stream.try_clone()?).map_err(setup_error)?;
        let writer =
            FrameWriter::for_device(stream, Some(config.send_timeout)).map_err(setup_error)?;

        self.table.reopen();
        let table = Arc::clone(&self.table);
        let spawned = thread::Builder::new()
            .name(READER_THREAD_NAME.to_string())
            .spawn(move || run_reader(reader, table));
        let reader = match spawned {
            Ok(handle) => handle,
            Err(err) => {
                self.table.close(CloseReason::Disconnected);
                let _ = control.shutdown();
                return Err(ClientError::Connect(TransportError::Io(err)));
            }
        };

        info!(address = %config.address, "link up");
        *active = Some(ActiveLink {
            address: config.address.clone(),
            writer,
            control,
            reader,
        });
        Ok(())
    }

    /// Close the connection and wait for the reader thread to exit.
    ///
    /// Pending round-trips fail with `Disconnected`. Does nothing when not
    /// connected.
    pub fn disconnect(&self) {
        let previous = lock(&self.active).take();
        if let Some(previous) = previous {
            self.teardown(previous);
        }
    }

    /// Write one request. Fails with `NotConnected` before touching the wire
    /// when there is no connection, or with the close reason once the
    /// reader has seen the stream end.
    pub fn send(&self, request: &Request) -> Result<()> {
        let mut active = lock(&self.active);
        let link = active.as_mut().ok_or(ClientError::NotConnected)?;
        if let Some(reason) = self.table.close_reason() {
            debug!(?reason, kind = %request.kind(), "stream already closed, not sending");
            return Err(reason.register_error());
        }
        link.writer
            .send(request)
            .map_err(ClientError::SendFailure)?;
        debug!(kind = %request.kind(), "request sent");
        Ok(())
    }

    /// Whether a connection exists and its reader is still running.
    pub fn is_connected(&self) -> bool {
        lock(&self.active)
            .as_ref()
            .is_some_and(|link| !link.reader.is_finished())
    }

    /// Address of the current connection.
    pub fn address(&self) -> Option<DeviceAddress> {
        lock(&self.active).as_ref().map(|link| link.address.clone())
    }

    fn teardown(&self, link: ActiveLink) {
        self.table.close(CloseReason::Disconnected);
        if let Err(err) = link.control.shutdown() {
            warn!(address = %link.address, error = %err, "socket shutdown failed");
        }
        if link.reader.join().is_err() {
            warn!(address = %link.address, "reader thread panicked");
        }
        info!(address = %link.address, "link down");
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Socket option failures while wrapping a fresh stream belong to connect.
fn setup_error(err: FrameError) -> ClientError {
    match err {
        FrameError::Io(source) => ClientError::Connect(TransportError::Io(source)),
        other => {
            ClientError::Connect(TransportError::Io(std::io::Error::other(other.to_string())))
        }
    }
}

/// Pull frames off the stream and hand them to the dispatch table until the
/// stream ends.
fn run_reader(mut reader: FrameReader<DeviceStream>, table: Arc<DispatchTable>) {
    debug!("reader started");
    let reason = loop {
        match reader.read_frame() {
            Ok(frame) => {
                table.dispatch(&frame);
            }
            Err(FrameError::ConnectionClosed) => break CloseReason::Closed,
            Err(FrameError::Io(err)) => break CloseReason::ReceiveFailure(err.to_string()),
            Err(err) => warn!(error = %err, "discarding corrupt frame"),
        }
    };
    debug!(?reason, "reader stopped");
    table.close(reason);
}
