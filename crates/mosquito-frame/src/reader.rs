use std::io::{ErrorKind, Read};

use mosquito_transport::DeviceStream;
use tracing::trace;

use crate::codec::{Frame, MspParser};
use crate::error::{FrameError, Result};

const READ_CHUNK_SIZE: usize = 1024;

/// Reads complete frames from any `Read` stream.
///
/// Bytes are pulled from the stream in chunks and handed to the parser one
/// at a time, so callers always get complete frames.
pub struct FrameReader<T> {
    inner: T,
    chunk: Box<[u8; READ_CHUNK_SIZE]>,
    pos: usize,
    len: usize,
    parser: MspParser,
}

impl<T: Read> FrameReader<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            chunk: Box::new([0u8; READ_CHUNK_SIZE]),
            pos: 0,
            len: 0,
            parser: MspParser::new(),
        }
    }

    /// Receive the next byte from the stream (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn receive_byte(&mut self) -> Result<u8> {
        while self.pos == self.len {
            let read = match self.inner.read(&mut self.chunk[..]) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };
            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }
            self.pos = 0;
            self.len = read;
        }

        let byte = self.chunk[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    /// Read the next complete frame (blocking).
    ///
    /// Codec errors (bad checksum, bad direction byte) are returned as they
    /// happen; the parser has already resynchronised, so the caller may keep
    /// reading.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            let byte = self.receive_byte()?;
            if let Some(frame) = self.parser.feed(byte)? {
                trace!(kind = frame.kind, len = frame.payload.len(), "frame decoded");
                return Ok(frame);
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl FrameReader<DeviceStream> {
    /// Create a frame reader that blocks until the device sends data.
    pub fn for_device(inner: DeviceStream) -> Result<Self> {
        inner.set_read_timeout(None).map_err(transport_to_frame_error)?;
        Ok(Self::new(inner))
    }
}

pub(crate) fn transport_to_frame_error(err: mosquito_transport::TransportError) -> FrameError {
    match err {
        mosquito_transport::TransportError::Io(io) => FrameError::Io(io),
        mosquito_transport::TransportError::Resolve { source, .. }
        | mosquito_transport::TransportError::Connect { source, .. } => FrameError::Io(source),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}
