use std::io::{ErrorKind, Write};
use std::time::Duration;

use bytes::BytesMut;
use mosquito_transport::DeviceStream;

use crate::codec::{encode_frame, Frame};
use crate::error::{FrameError, Result};
use crate::message::{Message, Request};
use crate::reader::transport_to_frame_error;

const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Writes complete frames to any `Write` stream.
///
/// A frame is encoded in full before the first byte is written, so an
/// encoding error never leaves a partial frame on the wire.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Write> FrameWriter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Encode and send a host request.
    pub fn send(&mut self, request: &Request) -> Result<()> {
        self.buf.clear();
        request.encode(&mut self.buf)?;
        self.write_buffered()
    }

    /// Encode and send a device reply.
    pub fn reply(&mut self, message: &Message) -> Result<()> {
        self.buf.clear();
        message.encode(&mut self.buf)?;
        self.write_buffered()
    }

    /// Write an already decoded frame back onto the wire.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.buf.clear();
        encode_frame(frame.direction, frame.kind, &frame.payload, &mut self.buf)?;
        self.write_buffered()
    }

    fn write_buffered(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl FrameWriter<DeviceStream> {
    /// Create a frame writer whose writes fail after `write_timeout`.
    pub fn for_device(inner: DeviceStream, write_timeout: Option<Duration>) -> Result<Self> {
        inner
            .set_write_timeout(write_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::new(inner))
    }
}
