#![allow(dead_code)]

use std::io::Write;
use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bytes::BytesMut;
use mosquito_client::{ClientConfig, DeviceAddress, Message, MessageKind, Mosquito, Request};
use mosquito_frame::{encode_frame, Direction, FrameReader};

/// In-process stand-in for a Mosquito: accepts one connection, decodes
/// every request and writes back whatever bytes the responder returns.
pub struct StubDevice {
    pub address: DeviceAddress,
    requests: Receiver<Request>,
    handle: Option<JoinHandle<()>>,
}

impl StubDevice {
    pub fn spawn<F>(respond: F) -> Self
    where
        F: FnMut(&Request) -> Vec<Vec<u8>> + Send + 'static,
    {
        Self::serve(1, respond)
    }

    /// Like [`StubDevice::spawn`] but accepts `connections` clients one
    /// after the other before exiting.
    pub fn serve<F>(connections: usize, mut respond: F) -> Self
    where
        F: FnMut(&Request) -> Vec<Vec<u8>> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("stub should bind");
        let port = listener.local_addr().expect("stub address").port();
        let (tx, requests) = mpsc::channel();

        let handle = thread::spawn(move || {
            for _ in 0..connections {
                let Ok((stream, _)) = listener.accept() else {
                    return;
                };
                let mut writer = stream.try_clone().expect("stub stream should clone");
                let mut reader = FrameReader::new(stream);
                while let Ok(frame) = reader.read_frame() {
                    let Ok(request) = Request::decode(&frame) else {
                        continue;
                    };
                    let replies = respond(&request);
                    let _ = tx.send(request);
                    if replies.iter().any(|reply| reply.is_empty()) {
                        // An empty reply asks the stub to hang up.
                        break;
                    }
                    for reply in replies {
                        if writer.write_all(&reply).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            address: DeviceAddress::new("127.0.0.1", port),
            requests,
            handle: Some(handle),
        }
    }

    /// A device that closes the connection on the first request.
    pub fn hang_up() -> Self {
        Self::spawn(|_| vec![Vec::new()])
    }

    /// A device that never answers.
    pub fn silent() -> Self {
        Self::spawn(|_| Vec::new())
    }

    /// A device that remembers commanded motors and LEDs and reports them
    /// back, with a fixed attitude of (0.1, 0.2, 0.3).
    pub fn echo() -> Self {
        let mut motors = [0.0f32; 4];
        Self::spawn(move |request| match request {
            Request::SetMotors(values) => {
                motors = *values;
                Vec::new()
            }
            Request::Query(MessageKind::GetMotorNormal) => vec![encoded(&Message::Motors(motors))],
            Request::Query(MessageKind::AttitudeRadians) => vec![encoded(&Message::Attitude {
                roll: 0.1,
                pitch: 0.2,
                yaw: 0.3,
            })],
            Request::Query(MessageKind::FirmwareVersion) => {
                vec![encoded(&Message::FirmwareVersion(2))]
            }
            _ => Vec::new(),
        })
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.address.clone()).with_timeout(Duration::from_secs(2))
    }

    pub fn connect(&self) -> Mosquito {
        let device = Mosquito::new(self.config());
        device.connect().expect("should connect to stub");
        device
    }

    /// Next request the stub decoded, if one arrives within `timeout`.
    pub fn next_request(&self, timeout: Duration) -> Option<Request> {
        match self.requests.recv_timeout(timeout) {
            Ok(request) => Some(request),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Wait for the stub thread to exit (after the client disconnects).
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("stub thread should not panic");
        }
    }
}

pub fn encoded(message: &Message) -> Vec<u8> {
    let mut buf = BytesMut::new();
    message.encode(&mut buf).expect("reply should encode");
    buf.to_vec()
}

pub fn rejected(kind: MessageKind) -> Vec<u8> {
    let mut buf = BytesMut::new();
    encode_frame(Direction::Error, kind.id(), &[], &mut buf).expect("error frame should encode");
    buf.to_vec()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
