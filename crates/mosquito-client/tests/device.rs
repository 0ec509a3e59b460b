mod common;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use common::{encoded, init_tracing, rejected, StubDevice};
use mosquito_client::{ClientError, Leds, Message, MessageKind, Mosquito, PidConstants, Request};

const WAIT: Duration = Duration::from_secs(2);

#[test]
fn set_motor_merges_into_cached_tuple() {
    init_tracing();
    let stub = StubDevice::echo();
    let device = stub.connect();

    device.set_motors([0.1, 0.2, 0.3, 0.4]).unwrap();
    for (index, value) in [(1, 0.9), (3, 0.0), (4, 1.0), (2, 0.25)] {
        let before = device.motors();
        device.set_motor(index, value).unwrap();

        let mut expected = before;
        expected[index - 1] = value;
        assert_eq!(device.get_motors().unwrap(), expected);
        assert_eq!(device.get_motor(index).unwrap(), value);
    }

    let sent: Vec<Request> = std::iter::from_fn(|| stub.next_request(WAIT))
        .filter(|request| matches!(request, Request::SetMotors(_)))
        .take(5)
        .collect();
    assert_eq!(sent.last(), Some(&Request::SetMotors([0.9, 0.25, 0.0, 1.0])));

    device.disconnect();
    stub.join();
}

#[test]
fn set_leds_keeps_omitted_channels() {
    init_tracing();
    let stub = StubDevice::echo();
    let device = stub.connect();

    device.set_leds(Some(false), Some(false), Some(false)).unwrap();
    device.set_leds(None, None, Some(true)).unwrap();

    assert_eq!(
        device.leds(),
        Leds {
            red: false,
            green: false,
            blue: true
        }
    );
    assert_eq!(
        stub.next_request(WAIT),
        Some(Request::SetLeds {
            red: false,
            green: false,
            blue: false
        })
    );
    assert_eq!(
        stub.next_request(WAIT),
        Some(Request::SetLeds {
            red: false,
            green: false,
            blue: true
        })
    );

    device.disconnect();
    stub.join();
}

#[test]
fn attitude_inverts_pitch() {
    init_tracing();
    let stub = StubDevice::echo();
    let device = stub.connect();

    assert_eq!(device.get_attitude().unwrap(), (0.1, -0.2, 0.3));
    assert_eq!(
        stub.next_request(WAIT),
        Some(Request::Query(MessageKind::AttitudeRadians))
    );

    device.disconnect();
    stub.join();
}

#[test]
fn silent_device_times_out_within_deadline() {
    init_tracing();
    let stub = StubDevice::silent();
    let device = Mosquito::new(stub.config().with_reply_timeout(Duration::from_millis(200)));
    device.connect().unwrap();

    let start = Instant::now();
    let result = device.get_firmware_version();
    let elapsed = start.elapsed();

    assert!(matches!(
        result,
        Err(ClientError::Timeout {
            kind: MessageKind::FirmwareVersion,
            ..
        })
    ));
    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");

    device.disconnect();
    stub.join();
}

fn interleaved_replies(attitude_first: bool) {
    let mut pending: Vec<MessageKind> = Vec::new();
    let stub = StubDevice::spawn(move |request| {
        if let Request::Query(kind) = request {
            pending.push(*kind);
        }
        if pending.len() < 2 {
            return Vec::new();
        }
        let attitude = encoded(&Message::Attitude {
            roll: 1.0,
            pitch: 2.0,
            yaw: 3.0,
        });
        let version = encoded(&Message::FirmwareVersion(9));
        pending.clear();
        if attitude_first {
            vec![attitude, version]
        } else {
            vec![version, attitude]
        }
    });
    let device = Arc::new(stub.connect());

    let attitude = {
        let device = Arc::clone(&device);
        thread::spawn(move || device.get_attitude())
    };
    let version = {
        let device = Arc::clone(&device);
        thread::spawn(move || device.get_firmware_version())
    };

    assert_eq!(attitude.join().unwrap().unwrap(), (1.0, -2.0, 3.0));
    assert_eq!(version.join().unwrap().unwrap(), 9);

    device.disconnect();
    stub.join();
}

#[test]
fn concurrent_kinds_complete_in_either_reply_order() {
    init_tracing();
    interleaved_replies(true);
    interleaved_replies(false);
}

#[test]
fn disconnect_resolves_pending_round_trip() {
    init_tracing();
    let stub = StubDevice::silent();
    let device = Arc::new(Mosquito::new(
        stub.config().with_reply_timeout(Duration::from_secs(30)),
    ));
    device.connect().unwrap();

    let pending = {
        let device = Arc::clone(&device);
        thread::spawn(move || {
            let start = Instant::now();
            (device.get_pid(), start.elapsed())
        })
    };
    assert_eq!(
        stub.next_request(WAIT),
        Some(Request::Query(MessageKind::PidConstants))
    );

    device.disconnect();
    let (result, elapsed) = pending.join().unwrap();

    assert!(matches!(result, Err(ClientError::Disconnected)));
    assert!(elapsed < Duration::from_secs(10));
    assert!(!device.is_connected());
    stub.join();
}

#[test]
fn commands_after_disconnect_fail_without_writing() {
    init_tracing();
    let stub = StubDevice::echo();
    let device = stub.connect();
    device.disconnect();

    assert!(matches!(device.arm(), Err(ClientError::NotConnected)));
    assert!(matches!(
        device.set_motor(1, 0.5),
        Err(ClientError::NotConnected)
    ));
    assert!(matches!(
        device.get_motors(),
        Err(ClientError::NotConnected)
    ));
    assert_eq!(device.motors(), [0.0; 4]);

    stub.join();
}

#[test]
fn unsolicited_frames_do_not_satisfy_waiter() {
    init_tracing();
    let stub = StubDevice::spawn(|request| match request {
        Request::Query(MessageKind::Velocities) => vec![
            encoded(&Message::Motors([0.5; 4])),
            b"\x00noise$M".to_vec(),
            encoded(&Message::FirmwareVersion(1)),
            encoded(&Message::Velocities([0.5, -0.5, 0.0])),
        ],
        _ => Vec::new(),
    });
    let device = stub.connect();

    assert_eq!(device.get_velocities().unwrap(), (0.5, -0.5, 0.0));
    assert_eq!(device.motors(), [0.0; 4], "unsolicited motors are not cached");

    device.disconnect();
    stub.join();
}

#[test]
fn device_error_frame_is_surfaced() {
    init_tracing();
    let stub = StubDevice::spawn(|request| match request {
        Request::Query(kind) => vec![rejected(*kind)],
        _ => Vec::new(),
    });
    let device = stub.connect();

    assert!(matches!(
        device.position_board_connected(),
        Err(ClientError::DeviceRejected(
            MessageKind::PositionBoardConnected
        ))
    ));

    device.disconnect();
    stub.join();
}

#[test]
fn pid_constants_round_trip_through_cache() {
    init_tracing();
    let constants = PidConstants {
        rate_roll_p: 0.05,
        rate_roll_i: 0.4,
        rate_d2r: 6.0,
        level_p: 1.0,
        ..PidConstants::default()
    };
    let stub = StubDevice::spawn(move |request| match request {
        Request::Query(MessageKind::PidConstants) => {
            vec![encoded(&Message::PidConstants(constants))]
        }
        _ => Vec::new(),
    });
    let device = stub.connect();

    device.set_pid(&constants).unwrap();
    assert_eq!(stub.next_request(WAIT), Some(Request::SetPid(constants)));
    assert_eq!(device.get_pid().unwrap(), constants);
    assert_eq!(device.pid(), Some(constants));

    device.disconnect();
    stub.join();
}

#[test]
fn fire_and_forget_commands_reach_device() {
    init_tracing();
    let stub = StubDevice::silent();
    let device = stub.connect();

    device.arm().unwrap();
    device.calibrate_escs().unwrap();
    device.calibrate_transmitter(1).unwrap();
    device.set_mosquito_version(true).unwrap();
    device.set_position_board(false).unwrap();
    device.disarm().unwrap();

    let expected = [
        Request::SetArmed(true),
        Request::CalibrateEscs,
        Request::CalibrateTransmitter(1),
        Request::SetMosquitoVersion(true),
        Request::SetPositionBoard(false),
        Request::SetArmed(false),
    ];
    for request in expected {
        assert_eq!(stub.next_request(WAIT), Some(request));
    }

    device.disconnect();
    stub.join();
}

#[test]
fn device_hang_up_fails_pending_round_trip() {
    init_tracing();
    let stub = StubDevice::hang_up();
    let device = stub.connect();

    let result = device.get_attitude();
    assert!(
        matches!(
            result,
            Err(ClientError::Closed | ClientError::ReceiveFailure(_))
        ),
        "unexpected {result:?}"
    );
    stub.join();

    // The link stays closed for the same reason until the next connect.
    let again = device.get_attitude();
    assert!(
        matches!(
            again,
            Err(ClientError::Closed | ClientError::ReceiveFailure(_))
        ),
        "unexpected {again:?}"
    );
    device.disconnect();
    assert!(!device.is_connected());
}

#[test]
fn disconnect_after_hang_up_reports_not_connected() {
    init_tracing();
    let stub = StubDevice::hang_up();
    let device = stub.connect();

    assert!(device.get_attitude().is_err());
    stub.join();
    device.disconnect();

    assert!(matches!(
        device.get_firmware_version(),
        Err(ClientError::NotConnected)
    ));
    assert!(matches!(device.arm(), Err(ClientError::NotConnected)));
}

#[test]
fn commands_after_hang_up_fail_and_keep_cache() {
    init_tracing();
    let stub = StubDevice::hang_up();
    let device = stub.connect();

    // The failed round-trip proves the reader has seen the stream end.
    assert!(device.get_attitude().is_err());
    stub.join();

    let set = device.set_motor(1, 0.7);
    assert!(
        matches!(set, Err(ClientError::Closed | ClientError::ReceiveFailure(_))),
        "unexpected {set:?}"
    );
    assert!(device.set_leds(Some(true), None, None).is_err());
    assert!(device.set_pid(&PidConstants::default()).is_err());

    assert_eq!(device.motors(), [0.0; 4]);
    assert_eq!(device.leds(), Leds::default());
    assert_eq!(device.pid(), None);
    assert!(!device.is_connected());

    device.disconnect();
}

#[test]
fn reconnect_replaces_previous_connection() {
    init_tracing();
    let stub = StubDevice::serve(2, |request| match request {
        Request::Query(MessageKind::FirmwareVersion) => {
            vec![encoded(&Message::FirmwareVersion(4))]
        }
        _ => Vec::new(),
    });
    let device = stub.connect();
    assert_eq!(device.get_firmware_version().unwrap(), 4);

    device.connect().unwrap();
    assert!(device.is_connected());
    assert_eq!(device.get_firmware_version().unwrap(), 4);

    device.disconnect();
    device.disconnect();
    stub.join();
}
