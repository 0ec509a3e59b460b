//! Typed views of the frames exchanged with the device.
//!
//! [`Request`] is everything the host sends, [`Message`] everything the
//! device answers with. Both encode and decode so either side of the link
//! can be driven from this crate.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::codec::{encode_frame, Direction, Frame};
use crate::error::{FrameError, Result};
use crate::kind::MessageKind;

/// Number of tuning constants carried by PID messages.
pub const PID_CONSTANT_COUNT: usize = 16;

/// Flight controller tuning constants, in wire order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PidConstants {
    pub rate_roll_p: f32,
    pub rate_roll_i: f32,
    pub rate_roll_d: f32,
    pub rate_pitch_p: f32,
    pub rate_pitch_i: f32,
    pub rate_pitch_d: f32,
    pub rate_yaw_p: f32,
    pub rate_yaw_i: f32,
    /// Degrees-to-radians scale applied to rate setpoints.
    pub rate_d2r: f32,
    pub level_p: f32,
    pub alt_hold_p: f32,
    pub alt_hold_vel_p: f32,
    pub alt_hold_vel_i: f32,
    pub alt_hold_vel_d: f32,
    /// Altitude (m) below which altitude hold stays disengaged.
    pub min_altitude: f32,
    /// Firmware-defined extra parameter.
    pub param_6: f32,
}

impl PidConstants {
    pub fn to_array(&self) -> [f32; PID_CONSTANT_COUNT] {
        [
            self.rate_roll_p,
            self.rate_roll_i,
            self.rate_roll_d,
            self.rate_pitch_p,
            self.rate_pitch_i,
            self.rate_pitch_d,
            self.rate_yaw_p,
            self.rate_yaw_i,
            self.rate_d2r,
            self.level_p,
            self.alt_hold_p,
            self.alt_hold_vel_p,
            self.alt_hold_vel_i,
            self.alt_hold_vel_d,
            self.min_altitude,
            self.param_6,
        ]
    }

    pub fn from_array(values: [f32; PID_CONSTANT_COUNT]) -> Self {
        let [
            rate_roll_p,
            rate_roll_i,
            rate_roll_d,
            rate_pitch_p,
            rate_pitch_i,
            rate_pitch_d,
            rate_yaw_p,
            rate_yaw_i,
            rate_d2r,
            level_p,
            alt_hold_p,
            alt_hold_vel_p,
            alt_hold_vel_i,
            alt_hold_vel_d,
            min_altitude,
            param_6,
        ] = values;
        Self {
            rate_roll_p,
            rate_roll_i,
            rate_roll_d,
            rate_pitch_p,
            rate_pitch_i,
            rate_pitch_d,
            rate_yaw_p,
            rate_yaw_i,
            rate_d2r,
            level_p,
            alt_hold_p,
            alt_hold_vel_p,
            alt_hold_vel_i,
            alt_hold_vel_d,
            min_altitude,
            param_6,
        }
    }
}

/// A frame the host sends to the device.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Ask the device for a telemetry kind (empty payload).
    Query(MessageKind),
    SetArmed(bool),
    /// Normalized power for all four motors, each in `[0, 1]`.
    SetMotors([f32; 4]),
    SetLeds {
        red: bool,
        green: bool,
        blue: bool,
    },
    SetPid(PidConstants),
    /// `true` selects the Mosquito 150 airframe, `false` the Mosquito 90.
    SetMosquitoVersion(bool),
    SetPositionBoard(bool),
    CalibrateEscs,
    /// Transmitter calibration stage: 0, 1 or 2.
    CalibrateTransmitter(u8),
}

impl Request {
    pub fn kind(&self) -> MessageKind {
        match self {
            Request::Query(kind) => *kind,
            Request::SetArmed(_) => MessageKind::SetArmed,
            Request::SetMotors(_) => MessageKind::SetMotorNormal,
            Request::SetLeds { .. } => MessageKind::SetLeds,
            Request::SetPid(_) => MessageKind::SetPidConstants,
            Request::SetMosquitoVersion(_) => MessageKind::SetMosquitoVersion,
            Request::SetPositionBoard(_) => MessageKind::SetPositionBoard,
            Request::CalibrateEscs => MessageKind::CalibrateEscs,
            Request::CalibrateTransmitter(_) => MessageKind::CalibrateTransmitter,
        }
    }

    /// Append the framed request to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        let mut payload = BytesMut::new();
        match self {
            Request::Query(_) => {}
            Request::SetArmed(flag)
            | Request::SetMosquitoVersion(flag)
            | Request::SetPositionBoard(flag) => payload.put_u8(u8::from(*flag)),
            Request::SetMotors(values) => put_floats(&mut payload, values),
            Request::SetLeds { red, green, blue } => {
                payload.put_u8(u8::from(*red));
                payload.put_u8(u8::from(*green));
                payload.put_u8(u8::from(*blue));
            }
            Request::SetPid(constants) => put_floats(&mut payload, &constants.to_array()),
            Request::CalibrateEscs => payload.put_u8(1),
            Request::CalibrateTransmitter(stage) => payload.put_u8(*stage),
        }
        encode_frame(Direction::ToDevice, self.kind().id(), &payload, dst)
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Decode a host-to-device frame.
    pub fn decode(frame: &Frame) -> Result<Self> {
        let kind = MessageKind::try_from(frame.kind)?;
        if kind.is_query() {
            expect_len(kind, &frame.payload, 0)?;
            return Ok(Request::Query(kind));
        }

        let mut payload = expect_len(kind, &frame.payload, kind.payload_len())?;
        let request = match kind {
            MessageKind::SetArmed => Request::SetArmed(payload.get_u8() != 0),
            MessageKind::SetMosquitoVersion => Request::SetMosquitoVersion(payload.get_u8() != 0),
            MessageKind::SetPositionBoard => Request::SetPositionBoard(payload.get_u8() != 0),
            MessageKind::SetMotorNormal => Request::SetMotors(get_floats(&mut payload)),
            MessageKind::SetLeds => Request::SetLeds {
                red: payload.get_u8() != 0,
                green: payload.get_u8() != 0,
                blue: payload.get_u8() != 0,
            },
            MessageKind::SetPidConstants => {
                Request::SetPid(PidConstants::from_array(get_floats(&mut payload)))
            }
            MessageKind::CalibrateEscs => {
                payload.advance(1);
                Request::CalibrateEscs
            }
            MessageKind::CalibrateTransmitter => Request::CalibrateTransmitter(payload.get_u8()),
            other => return Err(FrameError::UnexpectedKind(other)),
        };
        Ok(request)
    }
}

/// A decoded device reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    FirmwareVersion(u8),
    PositionBoardConnected(bool),
    /// Linear velocities (m/s) along x, y, z.
    Velocities([f32; 3]),
    PidConstants(PidConstants),
    /// Orientation in radians, exactly as the device reports it.
    Attitude {
        roll: f32,
        pitch: f32,
        yaw: f32,
    },
    Motors([f32; 4]),
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::FirmwareVersion(_) => MessageKind::FirmwareVersion,
            Message::PositionBoardConnected(_) => MessageKind::PositionBoardConnected,
            Message::Velocities(_) => MessageKind::Velocities,
            Message::PidConstants(_) => MessageKind::PidConstants,
            Message::Attitude { .. } => MessageKind::AttitudeRadians,
            Message::Motors(_) => MessageKind::GetMotorNormal,
        }
    }

    /// Decode the payload of a device reply.
    pub fn decode(frame: &Frame) -> Result<Self> {
        let kind = MessageKind::try_from(frame.kind)?;
        if !kind.is_query() {
            return Err(FrameError::UnexpectedKind(kind));
        }

        let mut payload = expect_len(kind, &frame.payload, kind.payload_len())?;
        let message = match kind {
            MessageKind::FirmwareVersion => Message::FirmwareVersion(payload.get_u8()),
            MessageKind::PositionBoardConnected => {
                Message::PositionBoardConnected(payload.get_u8() != 0)
            }
            MessageKind::Velocities => Message::Velocities(get_floats(&mut payload)),
            MessageKind::PidConstants => {
                Message::PidConstants(PidConstants::from_array(get_floats(&mut payload)))
            }
            MessageKind::AttitudeRadians => {
                let [roll, pitch, yaw] = get_floats::<3>(&mut payload);
                Message::Attitude { roll, pitch, yaw }
            }
            MessageKind::GetMotorNormal => Message::Motors(get_floats(&mut payload)),
            other => return Err(FrameError::UnexpectedKind(other)),
        };
        Ok(message)
    }

    /// Append the framed reply to `dst`, as the device would send it.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        let mut payload = BytesMut::new();
        match self {
            Message::FirmwareVersion(version) => payload.put_u8(*version),
            Message::PositionBoardConnected(connected) => payload.put_u8(u8::from(*connected)),
            Message::Velocities(values) => put_floats(&mut payload, values),
            Message::PidConstants(constants) => put_floats(&mut payload, &constants.to_array()),
            Message::Attitude { roll, pitch, yaw } => {
                put_floats(&mut payload, &[*roll, *pitch, *yaw])
            }
            Message::Motors(values) => put_floats(&mut payload, values),
        }
        encode_frame(Direction::FromDevice, self.kind().id(), &payload, dst)
    }
}

fn expect_len(kind: MessageKind, payload: &Bytes, expected: usize) -> Result<Bytes> {
    if payload.len() != expected {
        return Err(FrameError::PayloadLength {
            kind,
            expected,
            actual: payload.len(),
        });
    }
    Ok(payload.clone())
}

fn put_floats(dst: &mut BytesMut, values: &[f32]) {
    for value in values {
        dst.put_f32_le(*value);
    }
}

fn get_floats<const N: usize>(src: &mut Bytes) -> [f32; N] {
    let mut values = [0.0; N];
    for value in values.iter_mut() {
        *value = src.get_f32_le();
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_frame, HEADER_SIZE};

    fn reframe(bytes: &[u8]) -> Frame {
        let mut buf = BytesMut::from(bytes);
        decode_frame(&mut buf).unwrap().unwrap()
    }

    fn sample_pid() -> PidConstants {
        PidConstants::from_array(std::array::from_fn(|i| i as f32 * 0.25))
    }

    #[test]
    fn set_armed_matches_wire_bytes() {
        let bytes = Request::SetArmed(true).to_bytes().unwrap();
        assert_eq!(bytes.as_ref(), &[b'$', b'M', b'<', 1, 216, 1, 216]);

        let bytes = Request::SetArmed(false).to_bytes().unwrap();
        assert_eq!(bytes.as_ref(), &[b'$', b'M', b'<', 1, 216, 0, 217]);
    }

    #[test]
    fn query_is_empty_frame_of_reply_kind() {
        let bytes = Request::Query(MessageKind::AttitudeRadians)
            .to_bytes()
            .unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE + 1);
        assert_eq!(bytes[4], 122);
    }

    #[test]
    fn set_motors_is_four_little_endian_floats() {
        let bytes = Request::SetMotors([0.5, 0.0, 0.0, 1.0]).to_bytes().unwrap();
        let frame = reframe(&bytes);
        assert_eq!(frame.payload.len(), 16);
        assert_eq!(&frame.payload[..4], &0.5f32.to_le_bytes());
        assert_eq!(&frame.payload[12..], &1.0f32.to_le_bytes());
    }

    #[test]
    fn requests_decode_back() {
        let requests = [
            Request::Query(MessageKind::GetMotorNormal),
            Request::SetMotors([0.1, 0.2, 0.3, 0.4]),
            Request::SetLeds {
                red: true,
                green: false,
                blue: true,
            },
            Request::SetPid(sample_pid()),
            Request::CalibrateEscs,
            Request::CalibrateTransmitter(2),
            Request::SetMosquitoVersion(true),
        ];
        for request in requests {
            let frame = reframe(&request.to_bytes().unwrap());
            assert_eq!(frame.direction, Direction::ToDevice);
            assert_eq!(Request::decode(&frame).unwrap(), request);
        }
    }

    #[test]
    fn attitude_reply_decodes_wire_values() {
        let mut buf = BytesMut::new();
        Message::Attitude {
            roll: 0.1,
            pitch: 0.2,
            yaw: 0.3,
        }
        .encode(&mut buf)
        .unwrap();

        let frame = decode_frame(&mut buf).unwrap().unwrap();
        assert_eq!(frame.direction, Direction::FromDevice);
        assert_eq!(
            Message::decode(&frame).unwrap(),
            Message::Attitude {
                roll: 0.1,
                pitch: 0.2,
                yaw: 0.3
            }
        );
    }

    #[test]
    fn pid_reply_preserves_field_order() {
        let mut buf = BytesMut::new();
        Message::PidConstants(sample_pid()).encode(&mut buf).unwrap();
        let frame = decode_frame(&mut buf).unwrap().unwrap();
        assert_eq!(frame.payload.len(), PID_CONSTANT_COUNT * 4);

        let Message::PidConstants(decoded) = Message::decode(&frame).unwrap() else {
            panic!("expected PID constants");
        };
        assert_eq!(decoded.rate_roll_p, 0.0);
        assert_eq!(decoded.rate_d2r, 2.0);
        assert_eq!(decoded.param_6, 3.75);
    }

    #[test]
    fn short_payload_is_rejected() {
        let frame = Frame::new(
            Direction::FromDevice,
            MessageKind::GetMotorNormal,
            vec![0u8; 15],
        );
        assert!(matches!(
            Message::decode(&frame),
            Err(FrameError::PayloadLength {
                expected: 16,
                actual: 15,
                ..
            })
        ));
    }

    #[test]
    fn command_kind_is_not_a_reply() {
        let frame = Frame::new(Direction::FromDevice, MessageKind::SetLeds, vec![0u8; 3]);
        assert!(matches!(
            Message::decode(&frame),
            Err(FrameError::UnexpectedKind(MessageKind::SetLeds))
        ));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let frame = Frame {
            direction: Direction::FromDevice,
            kind: 99,
            payload: Bytes::new(),
        };
        assert!(matches!(
            Message::decode(&frame),
            Err(FrameError::UnknownKind(99))
        ));
    }

    #[test]
    fn pid_constants_json_uses_field_names() {
        let json = serde_json::to_value(sample_pid()).unwrap();
        assert_eq!(json["rate_d2r"], 2.0);
        assert_eq!(json.as_object().unwrap().len(), PID_CONSTANT_COUNT);

        let parsed: PidConstants = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, sample_pid());
    }
}
