//! The device's message dictionary.
//!
//! Ids below 200 are data requests: the host sends an empty frame of that
//! kind and the device answers with a filled one. Ids from 200 up are
//! commands the device applies without answering.

use std::fmt;

/// A message kind understood by the Mosquito firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum MessageKind {
    FirmwareVersion = 3,
    PositionBoardConnected = 32,
    Velocities = 33,
    PidConstants = 34,
    AttitudeRadians = 122,
    GetMotorNormal = 124,
    SetMotorNormal = 215,
    SetArmed = 216,
    SetPositionBoard = 217,
    SetMosquitoVersion = 218,
    SetPidConstants = 219,
    CalibrateEscs = 220,
    CalibrateTransmitter = 221,
    SetLeds = 222,
}

impl MessageKind {
    pub const ALL: [MessageKind; 14] = [
        MessageKind::FirmwareVersion,
        MessageKind::PositionBoardConnected,
        MessageKind::Velocities,
        MessageKind::PidConstants,
        MessageKind::AttitudeRadians,
        MessageKind::GetMotorNormal,
        MessageKind::SetMotorNormal,
        MessageKind::SetArmed,
        MessageKind::SetPositionBoard,
        MessageKind::SetMosquitoVersion,
        MessageKind::SetPidConstants,
        MessageKind::CalibrateEscs,
        MessageKind::CalibrateTransmitter,
        MessageKind::SetLeds,
    ];

    /// Wire id of this kind.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Look up a kind by wire id.
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.id() == id)
    }

    /// Whether the device answers a request of this kind.
    pub fn is_query(self) -> bool {
        self.id() < 200
    }

    /// Payload size of this kind, in bytes.
    ///
    /// For queries this is the size of the device's answer; the request
    /// itself is always empty.
    pub fn payload_len(self) -> usize {
        match self {
            MessageKind::FirmwareVersion
            | MessageKind::PositionBoardConnected
            | MessageKind::SetArmed
            | MessageKind::SetPositionBoard
            | MessageKind::SetMosquitoVersion
            | MessageKind::CalibrateEscs
            | MessageKind::CalibrateTransmitter => 1,
            MessageKind::SetLeds => 3,
            MessageKind::Velocities | MessageKind::AttitudeRadians => 3 * 4,
            MessageKind::GetMotorNormal | MessageKind::SetMotorNormal => 4 * 4,
            MessageKind::PidConstants | MessageKind::SetPidConstants => {
                crate::message::PID_CONSTANT_COUNT * 4
            }
        }
    }

    /// Human-readable name, matching the firmware's message names.
    pub fn name(self) -> &'static str {
        match self {
            MessageKind::FirmwareVersion => "FIRMWARE_VERSION",
            MessageKind::PositionBoardConnected => "POSITION_BOARD_CONNECTED",
            MessageKind::Velocities => "VELOCITIES",
            MessageKind::PidConstants => "PID_CONSTANTS",
            MessageKind::AttitudeRadians => "ATTITUDE_RADIANS",
            MessageKind::GetMotorNormal => "GET_MOTOR_NORMAL",
            MessageKind::SetMotorNormal => "SET_MOTOR_NORMAL",
            MessageKind::SetArmed => "SET_ARMED",
            MessageKind::SetPositionBoard => "SET_POSITION_BOARD",
            MessageKind::SetMosquitoVersion => "SET_MOSQUITO_VERSION",
            MessageKind::SetPidConstants => "SET_PID_CONSTANTS",
            MessageKind::CalibrateEscs => "ESC_CALIBRATION",
            MessageKind::CalibrateTransmitter => "RC_CALIBRATION",
            MessageKind::SetLeds => "SET_LEDS",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for MessageKind {
    type Error = crate::error::FrameError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::from_id(id).ok_or(crate::error::FrameError::UnknownKind(id))
    }
}
