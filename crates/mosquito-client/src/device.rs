use std::sync::{Arc, Mutex};

use mosquito_frame::{FrameError, Message, MessageKind, PidConstants, Request};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::correlator::Correlator;
use crate::dispatch::{lock, DispatchTable};
use crate::error::{ClientError, Result};
use crate::link::Link;
use crate::state::{check_power, motor_slot, DeviceState, Leds, MOTOR_COUNT};

/// Highest transmitter calibration stage the firmware knows.
const MAX_CALIBRATION_STAGE: u8 = 2;

/// API object to talk to a Mosquito over its WiFi link.
///
/// All methods take `&self`; wrap the device in an `Arc` to issue requests
/// from several threads. Requests of different kinds may overlap freely,
/// requests of the same kind are served one after the other.
pub struct Mosquito {
    config: ClientConfig,
    link: Link,
    correlator: Correlator,
    state: Mutex<DeviceState>,
}

impl Default for Mosquito {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl Mosquito {
    pub fn new(config: ClientConfig) -> Self {
        let table = Arc::new(DispatchTable::new());
        Self {
            link: Link::new(Arc::clone(&table)),
            correlator: Correlator::new(table, config.reply_timeout),
            state: Mutex::new(DeviceState::default()),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Connect to the device. Any existing connection is closed first.
    pub fn connect(&self) -> Result<()> {
        self.link.connect(&self.config)
    }

    /// Disconnect from the device. Safe to call when not connected.
    pub fn disconnect(&self) {
        self.link.disconnect();
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    pub fn arm(&self) -> Result<()> {
        info!("arming");
        self.link.send(&Request::SetArmed(true))
    }

    pub fn disarm(&self) -> Result<()> {
        info!("disarming");
        self.link.send(&Request::SetArmed(false))
    }

    /// Start the ESC calibration routine on the device.
    pub fn calibrate_escs(&self) -> Result<()> {
        self.link.send(&Request::CalibrateEscs)
    }

    /// Move the transmitter calibration to `stage`.
    ///
    /// Stage 0 records the sticks at rest, stage 1 their extremes, stage 2
    /// ends the calibration.
    pub fn calibrate_transmitter(&self, stage: u8) -> Result<()> {
        if stage > MAX_CALIBRATION_STAGE {
            return Err(ClientError::InvalidArgument(format!(
                "calibration stage {stage} out of range 0..={MAX_CALIBRATION_STAGE}"
            )));
        }
        self.link.send(&Request::CalibrateTransmitter(stage))
    }

    /// Tell the firmware which airframe it runs on: `true` for the Mosquito
    /// 150, `false` for the Mosquito 90.
    pub fn set_mosquito_version(&self, is_mosquito_150: bool) -> Result<()> {
        self.link
            .send(&Request::SetMosquitoVersion(is_mosquito_150))
    }

    /// Tell the firmware whether the optional position board is fitted.
    pub fn set_position_board(&self, connected: bool) -> Result<()> {
        self.link.send(&Request::SetPositionBoard(connected))
    }

    /// Ask the firmware whether it detects the position board.
    pub fn position_board_connected(&self) -> Result<bool> {
        match self.query(MessageKind::PositionBoardConnected)? {
            Message::PositionBoardConnected(connected) => Ok(connected),
            other => Err(unexpected(other)),
        }
    }

    pub fn get_firmware_version(&self) -> Result<u8> {
        match self.query(MessageKind::FirmwareVersion)? {
            Message::FirmwareVersion(version) => Ok(version),
            other => Err(unexpected(other)),
        }
    }

    /// Orientation in radians as `(roll, pitch, yaw)`.
    ///
    /// The firmware reports pitch with the opposite sign to the host's
    /// convention, so the wire value is negated.
    pub fn get_attitude(&self) -> Result<(f32, f32, f32)> {
        match self.query(MessageKind::AttitudeRadians)? {
            Message::Attitude { roll, pitch, yaw } => Ok((roll, -pitch, yaw)),
            other => Err(unexpected(other)),
        }
    }

    /// Linear velocities in m/s as `(vx, vy, vz)`.
    pub fn get_velocities(&self) -> Result<(f32, f32, f32)> {
        match self.query(MessageKind::Velocities)? {
            Message::Velocities([vx, vy, vz]) => Ok((vx, vy, vz)),
            other => Err(unexpected(other)),
        }
    }

    /// Set motor `index` (1..=4) to `value` (0..=1), keeping the others at
    /// their last commanded value.
    pub fn set_motor(&self, index: usize, value: f32) -> Result<()> {
        let mut state = lock(&self.state);
        let motors = state.motors_with(index, value)?;
        self.link.send(&Request::SetMotors(motors))?;
        debug!(index, value, "motor set");
        state.motors = motors;
        Ok(())
    }

    /// Set all four motors at once, each in 0..=1.
    pub fn set_motors(&self, values: [f32; MOTOR_COUNT]) -> Result<()> {
        for value in values {
            check_power(value)?;
        }
        let mut state = lock(&self.state);
        self.link.send(&Request::SetMotors(values))?;
        state.motors = values;
        Ok(())
    }

    /// Current power of motor `index` (1..=4), as reported by the device.
    pub fn get_motor(&self, index: usize) -> Result<f32> {
        let slot = motor_slot(index)?;
        Ok(self.get_motors()?[slot])
    }

    /// Current power of all four motors, as reported by the device.
    pub fn get_motors(&self) -> Result<[f32; MOTOR_COUNT]> {
        match self.query(MessageKind::GetMotorNormal)? {
            Message::Motors(motors) => {
                lock(&self.state).motors = motors;
                Ok(motors)
            }
            other => Err(unexpected(other)),
        }
    }

    pub fn set_pid(&self, constants: &PidConstants) -> Result<()> {
        let mut state = lock(&self.state);
        self.link.send(&Request::SetPid(*constants))?;
        state.pid = Some(*constants);
        Ok(())
    }

    pub fn get_pid(&self) -> Result<PidConstants> {
        match self.query(MessageKind::PidConstants)? {
            Message::PidConstants(constants) => {
                lock(&self.state).pid = Some(constants);
                Ok(constants)
            }
            other => Err(unexpected(other)),
        }
    }

    /// Switch the status LEDs. Channels passed as `None` keep their last
    /// commanded state.
    pub fn set_leds(
        &self,
        red: Option<bool>,
        green: Option<bool>,
        blue: Option<bool>,
    ) -> Result<()> {
        let mut state = lock(&self.state);
        let leds = state.leds.merge(red, green, blue);
        self.link.send(&Request::SetLeds {
            red: leds.red,
            green: leds.green,
            blue: leds.blue,
        })?;
        state.leds = leds;
        Ok(())
    }

    /// Reserved: altitude hold is not exposed by the firmware yet, so this
    /// sends nothing.
    pub fn set_target_altitude(&self, meters: f32) -> Result<()> {
        warn!(meters, "set_target_altitude is not supported by the firmware; ignoring");
        Ok(())
    }

    /// Last commanded or reported motor values.
    pub fn motors(&self) -> [f32; MOTOR_COUNT] {
        lock(&self.state).motors
    }

    /// Last commanded LED state.
    pub fn leds(&self) -> Leds {
        lock(&self.state).leds
    }

    /// Last PID constants sent to or read from the device.
    pub fn pid(&self) -> Option<PidConstants> {
        lock(&self.state).pid
    }

    fn query(&self, kind: MessageKind) -> Result<Message> {
        self.correlator
            .round_trip(&Request::Query(kind), |request| self.link.send(request))
    }
}

fn unexpected(message: Message) -> ClientError {
    ClientError::Frame(FrameError::UnexpectedKind(message.kind()))
}
