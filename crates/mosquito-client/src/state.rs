//! Last commanded or reported device state, kept on the host.
//!
//! The wire commands for motors and LEDs always carry every channel, so a
//! single-channel update has to be merged into the cached values first.

use mosquito_frame::PidConstants;

use crate::error::{ClientError, Result};

/// Number of actuators on the airframe.
pub const MOTOR_COUNT: usize = 4;

/// State of the three status LEDs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Leds {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
}

impl Leds {
    /// Overwrite only the channels that are given.
    pub fn merge(self, red: Option<bool>, green: Option<bool>, blue: Option<bool>) -> Self {
        Self {
            red: red.unwrap_or(self.red),
            green: green.unwrap_or(self.green),
            blue: blue.unwrap_or(self.blue),
        }
    }
}

/// Host-side cache of device state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceState {
    pub motors: [f32; MOTOR_COUNT],
    pub leds: Leds,
    pub pid: Option<PidConstants>,
}

impl DeviceState {
    /// The cached motor tuple with motor `index` (1-based) set to `value`.
    pub fn motors_with(&self, index: usize, value: f32) -> Result<[f32; MOTOR_COUNT]> {
        let slot = motor_slot(index)?;
        check_power(value)?;
        let mut motors = self.motors;
        motors[slot] = value;
        Ok(motors)
    }
}

/// Map a 1-based motor index to its position in the motor tuple.
pub fn motor_slot(index: usize) -> Result<usize> {
    if (1..=MOTOR_COUNT).contains(&index) {
        Ok(index - 1)
    } else {
        Err(ClientError::InvalidArgument(format!(
            "motor index {index} out of range 1..={MOTOR_COUNT}"
        )))
    }
}

/// Reject power values outside `[0, 1]` (NaN included).
pub fn check_power(value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ClientError::InvalidArgument(format!(
            "motor value {value} out of range 0..=1"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motors_with_replaces_one_channel() {
        let state = DeviceState {
            motors: [0.1, 0.2, 0.3, 0.4],
            ..DeviceState::default()
        };
        for index in 1..=MOTOR_COUNT {
            let motors = state.motors_with(index, 0.9).unwrap();
            for (slot, value) in motors.iter().enumerate() {
                if slot == index - 1 {
                    assert_eq!(*value, 0.9);
                } else {
                    assert_eq!(*value, state.motors[slot]);
                }
            }
        }
    }

    #[test]
    fn motors_with_rejects_bad_index_and_value() {
        let state = DeviceState::default();
        assert!(matches!(
            state.motors_with(0, 0.5),
            Err(ClientError::InvalidArgument(_))
        ));
        assert!(matches!(
            state.motors_with(5, 0.5),
            Err(ClientError::InvalidArgument(_))
        ));
        assert!(matches!(
            state.motors_with(1, 1.5),
            Err(ClientError::InvalidArgument(_))
        ));
        assert!(matches!(
            state.motors_with(1, f32::NAN),
            Err(ClientError::InvalidArgument(_))
        ));
    }

    #[test]
    fn leds_merge_keeps_omitted_channels() {
        let off = Leds::default().merge(Some(false), Some(false), Some(false));
        let blue = off.merge(None, None, Some(true));
        assert_eq!(
            blue,
            Leds {
                red: false,
                green: false,
                blue: true
            }
        );

        let all = blue.merge(Some(true), Some(true), None);
        assert!(all.red && all.green && all.blue);
    }
}
