use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use mosquito_client::{MessageKind, PidConstants, MOTOR_COUNT};
use mosquito_frame::PID_CONSTANT_COUNT;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// A command result that can be printed in every output format.
pub trait Report: Serialize {
    /// Field/value pairs for the table and pretty formats.
    fn rows(&self) -> Vec<(&'static str, String)>;
}

pub fn print_report<R: Report>(report: &R, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (field, value) in report.rows() {
                table.add_row(vec![field.to_string(), value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let line: Vec<String> = report
                .rows()
                .into_iter()
                .map(|(field, value)| format!("{field}={value}"))
                .collect();
            println!("{}", line.join(" "));
        }
    }
}

/// Acknowledgement for fire-and-forget commands.
#[derive(Serialize)]
pub struct SentReport {
    pub sent: &'static str,
}

impl SentReport {
    pub fn new(kind: MessageKind) -> Self {
        Self { sent: kind.name() }
    }
}

impl Report for SentReport {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![("sent", self.sent.to_string())]
    }
}

#[derive(Serialize)]
pub struct AttitudeReport {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl Report for AttitudeReport {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("roll", self.roll.to_string()),
            ("pitch", self.pitch.to_string()),
            ("yaw", self.yaw.to_string()),
        ]
    }
}

#[derive(Serialize)]
pub struct VelocitiesReport {
    pub vx: f32,
    pub vy: f32,
    pub vz: f32,
}

impl Report for VelocitiesReport {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("vx", self.vx.to_string()),
            ("vy", self.vy.to_string()),
            ("vz", self.vz.to_string()),
        ]
    }
}

#[derive(Serialize)]
pub struct MotorsReport {
    pub motors: [f32; MOTOR_COUNT],
}

impl Report for MotorsReport {
    fn rows(&self) -> Vec<(&'static str, String)> {
        const NAMES: [&str; MOTOR_COUNT] = ["motor_1", "motor_2", "motor_3", "motor_4"];
        NAMES
            .into_iter()
            .zip(self.motors)
            .map(|(name, value)| (name, value.to_string()))
            .collect()
    }
}

#[derive(Serialize)]
pub struct FirmwareReport {
    pub firmware_version: u8,
}

impl Report for FirmwareReport {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![("firmware_version", self.firmware_version.to_string())]
    }
}

#[derive(Serialize)]
pub struct PositionBoardReport {
    pub connected: bool,
}

impl Report for PositionBoardReport {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![("connected", self.connected.to_string())]
    }
}

/// PID constants print as the same JSON object `pid set` reads.
#[derive(Serialize)]
#[serde(transparent)]
pub struct PidReport(pub PidConstants);

const PID_FIELDS: [&str; PID_CONSTANT_COUNT] = [
    "rate_roll_p",
    "rate_roll_i",
    "rate_roll_d",
    "rate_pitch_p",
    "rate_pitch_i",
    "rate_pitch_d",
    "rate_yaw_p",
    "rate_yaw_i",
    "rate_d2r",
    "level_p",
    "alt_hold_p",
    "alt_hold_vel_p",
    "alt_hold_vel_i",
    "alt_hold_vel_d",
    "min_altitude",
    "param_6",
];

impl Report for PidReport {
    fn rows(&self) -> Vec<(&'static str, String)> {
        PID_FIELDS
            .into_iter()
            .zip(self.0.to_array())
            .map(|(name, value)| (name, value.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_rows_follow_wire_order() {
        let constants = PidConstants {
            rate_roll_p: 1.5,
            param_6: 7.0,
            ..PidConstants::default()
        };
        let rows = PidReport(constants).rows();
        assert_eq!(rows.len(), PID_CONSTANT_COUNT);
        assert_eq!(rows[0], ("rate_roll_p", "1.5".to_string()));
        assert_eq!(rows[15], ("param_6", "7".to_string()));
    }

    #[test]
    fn pid_report_json_reads_back() {
        let constants = PidConstants {
            level_p: 2.25,
            min_altitude: 0.5,
            ..PidConstants::default()
        };
        let json = serde_json::to_string(&PidReport(constants)).unwrap();
        let parsed: PidConstants = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, constants);
    }

    #[test]
    fn sent_report_uses_wire_name() {
        let report = SentReport::new(MessageKind::SetArmed);
        assert_eq!(report.rows(), vec![("sent", "SET_ARMED".to_string())]);
    }
}
