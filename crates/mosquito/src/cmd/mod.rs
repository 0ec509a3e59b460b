use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use mosquito_client::{ClientConfig, Mosquito};
use tracing::debug;

use crate::exit::{client_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod airframe;
pub mod arm;
pub mod attitude;
pub mod calibrate;
pub mod leds;
pub mod motors;
pub mod pid;
pub mod position_board;
pub mod telemetry;
pub mod version;

/// Settings shared by every command that talks to the device.
pub struct Context {
    pub config: ClientConfig,
    pub format: OutputFormat,
}

impl Context {
    /// Open the connection used by a single command.
    pub fn connect(&self) -> CliResult<Mosquito> {
        let device = Mosquito::new(self.config.clone());
        device
            .connect()
            .map_err(|err| client_error("connect failed", err))?;
        debug!(address = %self.config.address, "connected");
        Ok(device)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Arm the motors.
    Arm,
    /// Disarm the motors.
    Disarm,
    /// Read roll, pitch and yaw in radians.
    Attitude(AttitudeArgs),
    /// Read or command all four motors.
    Motors(MotorsArgs),
    /// Command a single motor.
    Motor(MotorArgs),
    /// Set the status LEDs. Channels not given are switched off.
    Leds(LedsArgs),
    /// Run a calibration routine.
    Calibrate(CalibrateArgs),
    /// Read or write PID constants.
    Pid(PidArgs),
    /// Read the firmware version.
    Firmware,
    /// Read linear velocities in m/s.
    Velocities,
    /// Query or declare the optional position board.
    PositionBoard(PositionBoardArgs),
    /// Select the airframe variant.
    Airframe(AirframeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, ctx: &Context) -> CliResult<i32> {
    match command {
        Command::Arm => arm::run(ctx, true),
        Command::Disarm => arm::run(ctx, false),
        Command::Attitude(args) => attitude::run(args, ctx),
        Command::Motors(args) => motors::run(args, ctx),
        Command::Motor(args) => motors::run_single(args, ctx),
        Command::Leds(args) => leds::run(args, ctx),
        Command::Calibrate(args) => calibrate::run(args, ctx),
        Command::Pid(args) => pid::run(args, ctx),
        Command::Firmware => telemetry::firmware(ctx),
        Command::Velocities => telemetry::velocities(ctx),
        Command::PositionBoard(args) => position_board::run(args, ctx),
        Command::Airframe(args) => airframe::run(args, ctx),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct AttitudeArgs {
    /// Keep polling at this interval (e.g. 200ms) until Ctrl-C.
    #[arg(long, value_name = "INTERVAL")]
    pub watch: Option<String>,
    /// Stop after this many readings when watching.
    #[arg(long, requires = "watch")]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct MotorsArgs {
    #[command(subcommand)]
    pub command: MotorsCommand,
}

#[derive(Subcommand, Debug)]
pub enum MotorsCommand {
    /// Read the normalized power of all motors.
    Get,
    /// Set all four motors, each in [0, 1].
    Set {
        #[arg(num_args = 4, value_name = "POWER", required = true)]
        values: Vec<f32>,
    },
}

#[derive(Args, Debug)]
pub struct MotorArgs {
    #[command(subcommand)]
    pub command: MotorCommand,
}

#[derive(Subcommand, Debug)]
pub enum MotorCommand {
    /// Set one motor; the others keep the power the device reports.
    Set {
        /// Motor index, 1 to 4.
        index: usize,
        /// Normalized power in [0, 1].
        value: f32,
    },
}

#[derive(Args, Debug)]
pub struct LedsArgs {
    #[arg(long)]
    pub red: bool,
    #[arg(long)]
    pub green: bool,
    #[arg(long)]
    pub blue: bool,
}

#[derive(Args, Debug)]
pub struct CalibrateArgs {
    #[command(subcommand)]
    pub command: CalibrateCommand,
}

#[derive(Subcommand, Debug)]
pub enum CalibrateCommand {
    /// Calibrate the electronic speed controllers.
    Escs,
    /// Run one stage (0, 1 or 2) of transmitter calibration.
    Transmitter { stage: u8 },
}

#[derive(Args, Debug)]
pub struct PidArgs {
    #[command(subcommand)]
    pub command: PidCommand,
}

#[derive(Subcommand, Debug)]
pub enum PidCommand {
    /// Print the constants the device is using.
    Get,
    /// Upload constants from a JSON file (as printed by `pid get --format json`).
    Set { file: PathBuf },
}

#[derive(Args, Debug)]
pub struct PositionBoardArgs {
    /// Declare the position board present.
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,
    /// Declare the position board absent.
    #[arg(long)]
    pub disable: bool,
}

#[derive(Args, Debug)]
pub struct AirframeArgs {
    /// Airframe variant.
    #[arg(value_enum)]
    pub model: Airframe,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Airframe {
    #[value(name = "90")]
    Mosquito90,
    #[value(name = "150")]
    Mosquito150,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(match unit {
        "ms" => Duration::from_millis(value),
        _ => Duration::from_secs(value),
    })
}
