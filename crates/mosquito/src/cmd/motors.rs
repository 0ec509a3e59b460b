use mosquito_client::{MessageKind, MOTOR_COUNT};

use crate::cmd::{Context, MotorArgs, MotorCommand, MotorsArgs, MotorsCommand};
use crate::exit::{client_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_report, MotorsReport, SentReport};

pub fn run(args: MotorsArgs, ctx: &Context) -> CliResult<i32> {
    match args.command {
        MotorsCommand::Get => {
            let device = ctx.connect()?;
            let motors = device
                .get_motors()
                .map_err(|err| client_error("motor query failed", err))?;
            device.disconnect();
            print_report(&MotorsReport { motors }, ctx.format);
        }
        MotorsCommand::Set { values } => {
            let values: [f32; MOTOR_COUNT] = values.try_into().map_err(|values: Vec<f32>| {
                CliError::new(
                    USAGE,
                    format!("expected {MOTOR_COUNT} motor values, got {}", values.len()),
                )
            })?;
            let device = ctx.connect()?;
            device
                .set_motors(values)
                .map_err(|err| client_error("motor command failed", err))?;
            device.disconnect();
            print_report(&SentReport::new(MessageKind::SetMotorNormal), ctx.format);
        }
    }
    Ok(SUCCESS)
}

/// `motor set` reads the current tuple first so the other three motors are
/// sent back unchanged.
pub fn run_single(args: MotorArgs, ctx: &Context) -> CliResult<i32> {
    let MotorCommand::Set { index, value } = args.command;
    let device = ctx.connect()?;
    device
        .get_motors()
        .map_err(|err| client_error("motor query failed", err))?;
    device
        .set_motor(index, value)
        .map_err(|err| client_error("motor command failed", err))?;
    let motors = device.motors();
    device.disconnect();

    print_report(&MotorsReport { motors }, ctx.format);
    Ok(SUCCESS)
}
