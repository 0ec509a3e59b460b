use crate::cmd::Context;
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_report, FirmwareReport, VelocitiesReport};

pub fn firmware(ctx: &Context) -> CliResult<i32> {
    let device = ctx.connect()?;
    let firmware_version = device
        .get_firmware_version()
        .map_err(|err| client_error("firmware query failed", err))?;
    device.disconnect();

    print_report(&FirmwareReport { firmware_version }, ctx.format);
    Ok(SUCCESS)
}

pub fn velocities(ctx: &Context) -> CliResult<i32> {
    let device = ctx.connect()?;
    let (vx, vy, vz) = device
        .get_velocities()
        .map_err(|err| client_error("velocity query failed", err))?;
    device.disconnect();

    print_report(&VelocitiesReport { vx, vy, vz }, ctx.format);
    Ok(SUCCESS)
}
