use mosquito_client::MessageKind;

use crate::cmd::{Context, LedsArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_report, SentReport};

pub fn run(args: LedsArgs, ctx: &Context) -> CliResult<i32> {
    let device = ctx.connect()?;
    device
        .set_leds(Some(args.red), Some(args.green), Some(args.blue))
        .map_err(|err| client_error("led command failed", err))?;
    device.disconnect();

    print_report(&SentReport::new(MessageKind::SetLeds), ctx.format);
    Ok(SUCCESS)
}
