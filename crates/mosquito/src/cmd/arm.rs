use mosquito_client::MessageKind;

use crate::cmd::Context;
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_report, SentReport};

pub fn run(ctx: &Context, armed: bool) -> CliResult<i32> {
    let device = ctx.connect()?;
    let result = if armed { device.arm() } else { device.disarm() };
    result.map_err(|err| client_error("arm failed", err))?;
    device.disconnect();

    print_report(&SentReport::new(MessageKind::SetArmed), ctx.format);
    Ok(SUCCESS)
}
