use mosquito_client::MessageKind;

use crate::cmd::{Airframe, AirframeArgs, Context};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_report, SentReport};

pub fn run(args: AirframeArgs, ctx: &Context) -> CliResult<i32> {
    let device = ctx.connect()?;
    device
        .set_mosquito_version(args.model == Airframe::Mosquito150)
        .map_err(|err| client_error("airframe selection failed", err))?;
    device.disconnect();

    print_report(&SentReport::new(MessageKind::SetMosquitoVersion), ctx.format);
    Ok(SUCCESS)
}
