use mosquito_client::MessageKind;

use crate::cmd::{Context, PositionBoardArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_report, PositionBoardReport, SentReport};

pub fn run(args: PositionBoardArgs, ctx: &Context) -> CliResult<i32> {
    let device = ctx.connect()?;

    if args.enable || args.disable {
        device
            .set_position_board(args.enable)
            .map_err(|err| client_error("position board update failed", err))?;
        device.disconnect();
        print_report(&SentReport::new(MessageKind::SetPositionBoard), ctx.format);
        return Ok(SUCCESS);
    }

    let connected = device
        .position_board_connected()
        .map_err(|err| client_error("position board query failed", err))?;
    device.disconnect();
    print_report(&PositionBoardReport { connected }, ctx.format);
    Ok(SUCCESS)
}
