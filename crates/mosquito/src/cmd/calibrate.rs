use mosquito_client::MessageKind;

use crate::cmd::{CalibrateArgs, CalibrateCommand, Context};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_report, SentReport};

pub fn run(args: CalibrateArgs, ctx: &Context) -> CliResult<i32> {
    let device = ctx.connect()?;
    let kind = match args.command {
        CalibrateCommand::Escs => {
            device
                .calibrate_escs()
                .map_err(|err| client_error("esc calibration failed", err))?;
            MessageKind::CalibrateEscs
        }
        CalibrateCommand::Transmitter { stage } => {
            device
                .calibrate_transmitter(stage)
                .map_err(|err| client_error("transmitter calibration failed", err))?;
            MessageKind::CalibrateTransmitter
        }
    };
    device.disconnect();

    print_report(&SentReport::new(kind), ctx.format);
    Ok(SUCCESS)
}
