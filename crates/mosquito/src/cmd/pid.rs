use std::fs;
use std::path::Path;

use mosquito_client::{MessageKind, PidConstants};

use crate::cmd::{Context, PidArgs, PidCommand};
use crate::exit::{client_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_report, PidReport, SentReport};

pub fn run(args: PidArgs, ctx: &Context) -> CliResult<i32> {
    match args.command {
        PidCommand::Get => {
            let device = ctx.connect()?;
            let constants = device
                .get_pid()
                .map_err(|err| client_error("pid query failed", err))?;
            device.disconnect();
            print_report(&PidReport(constants), ctx.format);
        }
        PidCommand::Set { file } => {
            let constants = read_constants(&file)?;
            let device = ctx.connect()?;
            device
                .set_pid(&constants)
                .map_err(|err| client_error("pid upload failed", err))?;
            device.disconnect();
            print_report(&SentReport::new(MessageKind::SetPidConstants), ctx.format);
        }
    }
    Ok(SUCCESS)
}

fn read_constants(path: &Path) -> CliResult<PidConstants> {
    let text = fs::read_to_string(path)
        .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
    serde_json::from_str(&text).map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("{} is not a valid PID file: {err}", path.display()),
        )
    })
}
