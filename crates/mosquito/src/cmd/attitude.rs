use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use mosquito_client::Mosquito;

use crate::cmd::{parse_duration, AttitudeArgs, Context};
use crate::exit::{client_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_report, AttitudeReport, OutputFormat};

pub fn run(args: AttitudeArgs, ctx: &Context) -> CliResult<i32> {
    let interval = args.watch.as_deref().map(parse_duration).transpose()?;
    let device = ctx.connect()?;

    let Some(interval) = interval else {
        print_attitude(&device, ctx.format)?;
        device.disconnect();
        return Ok(SUCCESS);
    };

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        print_attitude(&device, ctx.format)?;
        printed = printed.saturating_add(1);
        if args.count.is_some_and(|count| printed >= count) {
            break;
        }
        thread::sleep(interval);
    }

    device.disconnect();
    Ok(SUCCESS)
}

fn print_attitude(device: &Mosquito, format: OutputFormat) -> CliResult<()> {
    let (roll, pitch, yaw) = device
        .get_attitude()
        .map_err(|err| client_error("attitude query failed", err))?;
    print_report(&AttitudeReport { roll, pitch, yaw }, format);
    Ok(())
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
