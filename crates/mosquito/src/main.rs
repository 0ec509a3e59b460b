mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;
use mosquito_client::{ClientConfig, DeviceAddress};

use crate::cmd::{parse_duration, Command, Context};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "mosquito", version, about = "Mosquito flight controller CLI")]
struct Cli {
    /// Device address (host:port).
    #[arg(
        long,
        env = "MOSQUITO_ADDRESS",
        default_value = "192.168.4.1:80",
        global = true
    )]
    address: DeviceAddress,

    /// Connect, send and reply timeout (e.g. 4s, 500ms).
    #[arg(long, default_value = "4s", global = true)]
    timeout: String,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let result = parse_duration(&cli.timeout).and_then(|timeout| {
        let ctx = Context {
            config: ClientConfig::new(cli.address).with_timeout(timeout),
            format: cli.format.unwrap_or_else(OutputFormat::default_for_stdout),
        };
        cmd::run(cli.command, &ctx)
    });

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
