use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Crates whose events follow `--log-level`; everything else stays at warn.
const WORKSPACE_TARGETS: [&str; 4] = [
    "mosquito",
    "mosquito_client",
    "mosquito_frame",
    "mosquito_transport",
];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Filter directives applying this level to the workspace crates only.
    fn directives(self) -> String {
        let level = self.as_directive();
        let default = match self {
            LogLevel::Error => "error",
            _ => "warn",
        };
        let mut directives = vec![default.to_string()];
        directives.extend(
            WORKSPACE_TARGETS
                .iter()
                .map(|target| format!("{target}={level}")),
        );
        directives.join(",")
    }
}

/// Install the stderr subscriber. `RUST_LOG`, when set, replaces the
/// filter built from `--log-level`.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.directives()));
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_thread_names(true)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_level_is_scoped_to_workspace_crates() {
        let directives = LogLevel::Debug.directives();
        assert!(directives.starts_with("warn,"), "{directives}");
        assert!(directives.contains("mosquito_client=debug"));
        assert!(directives.contains("mosquito_transport=debug"));
    }

    #[test]
    fn error_level_quiets_everything() {
        let directives = LogLevel::Error.directives();
        assert!(directives.starts_with("error,"), "{directives}");
        assert!(directives.contains("mosquito_frame=error"));
    }

    #[test]
    fn directives_parse_as_filter() {
        for level in [LogLevel::Error, LogLevel::Info, LogLevel::Trace] {
            assert!(EnvFilter::try_new(level.directives()).is_ok());
        }
    }
}
