//! Logging initialization
//!
//! Diagnostics go to stderr through `tracing`; task progress stays on stdout.
//! `RUST_LOG` takes precedence over the `-v` count.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(verbosity > 1)
                .with_writer(std::io::stderr),
        )
        .init();
}
