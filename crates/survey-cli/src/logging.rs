//! Diagnostics for the runner via `RUST_LOG`, written to stderr.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the stderr subscriber. `RUST_LOG` wins when set; otherwise
/// `warn`, or `debug` for the survey crates when `verbose` is on.
pub fn init(verbose: bool) {
    let fallback = if verbose {
        "warn,survey_spec=debug,survey_component=debug,survey=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
