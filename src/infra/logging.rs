//! Diagnostic tracing for the runner itself.
//!
//! The probe report goes to stdout through `reporting::console`; this module
//! only wires up developer diagnostics on stderr, driven by `RUST_LOG`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Without it, the level is `warn`, raised to `debug` by
/// one `-v` and `trace` by two or more.
///
/// ```bash
/// RUST_LOG=share_consistency=debug share-consistency run
/// ```
pub fn init(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
