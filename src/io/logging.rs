//! Tracing subscriber setup for the binary

use tracing_subscriber::EnvFilter;

/// Default filter directive for the given verbosity flags
pub const fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    match (verbose, quiet) {
        (_, true) => "error",
        (true, false) => "debug",
        (false, false) => "warn",
    }
}

/// Install a stderr subscriber, honouring `RUST_LOG` when set
///
/// Returns false if a global subscriber was already installed.
pub fn init_logging(verbose: bool, quiet: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
