//! Tracing subscriber setup
//!
//! Logs go to stderr so stdout stays clean for tables and JSON. `RUST_LOG`
//! takes precedence over the verbosity flags.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
fn default_filter(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "treehouse=debug,treehouse_core=debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}
