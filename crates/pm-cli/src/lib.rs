//! `pm-cli` — the interactive front end of `pathmap`.
//!
//! The binary loads one map, then runs a [`Session`] over stdin/stdout.  The
//! session is generic over its reader and writer so the whole dialog can be
//! driven from memory in tests.

pub mod session;


pub use session::Session;

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Logs go to stderr so they never interleave with the dialog on stdout.
/// `RUST_LOG` wins when set; otherwise the level is `warn`, or `debug` with
/// `verbose`.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
