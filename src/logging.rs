//! Logging initialization
//!
//! Diagnostics (probe skips, chunk I/O errors, share failures) go through
//! `tracing`; user-facing narrative goes through the interactive reporter in
//! [`crate::output`]. Logs default to warnings only so machine-readable
//! output stays clean; `RUST_LOG` overrides.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
