#![forbid(unsafe_code)]

//! Structured log output for state cells.
//!
//! Cells emit `tracing` events under the `ftui_state` target regardless of
//! this module; it only installs a subscriber for binaries and tests that do
//! not bring their own.
//!
//! ```bash
//! RUST_LOG=ftui_state=debug cargo test -p ftui-state --features tracing-json
//! ```

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install a JSON subscriber writing to stderr.
///
/// Reads `RUST_LOG`; defaults to `warn` if unset.
///
/// # Panics
///
/// Panics if a global subscriber is already installed. Use [`try_init`]
/// where that can happen.
pub fn init() {
    tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .init();
}

/// Like [`init`], but returns an error if a subscriber is already installed.
pub fn try_init() -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::ValueCell;

    #[test]
    fn second_install_is_reported() {
        // Another test may have installed one already; either way the
        // second attempt must fail rather than panic.
        let _ = try_init();
        assert!(try_init().is_err());

        let cell = ValueCell::new(1);
        cell.set(2).unwrap();
        assert_eq!(cell.get(), 2);
    }
}
