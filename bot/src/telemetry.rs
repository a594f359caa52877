//! Tracing setup for the binary.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "vc_bot=debug";

/// Install a JSON `fmt` subscriber filtered by `RUST_LOG`.
///
/// Call once, before anything logs.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .json()
        .init();
}
