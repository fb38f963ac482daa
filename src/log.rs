//! Logging for the engine and its binaries.
//!
//! Engine code logs through `log::debug!`, `log::info!` and `log::warn!`.
//! With the `tracing` feature (default) these are the `tracing` macros;
//! without it they compile away and the engine emits nothing.
//!
//! Binaries call [`init_stderr`] once at startup.

use tracing_subscriber::EnvFilter;

#[cfg(feature = "tracing")]
pub use tracing::{debug, info, warn};

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub use crate::{debug, info, warn};

/// Install a `fmt` subscriber on stderr, filtered by `RUST_LOG` and
/// falling back to `default_filter` (e.g. `"warn"` or
/// `"hmi_scene=debug"`). Stdout stays free for rendered output.
///
/// A second call is a no-op.
pub fn init_stderr(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
