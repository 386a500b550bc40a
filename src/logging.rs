//! Structured logging setup.

use tracing_subscriber::EnvFilter;

/// Initialize structured logging with `RUST_LOG` environment variable
/// support.
///
/// Defaults to `pkgtools=info` when `RUST_LOG` is not set. Call once at
/// program startup.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pkgtools=info"));

    // try_init so double-init in tests doesn't panic
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
