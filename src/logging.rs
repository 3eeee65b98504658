//! stderr diagnostics.
//!
//! Per-rule match counts are logged at `debug`, the write at `info`, and a
//! stale `PROGRESS_PATCHER_WORKSPACE` at `warn`. Nothing here touches stdout,
//! which carries the confirmation line.
//!
//! To see which rules fired without writing anything:
//!
//! ```bash
//! RUST_LOG=progress_patcher=debug progress-patcher apply --dry-run
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` overrides the `warn` default.
///
/// Call once, before any patching; a second call panics.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
