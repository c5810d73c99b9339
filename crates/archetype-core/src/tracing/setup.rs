//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the Archetype tracing/logging system.
///
/// Reads `ARCHETYPE_LOG` for per-subsystem log levels, e.g.
/// `ARCHETYPE_LOG=archetype_analysis=debug,archetype_storage=warn`.
///
/// Falls back to `info` for the archetype crates if `ARCHETYPE_LOG` is not
/// set or invalid.
///
/// This function is idempotent; calling it multiple times is safe.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("ARCHETYPE_LOG").unwrap_or_else(|_| {
            EnvFilter::new("archetype_core=info,archetype_analysis=info,archetype_storage=info")
        });

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .init();
    });
}
