pub mod persistence;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

pub const DEFAULT_LOG_FILTER: &str = "fintrack_core=info";

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    init_tracing_with(DEFAULT_LOG_FILTER);
}

/// Initializes the global tracing subscriber, adding `directive` on top of
/// whatever `RUST_LOG` provides. Later calls are ignored.
pub fn init_tracing_with(directive: &str) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        match directive.parse() {
            Ok(parsed) => filter = filter.add_directive(parsed),
            Err(_) => {
                if let Ok(fallback) = DEFAULT_LOG_FILTER.parse() {
                    filter = filter.add_directive(fallback);
                }
            }
        }

        // Another subscriber may already be installed by the host.
        let _ = fmt().with_env_filter(filter).try_init();
    });
}
