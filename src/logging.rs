//! Log subscriber setup
//!
//! The filter comes from `RUST_LOG` when set, otherwise from the debug-mode
//! preference. It can be switched at runtime through [`LogHandle`].

use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

/// Default filter
pub const DEFAULT_FILTER: &str = "info,figure_forge=debug";

/// Filter used when debug mode is on
pub const DEBUG_FILTER: &str = "debug,figure_forge=trace";

/// Handle for changing the log filter after startup
#[derive(Clone)]
pub struct LogHandle {
    handle: reload::Handle<EnvFilter, Registry>,
}

impl LogHandle {
    /// Switch between the debug and the default filter
    pub fn set_debug(&self, debug: bool) {
        let directives = if debug { DEBUG_FILTER } else { DEFAULT_FILTER };
        if let Err(e) = self.handle.modify(|filter| *filter = EnvFilter::new(directives)) {
            tracing::warn!("Failed to change log filter: {}", e);
        } else {
            tracing::info!("Log filter set to '{}'", directives);
        }
    }
}

/// Install the global subscriber
pub fn init(debug: bool) -> LogHandle {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug { DEBUG_FILTER } else { DEFAULT_FILTER })
    });
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    LogHandle { handle }
}
