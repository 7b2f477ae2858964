//! Tracing setup for the service binary.
//!
//! Levels come from the `[logging]` settings section (a default plus
//! per-target overrides such as `ftp_watcher::watcher = "debug"`). When
//! `RUST_LOG` is set it replaces the settings entirely.

use std::sync::Once;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Local wall-clock timestamps, millisecond precision.
struct CompactTime;

impl FormatTime for CompactTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// `default,target=level,...` with targets sorted for a stable filter.
fn filter_directives(config: &LoggingConfig) -> String {
    let mut targets: Vec<_> = config.modules.iter().collect();
    targets.sort();

    targets
        .into_iter()
        .fold(config.default.clone(), |mut directives, (target, level)| {
            directives.push_str(&format!(",{target}={level}"));
            directives
        })
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_with_config(config: &LoggingConfig) {
    INIT.call_once(|| {
        // An unset or unparsable RUST_LOG falls back to the settings.
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_timer(CompactTime)
                    .with_filter(filter),
            )
            .init();
    });
}

pub fn init() {
    init_with_config(&LoggingConfig::default());
}

/// `info!` line tagged with a component: `[dispatch] processed: a.txt`.
#[macro_export]
macro_rules! log_event {
    ($component:expr, $event:expr) => {
        tracing::info!("[{}] {}", $component, $event)
    };
    ($component:expr, $event:expr, $($arg:tt)*) => {
        tracing::info!("[{}] {}: {}", $component, $event, format!($($arg)*))
    };
}

/// Same as [`log_event!`] at debug level.
#[macro_export]
macro_rules! debug_event {
    ($component:expr, $event:expr) => {
        tracing::debug!("[{}] {}", $component, $event)
    };
    ($component:expr, $event:expr, $($arg:tt)*) => {
        tracing::debug!("[{}] {}: {}", $component, $event, format!($($arg)*))
    };
}
