//! Tracing setup for hosts that do not install their own subscriber

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install the fmt subscriber with env-filter support
///
/// Safe to call more than once; also a no-op if the host already installed
/// a global subscriber.
pub fn init() {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "fintrack_core=debug".parse() {
            filter = filter.add_directive(directive);
        }
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .try_init();
    });
}
