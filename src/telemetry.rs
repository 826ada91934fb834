//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::RuntimeConfig;

/// Installs the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies. Calling
/// this twice is harmless, the second install is ignored.
pub fn init_tracing(runtime: &RuntimeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&runtime.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if runtime.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
