use serde::Serialize;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber. `RUST_LOG` wins over `loglevel` when set.
pub fn init_tracing(loglevel: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(loglevel));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();
}

/// Pretty JSON for debug logging, or `None` when debug is off.
pub(crate) fn debug_json<T: Serialize>(value: &T) -> Option<String> {
    tracing::enabled!(tracing::Level::DEBUG).then(|| {
        serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unserializable: {e}>"))
    })
}
