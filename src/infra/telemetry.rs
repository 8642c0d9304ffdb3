use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

/// Register metric descriptions with the installed recorder.
pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "beststories_cache_hit_total",
            Unit::Count,
            "Story lookups answered from the cache."
        );
        describe_counter!(
            "beststories_cache_miss_total",
            Unit::Count,
            "Story lookups that found no live cache entry."
        );
        describe_counter!(
            "beststories_cache_expired_total",
            Unit::Count,
            "Cache entries dropped on lookup after their TTL elapsed."
        );
        describe_counter!(
            "beststories_cache_evict_total",
            Unit::Count,
            "Cache entries evicted because the store reached capacity."
        );
        describe_counter!(
            "beststories_upstream_item_failure_total",
            Unit::Count,
            "Story detail fetches that failed and were left out of a response."
        );
        describe_histogram!(
            "beststories_warmup_ms",
            Unit::Milliseconds,
            "Startup cache warm-up latency in milliseconds."
        );
    });
}
