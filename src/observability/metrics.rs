use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Feed metrics
    pub static ref FEED_REFRESHES: IntCounter = IntCounter::new(
        "feed_refreshes_total",
        "Total number of EMA updates applied"
    ).unwrap();

    pub static ref SOURCE_FAILURES: IntCounter = IntCounter::new(
        "source_failures_total",
        "Total number of sources excluded from a pass (failed or stale)"
    ).unwrap();

    // Aggregation metrics
    pub static ref AGGREGATIONS_INVALID: IntCounter = IntCounter::new(
        "aggregations_invalid_total",
        "Total number of aggregations that produced an invalid value"
    ).unwrap();

    pub static ref AGGREGATED_VALID_SOURCES: IntGauge = IntGauge::new(
        "aggregated_valid_sources",
        "Number of valid readings in the most recent aggregation"
    ).unwrap();

    // Relayer metrics
    pub static ref RELAYER_PUSHES: IntCounter = IntCounter::new(
        "relayer_pushes_total",
        "Total number of values pushed downstream"
    ).unwrap();

    pub static ref RELAYER_NOOPS: IntCounter = IntCounter::new(
        "relayer_noop_total",
        "Total number of relay attempts that found nothing to push"
    ).unwrap();
}

pub fn register_metrics() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(FEED_REFRESHES.clone()))?;
    REGISTRY.register(Box::new(SOURCE_FAILURES.clone()))?;
    REGISTRY.register(Box::new(AGGREGATIONS_INVALID.clone()))?;
    REGISTRY.register(Box::new(AGGREGATED_VALID_SOURCES.clone()))?;
    REGISTRY.register(Box::new(RELAYER_PUSHES.clone()))?;
    REGISTRY.register(Box::new(RELAYER_NOOPS.clone()))?;
    Ok(())
}

/// Render the registry in the Prometheus text exposition format.
pub fn render() -> prometheus::Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
