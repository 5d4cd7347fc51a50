pub mod tracing;
pub mod metrics;
