pub mod handle;
pub mod smoothed_feed;
pub mod aggregator;
pub mod sources;

pub use aggregator::Aggregator;
pub use handle::{OracleHandle, SourceOutcome};
pub use smoothed_feed::SmoothedFeed;
pub use sources::ManualSource;
