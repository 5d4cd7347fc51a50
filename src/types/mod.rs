pub mod fixed;
pub mod ratio;
pub mod timestamp;
pub mod ids;

pub use fixed::Fixed18;
pub use ids::{DestinationKey, OperatorId, SourceId};
pub use ratio::{BasisPoints, SmoothingFactor};
pub use timestamp::Timestamp;
