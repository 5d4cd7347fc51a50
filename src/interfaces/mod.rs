pub mod value_source;
pub mod downstream_consumer;
pub mod clock;
pub mod oracle;

pub use clock::{Clock, ManualClock, SystemClock};
pub use downstream_consumer::DownstreamConsumer;
pub use oracle::{Oracle, Reading};
pub use value_source::ValueSource;
