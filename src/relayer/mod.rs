pub mod policy;
pub mod binding;
pub mod relayer;
pub mod sinks;

pub use binding::{BindingRegistry, OracleBinding};
pub use policy::DeviationPolicy;
pub use relayer::{ExecutionReport, Relayer};
pub use sinks::{RecordingConsumer, TracingConsumer};
