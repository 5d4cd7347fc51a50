use crate::error::Result;
use crate::types::fixed::Fixed18;
use crate::types::ids::DestinationKey;

/// Receives relayed values. A failure here aborts the relay pass it occurs in.
#[cfg_attr(test, mockall::automock)]
pub trait DownstreamConsumer: Send {
    fn update_value(&mut self, key: &DestinationKey, value: Fixed18) -> Result<()>;
}
