use crate::error::Result;
use crate::types::fixed::Fixed18;

/// Produces one raw reading on demand. Adapters for specific protocols
/// (lending markets, AMM pools, price feeds) implement this.
#[cfg_attr(test, mockall::automock)]
pub trait ValueSource: Send {
    fn value(&self) -> Result<Fixed18>;
}
