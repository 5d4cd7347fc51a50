use serde::Serialize;
use crate::error::Result;
use crate::types::fixed::Fixed18;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Reading {
    pub value: Fixed18,
    pub is_valid: bool,
}

impl Reading {
    pub fn valid(value: Fixed18) -> Self {
        Reading { value, is_valid: true }
    }

    /// Fail-closed reading: zero, not usable.
    pub fn invalid() -> Self {
        Reading { value: Fixed18::ZERO, is_valid: false }
    }
}

/// Capability shared by smoothed feeds and aggregators, so a relayer can
/// bind either without knowing which it holds.
pub trait Oracle: Send {
    /// Pull fresh data into the oracle's state. May be rate limited.
    fn refresh(&mut self) -> Result<()>;

    /// Side-effect-free read of the current state.
    fn poll(&self) -> Result<Reading>;
}
