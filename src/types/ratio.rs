use serde::{Deserialize, Serialize};
use std::fmt;
use crate::error::{Error, Result};
use crate::types::fixed::Fixed18;
use crate::BPS_DENOMINATOR;

/// EMA weight given to each new observation, as a fraction in [0, 1]
/// scaled by 10^18.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct SmoothingFactor(u64);

const SMOOTHING_SCALE: u64 = Fixed18::SCALE as u64;

impl SmoothingFactor {
    pub fn new(raw: u64) -> Result<Self> {
        if raw > SMOOTHING_SCALE {
            return Err(Error::InvalidParameter(format!(
                "smoothing factor {} exceeds 1.0 ({})",
                raw, SMOOTHING_SCALE
            )));
        }
        Ok(SmoothingFactor(raw))
    }

    /// Create from floating-point value (for configuration/initialization only)
    pub fn from_f64(value: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidParameter(format!("smoothing factor {} outside [0, 1]", value)));
        }
        Self::new((value * SMOOTHING_SCALE as f64).round() as u64)
    }

    pub fn one() -> Self {
        SmoothingFactor(SMOOTHING_SCALE)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    /// `delta * factor / 10^18`, truncating toward zero.
    pub fn apply(&self, delta: Fixed18) -> Result<Fixed18> {
        delta.mul_div(self.0 as i128, Fixed18::SCALE)
    }
}

impl TryFrom<u64> for SmoothingFactor {
    type Error = Error;
    fn try_from(raw: u64) -> Result<Self> {
        SmoothingFactor::new(raw)
    }
}

impl From<SmoothingFactor> for u64 {
    fn from(factor: SmoothingFactor) -> u64 {
        factor.0
    }
}

/// Percentage expressed in basis points (1 bps = 0.01%).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasisPoints(u32);

impl BasisPoints {
    pub fn new(bps: u32) -> Self {
        BasisPoints(bps)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// `|base| * bps / 10_000`, truncating toward zero.
    pub fn of(&self, base: Fixed18) -> Result<Fixed18> {
        base.checked_abs()?.mul_div(self.0 as i128, BPS_DENOMINATOR as i128)
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bps", self.0)
    }
}
