use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::types::fixed::Fixed18;
use crate::types::ratio::BasisPoints;

/// Minimum change since the last push that makes a binding worth updating.
/// Both variants are inclusive: a change exactly at the threshold triggers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviationPolicy {
    /// Band of `|base| * bps / 10_000` around the last pushed value.
    Percentage { bps: BasisPoints },
    /// `|new - base| >= value`.
    Absolute { value: Fixed18 },
}

impl DeviationPolicy {
    pub fn percentage(bps: u32) -> Result<Self> {
        if bps == 0 {
            return Err(Error::InvalidParameter("percentage threshold must be > 0 bps".to_string()));
        }
        Ok(DeviationPolicy::Percentage { bps: BasisPoints::new(bps) })
    }

    pub fn absolute(value: Fixed18) -> Result<Self> {
        if value <= Fixed18::ZERO {
            return Err(Error::InvalidParameter("absolute threshold must be > 0".to_string()));
        }
        Ok(DeviationPolicy::Absolute { value })
    }

    /// Whether moving from `base` (the last pushed value, if any) to
    /// `candidate` crosses the threshold. Nothing pushed yet always crosses.
    pub fn exceeds(&self, base: Option<Fixed18>, candidate: Fixed18) -> Result<bool> {
        let Some(base) = base else {
            return Ok(true);
        };
        let gap = candidate.abs_diff(base);

        match self {
            DeviationPolicy::Percentage { bps } => {
                // A zero base gives a zero-width band; any movement counts
                if base.is_zero() {
                    return Ok(gap > 0);
                }
                let band = bps.of(base)?;
                Ok(gap >= band.raw().unsigned_abs())
            }
            DeviationPolicy::Absolute { value } => {
                Ok(gap >= value.raw().unsigned_abs())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> Fixed18 {
        Fixed18::from_int(v)
    }

    #[test]
    fn test_percentage_boundary_is_inclusive() {
        let policy = DeviationPolicy::percentage(5_000).unwrap();
        let base = Some(int(100));

        assert!(!policy.exceeds(base, int(149)).unwrap());
        assert!(policy.exceeds(base, int(150)).unwrap());
        assert!(policy.exceeds(base, int(151)).unwrap());

        assert!(!policy.exceeds(base, int(51)).unwrap());
        assert!(policy.exceeds(base, int(50)).unwrap());
    }

    #[test]
    fn test_percentage_on_negative_base() {
        let policy = DeviationPolicy::percentage(1_000).unwrap();
        let base = Some(int(-100));

        assert!(!policy.exceeds(base, int(-91)).unwrap());
        assert!(policy.exceeds(base, int(-90)).unwrap());
        assert!(policy.exceeds(base, int(-110)).unwrap());
    }

    #[test]
    fn test_percentage_zero_base() {
        let policy = DeviationPolicy::percentage(100).unwrap();
        assert!(!policy.exceeds(Some(Fixed18::ZERO), Fixed18::ZERO).unwrap());
        assert!(policy.exceeds(Some(Fixed18::ZERO), Fixed18::from_raw(1)).unwrap());
    }

    #[test]
    fn test_absolute_boundary_is_inclusive() {
        let threshold = Fixed18::from_raw(100_000_000_000_000);
        let policy = DeviationPolicy::absolute(threshold).unwrap();
        let base = Some(int(100));

        assert!(!policy.exceeds(base, int(100)).unwrap());
        let above = int(100).checked_add(threshold).unwrap();
        let just_below = above.checked_sub(Fixed18::from_raw(1)).unwrap();
        let below = int(100).checked_sub(threshold).unwrap();

        assert!(!policy.exceeds(base, just_below).unwrap());
        assert!(policy.exceeds(base, above).unwrap());
        assert!(policy.exceeds(base, below).unwrap());
    }

    #[test]
    fn test_first_push_always_exceeds() {
        let policy = DeviationPolicy::absolute(int(1_000)).unwrap();
        assert!(policy.exceeds(None, Fixed18::ZERO).unwrap());
    }

    #[test]
    fn test_extreme_gap_does_not_overflow() {
        let policy = DeviationPolicy::absolute(Fixed18::ONE).unwrap();
        let base = Some(Fixed18::from_raw(i128::MIN));
        assert!(policy.exceeds(base, Fixed18::from_raw(i128::MAX)).unwrap());

        // |i128::MIN| has no band; reported instead of panicking
        let percentage = DeviationPolicy::percentage(100).unwrap();
        assert!(matches!(percentage.exceeds(base, Fixed18::ZERO), Err(Error::Overflow { .. })));
    }

    #[test]
    fn test_rejects_degenerate_thresholds() {
        assert!(DeviationPolicy::percentage(0).is_err());
        assert!(DeviationPolicy::absolute(Fixed18::ZERO).is_err());
        assert!(DeviationPolicy::absolute(int(-1)).is_err());
    }
}
