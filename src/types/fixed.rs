use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use crate::error::{Error, Result};
use crate::FIXED_DECIMALS;

/// Signed fixed-point number with 18 decimal places.
///
/// All arithmetic that can lose precision truncates toward zero, matching
/// integer division on signed values. Products that would overflow `i128`
/// are widened to a big integer before the division so `mul_div` only fails
/// when the final result does not fit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed18(i128);

impl Fixed18 {
    pub const SCALE: i128 = 10i128.pow(FIXED_DECIMALS);
    pub const ZERO: Fixed18 = Fixed18(0);
    pub const ONE: Fixed18 = Fixed18(Self::SCALE);

    pub const fn from_raw(value: i128) -> Self {
        Fixed18(value)
    }

    pub const fn raw(&self) -> i128 {
        self.0
    }

    pub const fn from_int(value: i64) -> Self {
        Fixed18(value as i128 * Self::SCALE)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_abs(self) -> Result<Fixed18> {
        self.0.checked_abs()
            .map(Fixed18)
            .ok_or_else(|| Error::overflow("abs"))
    }

    /// Distance between two values; cannot overflow.
    pub fn abs_diff(&self, other: Fixed18) -> u128 {
        self.0.abs_diff(other.0)
    }

    pub fn checked_add(self, other: Fixed18) -> Result<Fixed18> {
        self.0.checked_add(other.0)
            .map(Fixed18)
            .ok_or_else(|| Error::overflow("fixed add"))
    }

    pub fn checked_sub(self, other: Fixed18) -> Result<Fixed18> {
        self.0.checked_sub(other.0)
            .map(Fixed18)
            .ok_or_else(|| Error::overflow("fixed sub"))
    }

    /// `self * numerator / denominator`, truncating toward zero.
    pub fn mul_div(self, numerator: i128, denominator: i128) -> Result<Fixed18> {
        if denominator == 0 {
            return Err(Error::DivisionByZero);
        }

        if let Some(product) = self.0.checked_mul(numerator) {
            if let Some(quotient) = product.checked_div(denominator) {
                return Ok(Fixed18(quotient));
            }
        }

        // BigInt division also truncates toward zero
        let wide = BigInt::from(self.0) * BigInt::from(numerator) / BigInt::from(denominator);
        wide.to_i128()
            .map(Fixed18)
            .ok_or_else(|| Error::overflow("fixed mul_div"))
    }

    /// Unweighted arithmetic mean, truncating toward zero. `None` when empty.
    pub fn mean(values: &[Fixed18]) -> Option<Fixed18> {
        if values.is_empty() {
            return None;
        }
        let count = values.len() as i128;

        let narrow = values.iter()
            .try_fold(0i128, |acc, v| acc.checked_add(v.0));

        match narrow {
            Some(sum) => Some(Fixed18(sum / count)),
            None => {
                // The mean of i128 values always fits back into an i128
                let sum: BigInt = values.iter().map(|v| BigInt::from(v.0)).sum();
                (sum / BigInt::from(count)).to_i128().map(Fixed18)
            }
        }
    }
}

impl From<i64> for Fixed18 {
    fn from(value: i64) -> Self {
        Fixed18::from_int(value)
    }
}

// Serialized as the raw integer in a string: not every format carries i128.
impl Serialize for Fixed18 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Fixed18 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(RawVisitor)
    }
}

struct RawVisitor;

impl<'de> Visitor<'de> for RawVisitor {
    type Value = Fixed18;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a raw 18-decimal integer, as a number or a string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Fixed18, E> {
        Ok(Fixed18(v as i128))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Fixed18, E> {
        Ok(Fixed18(v as i128))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> std::result::Result<Fixed18, E> {
        Ok(Fixed18(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> std::result::Result<Fixed18, E> {
        i128::try_from(v)
            .map(Fixed18)
            .map_err(|_| E::custom("value exceeds i128"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Fixed18, E> {
        v.trim().replace('_', "").parse::<i128>()
            .map(Fixed18)
            .map_err(E::custom)
    }
}

impl fmt::Display for Fixed18 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let scale = Self::SCALE as u128;
        let whole = magnitude / scale;
        let frac = magnitude % scale;

        if frac == 0 {
            return write!(f, "{}{}", sign, whole);
        }

        let digits = format!("{:018}", frac);
        write!(f, "{}{}.{}", sign, whole, digits.trim_end_matches('0'))
    }
}
