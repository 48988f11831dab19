//! # Amounts
//!
//! Every balance, supply figure and fractional remainder is an [`Amount`]:
//! an unsigned 256-bit integer with checked arithmetic only. There is no
//! `Add` impl: every call site picks a `checked_*` method and decides what
//! an overflow means for it.
//!
//! Amounts serialize as decimal strings. JSON numbers lose precision past
//! 2^53 and a 256-bit value needs up to 78 digits.

use std::fmt;
use std::str::FromStr;

use primitive_types::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PreciseBankError;

/// A non-negative 256-bit token amount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(U256);

impl Amount {
    /// Zero.
    pub const ZERO: Amount = Amount(U256([0, 0, 0, 0]));

    /// One smallest unit.
    pub const ONE: Amount = Amount(U256([1, 0, 0, 0]));

    /// The largest representable amount.
    pub const MAX: Amount = Amount(U256::MAX);

    /// Wraps a raw `U256`.
    pub fn new(value: U256) -> Self {
        Self(value)
    }

    /// Returns the raw `U256`.
    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// Returns `true` if this amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` if this amount is strictly positive.
    pub fn is_positive(&self) -> bool {
        !self.0.is_zero()
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    pub fn checked_mul(self, other: Amount) -> Option<Amount> {
        self.0.checked_mul(other.0).map(Amount)
    }

    /// Integer division. `None` when `other` is zero.
    pub fn checked_div(self, other: Amount) -> Option<Amount> {
        self.0.checked_div(other.0).map(Amount)
    }

    /// Remainder of integer division. `None` when `other` is zero.
    pub fn checked_rem(self, other: Amount) -> Option<Amount> {
        self.0.checked_rem(other.0).map(Amount)
    }

    /// Addition clamped at [`Amount::MAX`]. Only for aggregate reporting
    /// where the terms are each far below the range.
    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    /// `10^exp`, or `None` past the 256-bit range.
    pub fn pow10(exp: u32) -> Option<Amount> {
        let ten = U256::from(10u8);
        let mut value = U256::one();
        for _ in 0..exp {
            value = value.checked_mul(ten)?;
        }
        Some(Amount(value))
    }

    /// Returns `true` for 1, 10, 100, ...
    pub fn is_power_of_ten(&self) -> bool {
        if self.0.is_zero() {
            return false;
        }
        let ten = U256::from(10u8);
        let mut value = self.0;
        while value != U256::one() {
            if !(value % ten).is_zero() {
                return false;
            }
            value /= ten;
        }
        true
    }

    /// Narrows to `u128` when the value fits.
    pub fn to_u128(&self) -> Option<u128> {
        if self.0.bits() > 128 {
            return None;
        }
        Some(self.0.low_u128())
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(U256::from(value))
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Amount(U256::from(value))
    }
}

impl From<U256> for Amount {
    fn from(value: U256) -> Self {
        Amount(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = PreciseBankError;

    /// Parses a base-10 integer. Underscore separators are accepted
    /// (`1_000_000`), signs are not.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('-') {
            return Err(PreciseBankError::InvalidAmount(format!(
                "negative amount {trimmed}"
            )));
        }
        let digits: String = trimmed.chars().filter(|c| *c != '_').collect();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PreciseBankError::InvalidAmount(format!(
                "malformed amount '{trimmed}'"
            )));
        }
        U256::from_dec_str(&digits)
            .map(Amount)
            .map_err(|_| PreciseBankError::Overflow(format!("{trimmed} exceeds 256 bits")))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
