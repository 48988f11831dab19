//! Denomination pair and conversion factor, fixed at genesis.

use serde::{Deserialize, Serialize};

use super::{coin::validate_denom, Amount};
use crate::config::{
    DEFAULT_CONVERSION_FACTOR, DEFAULT_EXTENDED_DENOM, DEFAULT_INTEGER_DENOM, EXTENDED_DECIMALS,
    MAX_CONVERSION_FACTOR,
};
use crate::error::{PreciseBankError, PreciseBankResult};

/// The integer/extended denomination pair and the number of extended
/// sub-units per integer unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinInfo {
    pub integer_denom: String,
    pub extended_denom: String,
    pub conversion_factor: Amount,
}

impl CoinInfo {
    /// Builds and validates a coin info.
    pub fn new(
        integer_denom: impl Into<String>,
        extended_denom: impl Into<String>,
        conversion_factor: impl Into<Amount>,
    ) -> PreciseBankResult<Self> {
        let info = Self {
            integer_denom: integer_denom.into(),
            extended_denom: extended_denom.into(),
            conversion_factor: conversion_factor.into(),
        };
        info.validate()?;
        Ok(info)
    }

    /// Derives the conversion factor from the integer denomination's decimal
    /// places: `CF = 10^(18 - decimals)`.
    pub fn from_decimals(
        integer_denom: impl Into<String>,
        extended_denom: impl Into<String>,
        decimals: u32,
    ) -> PreciseBankResult<Self> {
        if decimals == 0 || decimals > EXTENDED_DECIMALS {
            return Err(PreciseBankError::InvalidCoinInfo(format!(
                "integer decimals must be between 1 and {EXTENDED_DECIMALS}, got {decimals}"
            )));
        }
        let factor = Amount::pow10(EXTENDED_DECIMALS - decimals).ok_or_else(|| {
            PreciseBankError::InvalidCoinInfo("conversion factor out of range".into())
        })?;
        Self::new(integer_denom, extended_denom, factor)
    }

    pub fn validate(&self) -> PreciseBankResult<()> {
        validate_denom(&self.integer_denom)
            .map_err(|e| PreciseBankError::InvalidCoinInfo(format!("integer denom: {e}")))?;
        validate_denom(&self.extended_denom)
            .map_err(|e| PreciseBankError::InvalidCoinInfo(format!("extended denom: {e}")))?;

        if self.integer_denom == self.extended_denom {
            return Err(PreciseBankError::InvalidCoinInfo(format!(
                "integer and extended denom are both '{}'",
                self.integer_denom
            )));
        }

        let cf = self.conversion_factor;
        if cf.is_zero() {
            return Err(PreciseBankError::InvalidCoinInfo(
                "conversion factor must be positive".into(),
            ));
        }
        if cf > Amount::from(MAX_CONVERSION_FACTOR) {
            return Err(PreciseBankError::InvalidCoinInfo(format!(
                "conversion factor {cf} exceeds max of {MAX_CONVERSION_FACTOR}"
            )));
        }
        if !cf.is_power_of_ten() {
            return Err(PreciseBankError::InvalidCoinInfo(format!(
                "conversion factor {cf} is not a power of 10"
            )));
        }
        Ok(())
    }

    /// Shorthand for `conversion_factor`.
    pub fn cf(&self) -> Amount {
        self.conversion_factor
    }

    /// Largest valid fractional balance or remainder: `CF - 1`.
    pub fn max_fractional(&self) -> Amount {
        self.conversion_factor
            .checked_sub(Amount::ONE)
            .unwrap_or(Amount::ZERO)
    }
}

impl Default for CoinInfo {
    fn default() -> Self {
        Self {
            integer_denom: DEFAULT_INTEGER_DENOM.to_string(),
            extended_denom: DEFAULT_EXTENDED_DENOM.to_string(),
            conversion_factor: Amount::from(DEFAULT_CONVERSION_FACTOR),
        }
    }
}
