//! # Genesis Snapshot
//!
//! The persisted form of the module: coin info, every non-zero fractional
//! balance and the remainder. A snapshot is self-consistent on its own
//! (`sum + remainder` is a whole number of integer units); the check against
//! the reserve's actual integer holding happens at import, in the engine.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{Address, Amount, CoinInfo};
use crate::error::{PreciseBankError, PreciseBankResult};

/// One account's fractional balance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FractionalBalance {
    pub address: Address,
    pub amount: Amount,
}

impl FractionalBalance {
    pub fn new(address: Address, amount: impl Into<Amount>) -> Self {
        Self {
            address,
            amount: amount.into(),
        }
    }

    /// Checks `0 < amount < cf`.
    pub fn validate(&self, cf: Amount) -> Result<(), String> {
        if self.amount.is_zero() {
            return Err(format!(
                "invalid fractional balance for {}: non-positive amount {}",
                self.address, self.amount
            ));
        }
        if self.amount >= cf {
            return Err(format!(
                "invalid fractional balance for {}: amount {} exceeds max of {}",
                self.address,
                self.amount,
                cf.checked_sub(Amount::ONE).unwrap_or(Amount::ZERO)
            ));
        }
        Ok(())
    }
}

/// A list of fractional balances with unique addresses.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FractionalBalances(pub Vec<FractionalBalance>);

impl FractionalBalances {
    pub fn validate(&self, cf: Amount) -> Result<(), String> {
        let mut seen = BTreeSet::new();
        for balance in &self.0 {
            balance.validate(cf)?;
            if !seen.insert(&balance.address) {
                return Err(format!("duplicate address {}", balance.address));
            }
        }
        Ok(())
    }

    /// Sum of every amount. `None` on overflow.
    pub fn sum_amount(&self) -> Option<Amount> {
        self.0
            .iter()
            .try_fold(Amount::ZERO, |acc, b| acc.checked_add(b.amount))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FractionalBalance> {
        self.0.iter()
    }
}

impl From<Vec<FractionalBalance>> for FractionalBalances {
    fn from(balances: Vec<FractionalBalance>) -> Self {
        Self(balances)
    }
}

/// Complete module snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub coin_info: CoinInfo,
    pub balances: FractionalBalances,
    pub remainder: Amount,
}

impl GenesisState {
    pub fn new(coin_info: CoinInfo, balances: FractionalBalances, remainder: Amount) -> Self {
        Self {
            coin_info,
            balances,
            remainder,
        }
    }

    /// Checks the snapshot in isolation.
    ///
    /// Each balance lies in `(0, CF)` with no repeated address, the remainder
    /// lies in `[0, CF)`, and `sum(balances) + remainder` is a multiple of
    /// `CF` so a whole number of reserve units can back it.
    pub fn validate(&self) -> PreciseBankResult<()> {
        self.coin_info
            .validate()
            .map_err(|e| PreciseBankError::InvalidGenesis(e.to_string()))?;
        let cf = self.coin_info.cf();

        self.balances
            .validate(cf)
            .map_err(|e| PreciseBankError::InvalidGenesis(format!("invalid balances: {e}")))?;

        if self.remainder >= cf {
            return Err(PreciseBankError::InvalidGenesis(format!(
                "remainder {} exceeds max of {}",
                self.remainder,
                self.coin_info.max_fractional()
            )));
        }

        let sum = self.balances.sum_amount().ok_or_else(|| {
            PreciseBankError::InvalidGenesis("sum of fractional balances overflows".into())
        })?;
        let total = self.total_amount_with_remainder()?;
        let misaligned = total.checked_rem(cf).is_some_and(|rem| !rem.is_zero());
        if misaligned {
            return Err(PreciseBankError::InvalidGenesis(format!(
                "sum of fractional balances {sum} + remainder {} is not a multiple of {cf}",
                self.remainder
            )));
        }
        Ok(())
    }

    /// `sum(balances) + remainder`, the extended amount the reserve backs.
    pub fn total_amount_with_remainder(&self) -> PreciseBankResult<Amount> {
        self.balances
            .sum_amount()
            .and_then(|sum| sum.checked_add(self.remainder))
            .ok_or_else(|| {
                PreciseBankError::Overflow("fractional balances plus remainder".into())
            })
    }
}
