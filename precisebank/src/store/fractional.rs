//! Per-account fractional balances.

use std::collections::BTreeMap;

use crate::types::{Address, Amount};

/// Sparse map from account to its sub-unit balance.
///
/// Every stored value lies in `(0, CF)`. Writing zero deletes the entry, so
/// iteration visits non-zero holders only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FractionalBalanceStore {
    cf: Amount,
    entries: BTreeMap<Address, Amount>,
}

impl FractionalBalanceStore {
    pub fn new(cf: Amount) -> Self {
        Self {
            cf,
            entries: BTreeMap::new(),
        }
    }

    /// The account's fractional balance, zero when absent.
    pub fn get(&self, address: &Address) -> Amount {
        self.entries.get(address).copied().unwrap_or(Amount::ZERO)
    }

    /// Stores `amount`, deleting the entry when it is zero.
    ///
    /// # Panics
    ///
    /// If `amount >= CF`. Callers normalize through the carry rule first.
    pub fn set(&mut self, address: Address, amount: Amount) {
        assert!(
            amount < self.cf,
            "fractional balance {amount} for {address} must be below {}",
            self.cf
        );
        if amount.is_zero() {
            self.entries.remove(&address);
        } else {
            self.entries.insert(address, amount);
        }
    }

    /// Visits entries in key order until `callback` returns `true`.
    pub fn iterate<F>(&self, mut callback: F)
    where
        F: FnMut(&Address, Amount) -> bool,
    {
        for (address, amount) in &self.entries {
            if callback(address, *amount) {
                break;
            }
        }
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, Amount)> + '_ {
        self.entries.iter().map(|(a, v)| (a, *v))
    }

    /// Sum over every entry.
    pub fn total(&self) -> Amount {
        self.entries
            .values()
            .fold(Amount::ZERO, |acc, v| acc.saturating_add(*v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn conversion_factor(&self) -> Amount {
        self.cf
    }
}
