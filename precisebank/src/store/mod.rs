//! # Module State
//!
//! The two data structures this module owns: the fractional balance map and
//! the global remainder. They are only ever written together, through a
//! [`StoreBatch`], so no reader sees one updated without the other.

pub mod batch;
pub mod db;
pub mod fractional;
pub mod remainder;

pub use batch::StoreBatch;
pub use db::{DbError, DbResult, PreciseDb};
pub use fractional::FractionalBalanceStore;
pub use remainder::RemainderCounter;

use crate::types::{Address, Amount, FractionalBalance, FractionalBalances};

/// Fractional balances and remainder for one conversion factor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreciseStore {
    fractional: FractionalBalanceStore,
    remainder: RemainderCounter,
}

impl PreciseStore {
    pub fn new(cf: Amount) -> Self {
        Self {
            fractional: FractionalBalanceStore::new(cf),
            remainder: RemainderCounter::new(cf),
        }
    }

    pub fn fractional(&self) -> &FractionalBalanceStore {
        &self.fractional
    }

    pub fn remainder(&self) -> Amount {
        self.remainder.get()
    }

    /// The account's fractional balance as `batch` would leave it.
    pub fn fractional_with(&self, batch: &StoreBatch, address: &Address) -> Amount {
        batch
            .fractional(address)
            .unwrap_or_else(|| self.fractional.get(address))
    }

    /// The remainder as `batch` would leave it.
    pub fn remainder_with(&self, batch: &StoreBatch) -> Amount {
        batch.remainder().unwrap_or_else(|| self.remainder.get())
    }

    /// Applies every staged write.
    ///
    /// # Panics
    ///
    /// If a staged value is out of range. Plans produce normalized values
    /// only, so this indicates a defect in the planner.
    pub fn apply(&mut self, batch: &StoreBatch) {
        for (address, amount) in batch.fractional_writes() {
            self.fractional.set(address.clone(), amount);
        }
        if let Some(remainder) = batch.remainder() {
            self.remainder.set(remainder);
        }
    }

    /// A batch that recreates this store from empty.
    pub fn to_batch(&self) -> StoreBatch {
        let mut batch = StoreBatch::new();
        for (address, amount) in self.fractional.iter() {
            batch.set_fractional(address.clone(), amount);
        }
        batch.set_remainder(self.remainder.get());
        batch
    }

    /// Non-zero balances in key order.
    pub fn balances(&self) -> FractionalBalances {
        self.fractional
            .iter()
            .map(|(address, amount)| FractionalBalance::new(address.clone(), amount))
            .collect::<Vec<_>>()
            .into()
    }
}
