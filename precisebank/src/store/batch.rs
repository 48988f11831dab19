//! Buffered store writes.

use std::collections::BTreeMap;

use crate::types::{Address, Amount};

/// Pending writes to the fractional store and the remainder.
///
/// Operations stage their writes here and the engine applies the batch only
/// after the base ledger accepted the matching whole-unit movements. The
/// same type doubles as the persistence journal: merging batches keeps the
/// last write per key, which is exactly what must reach disk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreBatch {
    fractional: BTreeMap<Address, Amount>,
    remainder: Option<Amount>,
}

impl StoreBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a fractional balance. Zero stages a delete.
    pub fn set_fractional(&mut self, address: Address, amount: Amount) {
        self.fractional.insert(address, amount);
    }

    pub fn set_remainder(&mut self, amount: Amount) {
        self.remainder = Some(amount);
    }

    /// The staged fractional balance, if any.
    pub fn fractional(&self, address: &Address) -> Option<Amount> {
        self.fractional.get(address).copied()
    }

    /// The staged remainder, if any.
    pub fn remainder(&self) -> Option<Amount> {
        self.remainder
    }

    pub fn fractional_writes(&self) -> impl Iterator<Item = (&Address, Amount)> + '_ {
        self.fractional.iter().map(|(a, v)| (a, *v))
    }

    /// Folds `other` in; its writes win.
    pub fn merge(&mut self, other: StoreBatch) {
        self.fractional.extend(other.fractional);
        if other.remainder.is_some() {
            self.remainder = other.remainder;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fractional.is_empty() && self.remainder.is_none()
    }

    pub fn len(&self) -> usize {
        self.fractional.len() + usize::from(self.remainder.is_some())
    }
}
