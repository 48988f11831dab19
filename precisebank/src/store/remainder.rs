//! Global remainder counter.

use crate::types::Amount;

/// Chain-wide fractional amount minted or burned but not yet settled as a
/// whole reserve unit. Always in `[0, CF)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemainderCounter {
    cf: Amount,
    value: Amount,
}

impl RemainderCounter {
    pub fn new(cf: Amount) -> Self {
        Self {
            cf,
            value: Amount::ZERO,
        }
    }

    pub fn get(&self) -> Amount {
        self.value
    }

    /// # Panics
    ///
    /// If `amount >= CF`.
    pub fn set(&mut self, amount: Amount) {
        assert!(
            amount < self.cf,
            "remainder {amount} must be below {}",
            self.cf
        );
        self.value = amount;
    }
}
