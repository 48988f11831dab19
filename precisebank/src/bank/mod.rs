//! # Base Ledger Interface
//!
//! The integer-unit bank this module sits on. It owns account existence,
//! spendability locks and the blocked-address list; this module only ever
//! asks it for whole-unit movements.
//!
//! Mutations go through [`BaseLedger::apply`] with the complete movement set
//! of one operation. Implementations must apply all of it or none of it,
//! and must not apply recipient policy there: reserve legs of a mint or a
//! module-bound send are allowed into blocked accounts. The engine consults
//! [`BaseLedger::is_blocked`] once per send, before planning.

pub mod memory;

pub use memory::MemoryBank;

use thiserror::Error;

use crate::error::PreciseBankError;
use crate::types::{Address, Coin, Coins};

/// Errors raised by the base ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    #[error("insufficient funds: {address} has {available}, needs {required}")]
    InsufficientFunds {
        address: Address,
        available: Coin,
        required: Coin,
    },

    #[error("supply overflow: {0}")]
    Overflow(String),
}

impl From<BankError> for PreciseBankError {
    fn from(err: BankError) -> Self {
        match err {
            BankError::InsufficientFunds {
                address,
                available,
                required,
            } => PreciseBankError::InsufficientFunds {
                address,
                available,
                required,
            },
            BankError::Overflow(msg) => PreciseBankError::Overflow(msg),
        }
    }
}

/// A single whole-unit movement on the base ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Movement {
    Mint { to: Address, coin: Coin },
    Burn { from: Address, coin: Coin },
    Transfer { from: Address, to: Address, coin: Coin },
}

/// The integer-precision bank.
pub trait BaseLedger {
    /// Raw balance of `denom`.
    fn balance(&self, address: &Address, denom: &str) -> Coin;

    /// Every non-zero balance the account holds.
    fn all_balances(&self, address: &Address) -> Coins;

    /// The part of the balance not held by an external lock.
    fn spendable_balance(&self, address: &Address, denom: &str) -> Coin;

    /// Total supply of `denom`.
    fn supply(&self, denom: &str) -> Coin;

    /// Visits the total supply of every denomination until `callback`
    /// returns `true`.
    fn iterate_total_supply(&self, callback: &mut dyn FnMut(&Coin) -> bool);

    /// Whether the account is barred from receiving user sends.
    fn is_blocked(&self, address: &Address) -> bool;

    /// Applies `movements` in order, atomically.
    fn apply(&mut self, movements: &[Movement]) -> Result<(), BankError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_errors_surface_unchanged() {
        let addr = Address::new(vec![1; 20]);
        let err: PreciseBankError = BankError::InsufficientFunds {
            address: addr.clone(),
            available: Coin::new("uatom", 1u64),
            required: Coin::new("uatom", 2u64),
        }
        .into();
        assert!(matches!(
            err,
            PreciseBankError::InsufficientFunds { address, .. } if address == addr
        ));

        let err: PreciseBankError = BankError::Overflow("uatom".into()).into();
        assert!(matches!(err, PreciseBankError::Overflow(_)));
    }
}
