//! Error types for the extended-precision bank.
//!
//! Three classes share one enum. Configuration errors (`InvalidCoinInfo`,
//! `InvalidGenesis`) stop the store from starting. Caller errors are returned
//! synchronously and leave no trace in state. `InvariantViolation` signals an
//! accounting defect: the enclosing transaction must be aborted and the
//! numbers left exactly as found.

use thiserror::Error;

use crate::types::{Address, Coin};

/// Errors returned by the engine and its types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreciseBankError {
    /// A denomination failed syntax checks, or the wrong denomination was
    /// supplied for an operation.
    #[error("invalid denom: {0}")]
    InvalidDenom(String),

    /// A negative or malformed amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// An address string could not be decoded.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The debited account cannot cover the requested amount.
    #[error("spendable balance {available} is smaller than {required} for {address}")]
    InsufficientFunds {
        /// The account being debited.
        address: Address,
        /// What the account can spend, in the denomination requested.
        available: Coin,
        /// What the operation needed.
        required: Coin,
    },

    /// An amount or supply would exceed the 256-bit range.
    #[error("amount overflow: {0}")]
    Overflow(String),

    /// The base ledger reports this recipient as blocked.
    #[error("{0} is not allowed to receive funds")]
    BlockedAddress(Address),

    /// The reserve account was named as the endpoint of a mutation.
    #[error("the reserve account {0} cannot be used as an operation endpoint")]
    ReserveAccount(Address),

    /// The coin configuration is unusable.
    #[error("invalid coin info: {0}")]
    InvalidCoinInfo(String),

    /// A persisted snapshot was rejected on import.
    #[error("invalid genesis state: {0}")]
    InvalidGenesis(String),

    /// The reserve no longer backs the outstanding fractional units.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

/// Convenience alias used throughout the crate.
pub type PreciseBankResult<T> = Result<T, PreciseBankError>;
