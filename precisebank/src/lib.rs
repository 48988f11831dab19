// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # precisebank: Extended-Precision Balances
//!
//! A base ledger that only knows whole units of an integer denomination
//! (say `uatom`, 6 decimals) gains an 18-decimal view of the same asset
//! (`aatom`). Sub-unit amounts live in this crate; whole units stay in the
//! base ledger, and a reserve account there backs every fractional unit
//! outstanding:
//!
//! ```text
//! reserve_integer * CF == sum(fractional balances) + remainder
//! ```
//!
//! ## Architecture
//!
//! - **types**: amounts, addresses, coins, coin info, genesis snapshots.
//! - **conversion**: split/compose and the carry/borrow rules as pure
//!   functions.
//! - **store**: the fractional balance map, the remainder, write batches
//!   and the sled persistence layer.
//! - **bank**: the base-ledger trait and an in-memory implementation.
//! - **engine**: mint, burn, send, queries, genesis and invariant checks.
//! - **config**: module constants and storage keys.
//!
//! ## Example
//!
//! ```
//! use precisebank::{Address, Coin, CoinInfo, MemoryBank, PreciseBank};
//!
//! let mut bank = PreciseBank::new(CoinInfo::default(), MemoryBank::new()).unwrap();
//! let alice = Address::new(vec![1u8; 20]);
//!
//! bank.mint(&alice, &Coin::new("aatom", 1_000_000_000_001_000u64).into()).unwrap();
//! assert_eq!(bank.get_fractional_balance(&alice), 1000u64.into());
//! bank.check_invariants().unwrap();
//! ```

pub mod bank;
pub mod config;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod store;
pub mod types;

pub use bank::{BankError, BaseLedger, MemoryBank, Movement};
pub use engine::{PersistError, PreciseBank};
pub use error::{PreciseBankError, PreciseBankResult};
pub use store::{PreciseDb, PreciseStore};
pub use types::{Address, Amount, Coin, CoinInfo, Coins, FractionalBalance, GenesisState};
