//! # Module Configuration & Constants
//!
//! Every fixed number the extended-precision bank relies on lives here.
//! The conversion factor itself is not a constant: it is part of
//! [`CoinInfo`](crate::types::CoinInfo), chosen once at genesis and frozen
//! for the life of the store.

// ---------------------------------------------------------------------------
// Module Identity
// ---------------------------------------------------------------------------

/// Name of this module. The reserve account is the module account derived
/// from this name, so changing it after genesis orphans the reserve.
pub const MODULE_NAME: &str = "precisebank";

/// Bech32 human-readable prefix used when rendering addresses.
pub const ADDRESS_HRP: &str = "cosmos";

/// Length of a derived module account address (truncated SHA-256).
pub const MODULE_ADDRESS_LENGTH: usize = 20;

// ---------------------------------------------------------------------------
// Denominations
// ---------------------------------------------------------------------------

/// Default integer denomination: 6 decimals, as held by the base ledger.
pub const DEFAULT_INTEGER_DENOM: &str = "uatom";

/// Default extended denomination: 18 decimals, as seen by the VM layer.
pub const DEFAULT_EXTENDED_DENOM: &str = "aatom";

/// Decimal precision of the extended denomination. The conversion factor of
/// an integer denomination with `d` decimals is `10^(EXTENDED_DECIMALS - d)`.
pub const EXTENDED_DECIMALS: u32 = 18;

/// Decimal precision of [`DEFAULT_INTEGER_DENOM`].
pub const DEFAULT_INTEGER_DECIMALS: u32 = 6;

/// Default conversion factor: `10^(18 - 6)`.
pub const DEFAULT_CONVERSION_FACTOR: u64 = 1_000_000_000_000;

/// Largest accepted conversion factor (an integer denomination with a single
/// decimal place).
pub const MAX_CONVERSION_FACTOR: u64 = 100_000_000_000_000_000;

/// Minimum denomination length, first letter included.
pub const MIN_DENOM_LENGTH: usize = 3;

/// Maximum denomination length, first letter included.
pub const MAX_DENOM_LENGTH: usize = 128;

// ---------------------------------------------------------------------------
// Storage Layout
// ---------------------------------------------------------------------------

/// Key prefix for per-account fractional balances: `0x01 || address`.
pub const FRACTIONAL_BALANCE_PREFIX: u8 = 0x01;

/// Key of the global remainder scalar.
pub const REMAINDER_KEY: &[u8] = &[0x02];

/// Key of the persisted [`CoinInfo`](crate::types::CoinInfo).
pub const COIN_INFO_KEY: &[u8] = &[0x03];

/// Key of the opaque base-ledger snapshot stored next to the module state.
pub const LEDGER_SNAPSHOT_KEY: &[u8] = &[0x04];

/// Name of the sled tree holding every key above. A single tree keeps one
/// `Batch` atomic across all of them.
pub const STORE_TREE_NAME: &str = "precisebank";
