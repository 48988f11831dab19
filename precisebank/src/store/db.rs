//! # PreciseDb: Persistent Module State
//!
//! Durable home of the module state on sled. Everything lives in one tree so
//! that a single `Batch` covers the whole commit:
//!
//! | Key                    | Value                          |
//! |------------------------|--------------------------------|
//! | `0x01 \|\| address`    | `bincode(Amount)` fractional   |
//! | `0x02`                 | `bincode(Amount)` remainder    |
//! | `0x03`                 | `bincode(CoinInfo)`            |
//! | `0x04`                 | `bincode(L)` base ledger       |
//!
//! The base-ledger snapshot is opaque to this module; it sits in the same
//! tree only so that a commit lands the whole-unit side and the fractional
//! side in one atomic write.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::{Batch, Db, Tree};

use super::{PreciseStore, StoreBatch};
use crate::config::{
    COIN_INFO_KEY, FRACTIONAL_BALANCE_PREFIX, LEDGER_SNAPSHOT_KEY, REMAINDER_KEY,
    STORE_TREE_NAME,
};
use crate::types::{Address, Amount, CoinInfo};

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors raised by the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored value violates the range rules of the module state.
    #[error("corrupted store: {0}")]
    Corrupted(String),
}

pub type DbResult<T> = Result<T, DbError>;

fn encode<T: Serialize>(value: &T) -> DbResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| DbError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> DbResult<T> {
    bincode::deserialize(bytes).map_err(|e| DbError::Serialization(e.to_string()))
}

/// `0x01 || address`.
fn fractional_key(address: &Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + address.as_bytes().len());
    key.push(FRACTIONAL_BALANCE_PREFIX);
    key.extend_from_slice(address.as_bytes());
    key
}

// ---------------------------------------------------------------------------
// PreciseDb
// ---------------------------------------------------------------------------

/// sled-backed storage for coin info, module state and the base-ledger
/// snapshot.
#[derive(Debug, Clone)]
pub struct PreciseDb {
    db: Db,
    tree: Tree,
}

impl PreciseDb {
    /// Opens or creates a database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// In-memory database dropped with the handle. Used by tests.
    pub fn open_temporary() -> DbResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> DbResult<Self> {
        let tree = db.open_tree(STORE_TREE_NAME)?;
        Ok(Self { db, tree })
    }

    /// `true` once coin info has been written.
    pub fn is_initialized(&self) -> DbResult<bool> {
        Ok(self.tree.contains_key(COIN_INFO_KEY)?)
    }

    pub fn load_coin_info(&self) -> DbResult<Option<CoinInfo>> {
        self.tree
            .get(COIN_INFO_KEY)?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    /// Rebuilds the module state. Out-of-range values are reported as
    /// corruption rather than loaded.
    pub fn load_store(&self, cf: Amount) -> DbResult<PreciseStore> {
        let mut batch = StoreBatch::new();

        for entry in self.tree.scan_prefix([FRACTIONAL_BALANCE_PREFIX]) {
            let (key, value) = entry?;
            let address = Address::from(&key[1..]);
            let amount: Amount = decode(&value)?;
            if amount.is_zero() || amount >= cf {
                return Err(DbError::Corrupted(format!(
                    "fractional balance {amount} for {address} outside (0, {cf})"
                )));
            }
            batch.set_fractional(address, amount);
        }

        if let Some(bytes) = self.tree.get(REMAINDER_KEY)? {
            let remainder: Amount = decode(&bytes)?;
            if remainder >= cf {
                return Err(DbError::Corrupted(format!(
                    "remainder {remainder} not below {cf}"
                )));
            }
            batch.set_remainder(remainder);
        }

        let mut store = PreciseStore::new(cf);
        store.apply(&batch);
        Ok(store)
    }

    pub fn load_ledger<L: DeserializeOwned>(&self) -> DbResult<Option<L>> {
        self.tree
            .get(LEDGER_SNAPSHOT_KEY)?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    /// Writes coin info, a full store image and the ledger snapshot. Used
    /// once, when a data directory is initialized.
    pub fn write_genesis<L: Serialize>(
        &self,
        coin_info: &CoinInfo,
        store: &PreciseStore,
        ledger: &L,
    ) -> DbResult<()> {
        let mut batch = self.stage(&store.to_batch(), ledger)?;
        batch.insert(COIN_INFO_KEY, encode(coin_info)?);
        self.tree.apply_batch(batch)?;
        self.db.flush()?;
        Ok(())
    }

    /// Persists a journal of store writes together with the ledger snapshot
    /// in one atomic batch.
    pub fn commit<L: Serialize>(&self, journal: &StoreBatch, ledger: &L) -> DbResult<()> {
        let batch = self.stage(journal, ledger)?;
        self.tree.apply_batch(batch)?;
        self.db.flush()?;
        Ok(())
    }

    fn stage<L: Serialize>(&self, journal: &StoreBatch, ledger: &L) -> DbResult<Batch> {
        let mut batch = Batch::default();
        for (address, amount) in journal.fractional_writes() {
            let key = fractional_key(address);
            if amount.is_zero() {
                batch.remove(key);
            } else {
                batch.insert(key, encode(&amount)?);
            }
        }
        if let Some(remainder) = journal.remainder() {
            batch.insert(REMAINDER_KEY, encode(&remainder)?);
        }
        batch.insert(LEDGER_SNAPSHOT_KEY, encode(ledger)?);
        Ok(batch)
    }

    /// Number of stored fractional entries.
    pub fn fractional_count(&self) -> usize {
        self.tree.scan_prefix([FRACTIONAL_BALANCE_PREFIX]).count()
    }
}
