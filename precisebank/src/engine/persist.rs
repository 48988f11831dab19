//! Loading and saving an engine through [`PreciseDb`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use super::PreciseBank;
use crate::bank::BaseLedger;
use crate::error::PreciseBankError;
use crate::store::{DbError, PreciseDb};

/// Errors raised while moving an engine to or from disk.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Bank(#[from] PreciseBankError),

    #[error("database holds no precisebank state")]
    Uninitialized,

    #[error("database already holds precisebank state")]
    AlreadyInitialized,
}

impl<B> PreciseBank<B>
where
    B: BaseLedger + DeserializeOwned + Default,
{
    /// Restores an engine from `db` and re-runs every invariant on it.
    pub fn load(db: &PreciseDb) -> Result<Self, PersistError> {
        let coin_info = db.load_coin_info()?.ok_or(PersistError::Uninitialized)?;
        let store = db.load_store(coin_info.cf())?;
        let base: B = db.load_ledger()?.unwrap_or_default();

        let engine = Self::from_parts(coin_info, store, base)?;
        info!(
            balances = engine.store.fractional().len(),
            remainder = %engine.store.remainder(),
            "precisebank state loaded"
        );
        Ok(engine)
    }
}

impl<B> PreciseBank<B>
where
    B: BaseLedger + Serialize,
{
    /// Writes the complete state into an empty `db`.
    pub fn save_genesis(&mut self, db: &PreciseDb) -> Result<(), PersistError> {
        if db.is_initialized()? {
            return Err(PersistError::AlreadyInitialized);
        }
        db.write_genesis(&self.coin_info, &self.store, &self.base)?;
        self.journal = Default::default();
        Ok(())
    }

    /// Writes the journal of committed operations and the base ledger in
    /// one atomic batch. On failure the journal is kept for a retry.
    pub fn persist(&mut self, db: &PreciseDb) -> Result<(), PersistError> {
        let journal = self.take_journal();
        if let Err(err) = db.commit(&journal, &self.base) {
            self.journal = journal;
            return Err(err.into());
        }
        Ok(())
    }
}
