//! Genesis import and export.

use tracing::info;

use super::PreciseBank;
use crate::bank::BaseLedger;
use crate::conversion::split;
use crate::error::{PreciseBankError, PreciseBankResult};
use crate::store::{PreciseStore, StoreBatch};
use crate::types::GenesisState;

impl<B: BaseLedger> PreciseBank<B> {
    /// Builds an engine from a snapshot.
    ///
    /// The snapshot must validate on its own, and the reserve's integer
    /// balance on `base` must equal `(sum(balances) + remainder) / CF`.
    pub fn init_genesis(genesis: GenesisState, base: B) -> PreciseBankResult<Self> {
        genesis.validate()?;
        let info = genesis.coin_info;
        let cf = info.cf();

        let total = genesis
            .balances
            .sum_amount()
            .and_then(|sum| sum.checked_add(genesis.remainder))
            .ok_or_else(|| PreciseBankError::Overflow("genesis fractional total".into()))?;
        let (expected, _) = split(total, cf);

        let mut engine = Self::assemble(info, PreciseStore::new(cf), base);
        let held = engine
            .base
            .balance(&engine.reserve, &engine.coin_info.integer_denom)
            .amount;
        if held != expected {
            return Err(PreciseBankError::InvalidGenesis(format!(
                "reserve {} holds {held}{} but fractional balances plus remainder require {expected}",
                engine.reserve, engine.coin_info.integer_denom
            )));
        }

        let mut batch = StoreBatch::new();
        for balance in genesis.balances.iter() {
            batch.set_fractional(balance.address.clone(), balance.amount);
        }
        batch.set_remainder(genesis.remainder);
        engine.store.apply(&batch);

        info!(
            balances = genesis.balances.len(),
            remainder = %genesis.remainder,
            reserve = %held,
            "precisebank genesis initialized"
        );
        Ok(engine)
    }

    /// Snapshot of the current state: coin info, non-zero fractional
    /// balances in key order, and the remainder.
    pub fn export_genesis(&self) -> GenesisState {
        let genesis = GenesisState::new(
            self.coin_info.clone(),
            self.store.balances(),
            self.store.remainder(),
        );
        info!(
            balances = genesis.balances.len(),
            remainder = %genesis.remainder,
            "precisebank genesis exported"
        );
        genesis
    }
}
