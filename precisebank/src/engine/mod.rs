//! # Ledger Engine
//!
//! Orchestrates the base ledger, the fractional store and the remainder so
//! that the reserve always backs every fractional unit outstanding:
//!
//! ```text
//! reserve_integer * CF == sum(fractional) + remainder
//! ```
//!
//! ## Execution model
//!
//! Every mutation runs in two phases. Planning reads current state and
//! produces a plan: the whole-unit [`Movement`]s for the base ledger and
//! a [`StoreBatch`] of fractional and remainder writes. Nothing is written
//! while planning, so any failure there leaves no trace.
//!
//! Committing first checks that the plan preserves the reserve backing, then
//! hands the movements to [`BaseLedger::apply`] (all or nothing), and only
//! then applies the store batch, which cannot fail. The applied batch is
//! also merged into a journal that persistence drains with
//! [`PreciseBank::take_journal`].
//!
//! The engine is single-writer. Callers serialize access.

pub mod burn;
pub mod genesis;
pub mod invariants;
pub mod mint;
pub mod persist;
pub mod query;
pub mod send;

pub use persist::PersistError;
pub use query::{
    FractionalBalanceResponse, RemainderResponse, TotalFractionalBalancesResponse,
};

use tracing::debug;

use crate::bank::{BaseLedger, Movement};
use crate::config::MODULE_NAME;
use crate::conversion::compose;
use crate::error::{PreciseBankError, PreciseBankResult};
use crate::store::{PreciseStore, StoreBatch};
use crate::types::{Address, Amount, Coin, CoinInfo, Coins, FractionalBalances, GenesisState};

/// Staged effects of one operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Plan {
    pub(crate) movements: Vec<Movement>,
    pub(crate) batch: StoreBatch,
}

impl Plan {
    pub(crate) fn push(&mut self, movement: Movement) {
        let amount = match &movement {
            Movement::Mint { coin, .. }
            | Movement::Burn { coin, .. }
            | Movement::Transfer { coin, .. } => coin.amount,
        };
        if amount.is_positive() {
            self.movements.push(movement);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.movements.is_empty() && self.batch.is_empty()
    }
}

/// The extended-precision bank over a base ledger `B`.
#[derive(Clone, Debug)]
pub struct PreciseBank<B: BaseLedger> {
    coin_info: CoinInfo,
    reserve: Address,
    base: B,
    store: PreciseStore,
    journal: StoreBatch,
}

impl<B: BaseLedger> PreciseBank<B> {
    /// Starts an empty module over `base`. The reserve must hold no
    /// integer units yet.
    pub fn new(coin_info: CoinInfo, base: B) -> PreciseBankResult<Self> {
        coin_info.validate()?;
        let genesis = GenesisState::new(coin_info, FractionalBalances::default(), Amount::ZERO);
        Self::init_genesis(genesis, base)
    }

    /// Reassembles an engine from state loaded elsewhere and re-runs every
    /// invariant against it.
    pub fn from_parts(coin_info: CoinInfo, store: PreciseStore, base: B) -> PreciseBankResult<Self> {
        coin_info.validate()?;
        let engine = Self::assemble(coin_info, store, base);
        engine.check_invariants()?;
        Ok(engine)
    }

    fn assemble(coin_info: CoinInfo, store: PreciseStore, base: B) -> Self {
        Self {
            coin_info,
            reserve: Address::module(MODULE_NAME),
            base,
            store,
            journal: StoreBatch::new(),
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn coin_info(&self) -> &CoinInfo {
        &self.coin_info
    }

    /// The module account whose integer balance backs the fractional units.
    pub fn reserve_address(&self) -> &Address {
        &self.reserve
    }

    pub fn base(&self) -> &B {
        &self.base
    }

    /// Direct access to the base ledger, for seeding accounts and setting
    /// external policy. Moving the reserve's integer units through it breaks
    /// the backing invariant.
    pub fn base_mut(&mut self) -> &mut B {
        &mut self.base
    }

    pub fn store(&self) -> &PreciseStore {
        &self.store
    }

    pub fn into_base(self) -> B {
        self.base
    }

    /// Drains the store writes committed since the last call.
    pub fn take_journal(&mut self) -> StoreBatch {
        std::mem::take(&mut self.journal)
    }

    fn cf(&self) -> Amount {
        self.coin_info.cf()
    }

    // -- Balance queries ------------------------------------------------------

    /// Balance of `denom`. The extended denomination composes the integer
    /// balance with the fractional one; the reserve reports zero there.
    pub fn get_balance(&self, address: &Address, denom: &str) -> PreciseBankResult<Coin> {
        if denom != self.coin_info.extended_denom {
            return Ok(self.base.balance(address, denom));
        }
        if *address == self.reserve {
            return Ok(Coin::zero(denom));
        }
        let integer = self.base.balance(address, &self.coin_info.integer_denom);
        self.extended_coin(integer.amount, self.store.fractional().get(address))
    }

    /// Like [`get_balance`](Self::get_balance) but the integer part comes
    /// from the base ledger's spendable balance.
    pub fn spendable_coin(&self, address: &Address, denom: &str) -> PreciseBankResult<Coin> {
        if denom != self.coin_info.extended_denom {
            return Ok(self.base.spendable_balance(address, denom));
        }
        if *address == self.reserve {
            return Ok(Coin::zero(denom));
        }
        let integer = self
            .base
            .spendable_balance(address, &self.coin_info.integer_denom);
        self.extended_coin(integer.amount, self.store.fractional().get(address))
    }

    fn extended_coin(&self, integer: Amount, fractional: Amount) -> PreciseBankResult<Coin> {
        let amount = compose(integer, fractional, self.cf()).ok_or_else(|| {
            PreciseBankError::Overflow(format!(
                "{integer}{} as {}",
                self.coin_info.integer_denom, self.coin_info.extended_denom
            ))
        })?;
        Ok(Coin::new(self.coin_info.extended_denom.clone(), amount))
    }

    pub fn get_fractional_balance(&self, address: &Address) -> Amount {
        self.store.fractional().get(address)
    }

    /// Visits fractional balances in key order until `callback` returns
    /// `true`.
    pub fn iterate_fractional_balances<F>(&self, callback: F)
    where
        F: FnMut(&Address, Amount) -> bool,
    {
        self.store.fractional().iterate(callback)
    }

    pub fn get_remainder_amount(&self) -> Amount {
        self.store.remainder()
    }

    pub fn get_total_fractional_balances(&self) -> Amount {
        self.store.fractional().total()
    }

    // -- Pass-through queries -------------------------------------------------

    pub fn get_all_balances(&self, address: &Address) -> Coins {
        self.base.all_balances(address)
    }

    pub fn get_supply(&self, denom: &str) -> Coin {
        self.base.supply(denom)
    }

    pub fn iterate_total_supply(&self, callback: &mut dyn FnMut(&Coin) -> bool) {
        self.base.iterate_total_supply(callback)
    }

    pub fn blocked_addr(&self, address: &Address) -> bool {
        self.base.is_blocked(address)
    }

    // -- Shared planning helpers ---------------------------------------------

    fn ensure_not_reserve(&self, address: &Address) -> PreciseBankResult<()> {
        if *address == self.reserve {
            return Err(PreciseBankError::ReserveAccount(address.clone()));
        }
        Ok(())
    }

    /// Fails unless `address` can spend `amount` of the extended denomination.
    fn ensure_spendable(&self, address: &Address, amount: Amount) -> PreciseBankResult<()> {
        let available = self.spendable_coin(address, &self.coin_info.extended_denom)?;
        if available.amount < amount {
            return Err(PreciseBankError::InsufficientFunds {
                address: address.clone(),
                available,
                required: Coin::new(self.coin_info.extended_denom.clone(), amount),
            });
        }
        Ok(())
    }

    fn integer_coin(&self, amount: Amount) -> Coin {
        Coin::new(self.coin_info.integer_denom.clone(), amount)
    }

    /// Applies a plan: backing check, base-ledger movements, then store
    /// writes.
    fn commit(&mut self, op: &'static str, plan: Plan) -> PreciseBankResult<()> {
        if plan.is_empty() {
            return Ok(());
        }
        self.verify_plan(&plan)?;
        self.base.apply(&plan.movements)?;
        self.store.apply(&plan.batch);

        debug!(
            op,
            movements = plan.movements.len(),
            writes = plan.batch.len(),
            remainder = %self.store.remainder(),
            "committed"
        );
        self.journal.merge(plan.batch);
        Ok(())
    }
}
