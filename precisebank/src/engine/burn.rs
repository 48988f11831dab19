//! Burning.
//!
//! Mirror image of minting: `q` whole units leave the account directly, then
//! `r` comes out of its fractional balance, borrowing one unit into the
//! reserve when short. The burned `r` accrues to the remainder, and once that
//! holds a whole unit the reserve burns it. A borrow and a reserve burn in
//! the same operation net out to one more unit burned straight from the
//! account.

use tracing::debug;

use super::{Plan, PreciseBank};
use crate::bank::{BaseLedger, Movement};
use crate::config::MODULE_NAME;
use crate::conversion::{debit_fractional, remainder_after_burn, split, ReserveDelta, UnitDelta};
use crate::error::{PreciseBankError, PreciseBankResult};
use crate::types::{Address, Amount, Coins};

impl<B: BaseLedger> PreciseBank<B> {
    /// Burns `coins` from `from`.
    pub fn burn(&mut self, from: &Address, coins: &Coins) -> PreciseBankResult<()> {
        let plan = self.plan_burn(from, coins)?;
        self.commit("burn", plan)?;
        debug!(from = %from, coins = %coins, "burned");
        Ok(())
    }

    /// Burns from the account of module `module`.
    pub fn burn_coins(&mut self, module: &str, coins: &Coins) -> PreciseBankResult<()> {
        if module == MODULE_NAME {
            return Err(PreciseBankError::ReserveAccount(self.reserve.clone()));
        }
        self.burn(&Address::module(module), coins)
    }

    pub(crate) fn plan_burn(&self, from: &Address, coins: &Coins) -> PreciseBankResult<Plan> {
        self.ensure_not_reserve(from)?;
        let info = &self.coin_info;
        if coins.amount_of(&info.integer_denom).is_positive() {
            return Err(PreciseBankError::InvalidDenom(format!(
                "cannot burn {} directly; burn {} instead",
                info.integer_denom, info.extended_denom
            )));
        }

        let (amount, others) = coins.take_denom(&info.extended_denom);
        let mut plan = Plan::default();
        for coin in others.iter() {
            plan.push(Movement::Burn {
                from: from.clone(),
                coin: coin.clone(),
            });
        }
        if amount.is_zero() {
            return Ok(plan);
        }

        self.ensure_spendable(from, amount)?;
        let cf = self.cf();
        let (q, r) = split(amount, cf);

        if r.is_zero() {
            plan.push(Movement::Burn {
                from: from.clone(),
                coin: self.integer_coin(q),
            });
            return Ok(plan);
        }

        let overflow = || PreciseBankError::Overflow(format!("burning {amount}"));
        let step = debit_fractional(self.store.fractional().get(from), r, cf).ok_or_else(overflow)?;
        let (remainder, reserve) =
            remainder_after_burn(self.store.remainder(), r, cf).ok_or_else(overflow)?;
        let q_plus_one = q.checked_add(Amount::ONE).ok_or_else(overflow)?;

        match (step.units, reserve) {
            (UnitDelta::Borrow, ReserveDelta::Burn) => {
                plan.push(Movement::Burn {
                    from: from.clone(),
                    coin: self.integer_coin(q_plus_one),
                });
            }
            (UnitDelta::Borrow, _) => {
                plan.push(Movement::Burn {
                    from: from.clone(),
                    coin: self.integer_coin(q),
                });
                plan.push(Movement::Transfer {
                    from: from.clone(),
                    to: self.reserve.clone(),
                    coin: self.integer_coin(Amount::ONE),
                });
            }
            (_, ReserveDelta::Burn) => {
                plan.push(Movement::Burn {
                    from: from.clone(),
                    coin: self.integer_coin(q),
                });
                plan.push(Movement::Burn {
                    from: self.reserve.clone(),
                    coin: self.integer_coin(Amount::ONE),
                });
            }
            _ => {
                plan.push(Movement::Burn {
                    from: from.clone(),
                    coin: self.integer_coin(q),
                });
            }
        }

        plan.batch.set_fractional(from.clone(), step.fractional);
        plan.batch.set_remainder(remainder);
        Ok(plan)
    }
}
