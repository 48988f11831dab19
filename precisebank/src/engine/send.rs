//! Transfers between accounts.
//!
//! Supply is conserved, so the remainder never moves. `q` whole units go
//! from sender to recipient. The sender's fractional balance is debited by
//! `r` (borrowing one unit into the reserve when short) and the recipient's
//! is credited by `r` (carrying one unit out of the reserve at `CF`). A
//! borrow and a carry together net out to one more unit sent directly.

use tracing::debug;

use super::{Plan, PreciseBank};
use crate::bank::{BaseLedger, Movement};
use crate::conversion::{credit_fractional, debit_fractional, split, UnitDelta};
use crate::error::{PreciseBankError, PreciseBankResult};
use crate::types::{Address, Amount, Coins};

impl<B: BaseLedger> PreciseBank<B> {
    /// Moves `coins` from `from` to `to`. Denominations other than the
    /// extended one, the integer one included, are plain base-ledger
    /// transfers. Recipients the base ledger reports as blocked are refused
    /// before anything is planned.
    pub fn send_coins(&mut self, from: &Address, to: &Address, coins: &Coins) -> PreciseBankResult<()> {
        if self.base.is_blocked(to) {
            return Err(PreciseBankError::BlockedAddress(to.clone()));
        }
        self.transfer(from, to, coins)
    }

    /// Sends from a module account to a user account.
    pub fn send_coins_from_module_to_account(
        &mut self,
        module: &str,
        to: &Address,
        coins: &Coins,
    ) -> PreciseBankResult<()> {
        self.send_coins(&Address::module(module), to, coins)
    }

    /// Sends from a user account to a module account. Module recipients are
    /// never checked against the blocked list.
    pub fn send_coins_from_account_to_module(
        &mut self,
        from: &Address,
        module: &str,
        coins: &Coins,
    ) -> PreciseBankResult<()> {
        self.transfer(from, &Address::module(module), coins)
    }

    pub fn send_coins_from_module_to_module(
        &mut self,
        from_module: &str,
        to_module: &str,
        coins: &Coins,
    ) -> PreciseBankResult<()> {
        self.transfer(
            &Address::module(from_module),
            &Address::module(to_module),
            coins,
        )
    }

    fn transfer(&mut self, from: &Address, to: &Address, coins: &Coins) -> PreciseBankResult<()> {
        let plan = self.plan_send(from, to, coins)?;
        self.commit("send", plan)?;
        debug!(from = %from, to = %to, coins = %coins, "sent");
        Ok(())
    }

    pub(crate) fn plan_send(
        &self,
        from: &Address,
        to: &Address,
        coins: &Coins,
    ) -> PreciseBankResult<Plan> {
        self.ensure_not_reserve(from)?;
        self.ensure_not_reserve(to)?;

        let (amount, others) = coins.take_denom(&self.coin_info.extended_denom);
        let mut plan = Plan::default();
        for coin in others.iter() {
            plan.push(Movement::Transfer {
                from: from.clone(),
                to: to.clone(),
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
            plan.push(Movement::Transfer {
                from: from.clone(),
                to: to.clone(),
                coin: self.integer_coin(q),
            });
            return Ok(plan);
        }

        let overflow = || PreciseBankError::Overflow(format!("sending {amount}"));

        // Stage the debit before reading the recipient so a self-send sees it.
        let debit = debit_fractional(self.store.fractional_with(&plan.batch, from), r, cf)
            .ok_or_else(overflow)?;
        plan.batch.set_fractional(from.clone(), debit.fractional);

        let credit = credit_fractional(self.store.fractional_with(&plan.batch, to), r, cf)
            .ok_or_else(overflow)?;
        plan.batch.set_fractional(to.clone(), credit.fractional);

        let q_plus_one = q.checked_add(Amount::ONE).ok_or_else(overflow)?;
        match (debit.units, credit.units) {
            (UnitDelta::Borrow, UnitDelta::Carry) => {
                plan.push(Movement::Transfer {
                    from: from.clone(),
                    to: to.clone(),
                    coin: self.integer_coin(q_plus_one),
                });
            }
            (UnitDelta::Borrow, _) => {
                plan.push(Movement::Transfer {
                    from: from.clone(),
                    to: to.clone(),
                    coin: self.integer_coin(q),
                });
                plan.push(Movement::Transfer {
                    from: from.clone(),
                    to: self.reserve.clone(),
                    coin: self.integer_coin(Amount::ONE),
                });
            }
            (_, UnitDelta::Carry) => {
                plan.push(Movement::Transfer {
                    from: from.clone(),
                    to: to.clone(),
                    coin: self.integer_coin(q),
                });
                plan.push(Movement::Transfer {
                    from: self.reserve.clone(),
                    to: to.clone(),
                    coin: self.integer_coin(Amount::ONE),
                });
            }
            _ => {
                plan.push(Movement::Transfer {
                    from: from.clone(),
                    to: to.clone(),
                    coin: self.integer_coin(q),
                });
            }
        }
        Ok(plan)
    }
}
