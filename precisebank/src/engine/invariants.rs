//! # Invariant Checks
//!
//! Full-state checks run on load and in tests, plus a per-operation check
//! that runs before every commit. A failure here means the accounting is
//! wrong: it is logged at `error` and returned as
//! [`PreciseBankError::InvariantViolation`], never repaired.

use tracing::error;

use super::{Plan, PreciseBank};
use crate::bank::{BaseLedger, Movement};
use crate::error::{PreciseBankError, PreciseBankResult};
use crate::types::Amount;

fn violation(msg: String) -> PreciseBankError {
    error!(%msg, "invariant violated");
    PreciseBankError::InvariantViolation(msg)
}

impl<B: BaseLedger> PreciseBank<B> {
    /// Every stored fractional balance lies in `(0, CF)`.
    pub fn balances_invariant(&self) -> PreciseBankResult<()> {
        let cf = self.cf();
        let mut bad = None;
        self.store.fractional().iterate(|address, amount| {
            if amount.is_zero() || amount >= cf {
                bad = Some(format!(
                    "fractional balance {amount} for {address} outside (0, {cf})"
                ));
                return true;
            }
            false
        });
        match bad {
            Some(msg) => Err(violation(msg)),
            None => Ok(()),
        }
    }

    /// The remainder lies in `[0, CF)`.
    pub fn remainder_invariant(&self) -> PreciseBankResult<()> {
        let remainder = self.store.remainder();
        if remainder >= self.cf() {
            return Err(violation(format!(
                "remainder {remainder} not below {}",
                self.cf()
            )));
        }
        Ok(())
    }

    /// `reserve * CF == sum(fractional) + remainder`.
    pub fn reserve_backing_invariant(&self) -> PreciseBankResult<()> {
        let reserve = self
            .base
            .balance(&self.reserve, &self.coin_info.integer_denom)
            .amount;
        let backing = reserve.checked_mul(self.cf());
        let owed = self
            .get_total_fractional_balances()
            .checked_add(self.store.remainder());
        if backing.is_none() || backing != owed {
            return Err(violation(format!(
                "reserve holds {reserve}{} but fractional balances {} plus remainder {} need backing",
                self.coin_info.integer_denom,
                self.get_total_fractional_balances(),
                self.store.remainder(),
            )));
        }
        Ok(())
    }

    /// Runs every full-state check.
    pub fn check_invariants(&self) -> PreciseBankResult<()> {
        self.balances_invariant()?;
        self.remainder_invariant()?;
        self.reserve_backing_invariant()
    }

    /// Checks that `plan` moves the reserve by exactly the fractional and
    /// remainder change it stages:
    ///
    /// `in * CF + old_touched + old_remainder == out * CF + new_touched + new_remainder`
    pub(crate) fn verify_plan(&self, plan: &Plan) -> PreciseBankResult<()> {
        let integer = &self.coin_info.integer_denom;
        let mut units_in = Amount::ZERO;
        let mut units_out = Amount::ZERO;
        for movement in &plan.movements {
            let (from, to, coin) = match movement {
                Movement::Mint { to, coin } => (None, Some(to), coin),
                Movement::Burn { from, coin } => (Some(from), None, coin),
                Movement::Transfer { from, to, coin } => (Some(from), Some(to), coin),
            };
            if coin.denom != *integer {
                continue;
            }
            if from == Some(&self.reserve) {
                units_out = units_out.saturating_add(coin.amount);
            }
            if to == Some(&self.reserve) {
                units_in = units_in.saturating_add(coin.amount);
            }
        }

        let (old_touched, new_touched) = plan.batch.fractional_writes().fold(
            (Amount::ZERO, Amount::ZERO),
            |(old, new), (address, amount)| {
                (
                    old.saturating_add(self.store.fractional().get(address)),
                    new.saturating_add(amount),
                )
            },
        );
        let old_remainder = self.store.remainder();
        let new_remainder = self.store.remainder_with(&plan.batch);

        let cf = self.cf();
        let lhs = units_in
            .checked_mul(cf)
            .and_then(|v| v.checked_add(old_touched))
            .and_then(|v| v.checked_add(old_remainder));
        let rhs = units_out
            .checked_mul(cf)
            .and_then(|v| v.checked_add(new_touched))
            .and_then(|v| v.checked_add(new_remainder));

        if lhs.is_none() || lhs != rhs {
            return Err(violation(format!(
                "plan moves reserve +{units_in}/-{units_out} but fractional {old_touched} -> {new_touched}, remainder {old_remainder} -> {new_remainder}"
            )));
        }
        Ok(())
    }
}
