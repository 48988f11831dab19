//! Minting.
//!
//! `(q, r) = split(amount)`. The account receives `q` whole units directly.
//! For `r > 0` the remainder pays for the new fractional units if it can,
//! otherwise the reserve mints one unit to cover them. The account's
//! fractional balance then grows by `r`, carrying one unit out of the reserve
//! if it reaches `CF`. A reserve mint and a carry in the same operation net
//! out to one more unit minted straight to the account.

use tracing::debug;

use super::{Plan, PreciseBank};
use crate::bank::{BaseLedger, Movement};
use crate::config::MODULE_NAME;
use crate::conversion::{credit_fractional, remainder_after_mint, split, ReserveDelta, UnitDelta};
use crate::error::{PreciseBankError, PreciseBankResult};
use crate::types::{Address, Amount, Coin, Coins};

impl<B: BaseLedger> PreciseBank<B> {
    /// Mints `coins` into `to`. The extended denomination goes through the
    /// fractional bookkeeping; every other denomination except the integer
    /// one passes straight to the base ledger.
    pub fn mint(&mut self, to: &Address, coins: &Coins) -> PreciseBankResult<()> {
        let plan = self.plan_mint(to, coins)?;
        self.commit("mint", plan)?;
        debug!(to = %to, coins = %coins, "minted");
        Ok(())
    }

    /// Mints into the account of module `module`.
    pub fn mint_coins(&mut self, module: &str, coins: &Coins) -> PreciseBankResult<()> {
        if module == MODULE_NAME {
            return Err(PreciseBankError::ReserveAccount(self.reserve.clone()));
        }
        self.mint(&Address::module(module), coins)
    }

    pub(crate) fn plan_mint(&self, to: &Address, coins: &Coins) -> PreciseBankResult<Plan> {
        self.ensure_not_reserve(to)?;
        let info = &self.coin_info;
        if coins.amount_of(&info.integer_denom).is_positive() {
            return Err(PreciseBankError::InvalidDenom(format!(
                "cannot mint {} directly; mint {} instead",
                info.integer_denom, info.extended_denom
            )));
        }

        let (amount, others) = coins.take_denom(&info.extended_denom);
        let mut plan = Plan::default();
        for coin in others.iter() {
            plan.push(Movement::Mint {
                to: to.clone(),
                coin: coin.clone(),
            });
        }
        if amount.is_zero() {
            return Ok(plan);
        }

        let cf = self.cf();
        let (q, r) = split(amount, cf);
        self.ensure_mint_fits(q)?;

        if r.is_zero() {
            plan.push(Movement::Mint {
                to: to.clone(),
                coin: self.integer_coin(q),
            });
            return Ok(plan);
        }

        let overflow = || PreciseBankError::Overflow(format!("minting {amount}"));
        let (remainder, reserve) =
            remainder_after_mint(self.store.remainder(), r, cf).ok_or_else(overflow)?;
        let step = credit_fractional(self.store.fractional().get(to), r, cf).ok_or_else(overflow)?;
        let q_plus_one = q.checked_add(Amount::ONE).ok_or_else(overflow)?;

        match (reserve, step.units) {
            (ReserveDelta::Mint, UnitDelta::Carry) => {
                plan.push(Movement::Mint {
                    to: to.clone(),
                    coin: self.integer_coin(q_plus_one),
                });
            }
            (ReserveDelta::Mint, _) => {
                plan.push(Movement::Mint {
                    to: to.clone(),
                    coin: self.integer_coin(q),
                });
                plan.push(Movement::Mint {
                    to: self.reserve.clone(),
                    coin: self.integer_coin(Amount::ONE),
                });
            }
            (_, UnitDelta::Carry) => {
                // The carried unit is re-minted to the recipient and retired
                // from the reserve, so no transfer into `to` is planned.
                plan.push(Movement::Mint {
                    to: to.clone(),
                    coin: self.integer_coin(q_plus_one),
                });
                plan.push(Movement::Burn {
                    from: self.reserve.clone(),
                    coin: self.integer_coin(Amount::ONE),
                });
            }
            _ => {
                plan.push(Movement::Mint {
                    to: to.clone(),
                    coin: self.integer_coin(q),
                });
            }
        }

        plan.batch.set_fractional(to.clone(), step.fractional);
        plan.batch.set_remainder(remainder);
        Ok(plan)
    }

    /// The integer supply after minting `q + 1` units must still be
    /// expressible in the extended denomination.
    fn ensure_mint_fits(&self, q: Amount) -> PreciseBankResult<()> {
        let supply = self.base.supply(&self.coin_info.integer_denom).amount;
        supply
            .checked_add(q)
            .and_then(|s| s.checked_add(Amount::ONE))
            .and_then(|s| s.checked_mul(self.cf()))
            .map(|_| ())
            .ok_or_else(|| {
                PreciseBankError::Overflow(format!(
                    "minting {q}{} on top of supply {supply}",
                    self.coin_info.integer_denom
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::test_support::*;
    use crate::error::PreciseBankError;
    use crate::types::{Address, Amount, Coin, Coins};

    #[test]
    fn mint_one_unit_below_cf() {
        let mut engine = engine();
        engine.mint(&addr(1), &ext(CF - 1)).unwrap();

        assert_eq!(engine.get_fractional_balance(&addr(1)), Amount::from(CF - 1));
        assert_eq!(engine.get_remainder_amount(), Amount::from(1u64));
        let reserve = engine.reserve_address().clone();
        assert_eq!(
            engine.get_balance(&reserve, "uatom").unwrap(),
            Coin::new("uatom", 1u64)
        );
        engine.check_invariants().unwrap();
    }

    #[test]
    fn mint_exactly_cf_leaves_no_fractional_entry() {
        let mut engine = engine();
        engine.mint(&addr(1), &ext(CF)).unwrap();

        assert!(engine.store().fractional().is_empty());
        assert_eq!(engine.get_remainder_amount(), Amount::ZERO);
        assert_eq!(
            engine.get_balance(&addr(1), "uatom").unwrap(),
            Coin::new("uatom", 1u64)
        );
        engine.check_invariants().unwrap();
    }

    #[test]
    fn mint_with_carry_nets_reserve_legs() {
        let mut engine = engine();
        engine.mint(&addr(1), &ext(CF / 2)).unwrap();
        let reserve = engine.reserve_address().clone();
        let reserve_before = engine.get_balance(&reserve, "uatom").unwrap();

        engine.mint(&addr(1), &ext(CF / 2 + 1)).unwrap();

        // remainder was CF/2, paid CF/2 + 1 -> reserve mint; account carries.
        assert_eq!(engine.get_balance(&reserve, "uatom").unwrap(), reserve_before);
        assert_eq!(engine.get_fractional_balance(&addr(1)), Amount::from(1u64));
        assert_eq!(balance(&engine, &addr(1)), Amount::from(CF + 1));
        engine.check_invariants().unwrap();
    }

    #[test]
    fn mint_carry_from_reserve() {
        let mut engine = engine();
        engine.mint(&addr(1), &ext(CF - 10)).unwrap();
        engine.mint(&addr(2), &ext(10)).unwrap();
        assert_eq!(engine.get_remainder_amount(), Amount::ZERO);

        let reserve = engine.reserve_address().clone();
        engine.mint(&addr(3), &ext(CF - 1)).unwrap();
        engine.mint(&addr(3), &ext(1)).unwrap();

        assert_eq!(engine.get_fractional_balance(&addr(3)), Amount::ZERO);
        assert_eq!(
            engine.get_balance(&addr(3), "uatom").unwrap(),
            Coin::new("uatom", 1u64)
        );
        assert_eq!(
            engine.get_balance(&reserve, "uatom").unwrap(),
            Coin::new("uatom", 1u64)
        );
        engine.check_invariants().unwrap();
    }

    #[test]
    fn mint_integer_denom_rejected() {
        let mut engine = engine();
        let coins: Coins = Coin::new("uatom", 5u64).into();
        assert!(matches!(
            engine.mint(&addr(1), &coins),
            Err(PreciseBankError::InvalidDenom(_))
        ));
    }

    #[test]
    fn mint_other_denoms_pass_through() {
        let mut engine = engine();
        let coins: Coins = "7stake,25aatom".parse().unwrap();
        engine.mint(&addr(1), &coins).unwrap();
        assert_eq!(
            engine.get_balance(&addr(1), "stake").unwrap(),
            Coin::new("stake", 7u64)
        );
        assert_eq!(balance(&engine, &addr(1)), Amount::from(25u64));
    }

    #[test]
    fn mint_to_reserve_rejected() {
        let mut engine = engine();
        let reserve = engine.reserve_address().clone();
        assert!(matches!(
            engine.mint(&reserve, &ext(5)),
            Err(PreciseBankError::ReserveAccount(_))
        ));
        assert!(matches!(
            engine.mint_coins("precisebank", &ext(5)),
            Err(PreciseBankError::ReserveAccount(_))
        ));
    }

    #[test]
    fn mint_coins_targets_module_account() {
        let mut engine = engine();
        engine.mint_coins("evm", &ext(CF + 3)).unwrap();
        assert_eq!(
            balance(&engine, &Address::module("evm")),
            Amount::from(CF + 3)
        );
    }

    #[test]
    fn mint_into_blocked_module_on_every_path() {
        let mut engine = engine();
        let evm = Address::module("evm");
        engine.base_mut().block(evm.clone());
        let reserve = engine.reserve_address().clone();

        // (amount, reserve units after, remainder after)
        let steps: [(u64, u64, u64); 5] = [
            (1, 1, CF - 1),       // reserve mint
            (CF - 2, 1, 1),       // remainder pays, no carry
            (1, 0, 0),            // carry only
            (10, 1, CF - 10),     // reserve mint
            (CF - 5, 1, CF - 5),  // reserve mint and carry
        ];
        for (amount, reserve_units, remainder) in steps {
            engine.mint_coins("evm", &ext(amount)).unwrap();
            assert_eq!(
                engine.get_balance(&reserve, "uatom").unwrap(),
                Coin::new("uatom", reserve_units)
            );
            assert_eq!(engine.get_remainder_amount(), Amount::from(remainder));
            engine.check_invariants().unwrap();
        }

        assert_eq!(balance(&engine, &evm), Amount::from(2 * CF + 5));
        assert_eq!(engine.get_fractional_balance(&evm), Amount::from(5u64));
        assert!(engine.blocked_addr(&evm));
    }

    #[test]
    fn mint_overflow_is_checked() {
        let mut engine = engine();
        assert!(matches!(
            engine.mint(&addr(1), &Coin::new("aatom", Amount::MAX).into()),
            Err(PreciseBankError::Overflow(_))
        ));
        engine.check_invariants().unwrap();
        assert_eq!(engine.get_remainder_amount(), Amount::ZERO);
    }
}
