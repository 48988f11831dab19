//! In-memory base ledger.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{BankError, BaseLedger, Movement};
use crate::types::{Address, Amount, Coin, Coins};

/// A multi-denomination integer bank held in maps.
///
/// Tracks balances, total supply, externally locked (non-spendable) amounts
/// and a blocked-recipient set. The set is only reported through
/// [`BaseLedger::is_blocked`]; movements into blocked accounts are applied
/// like any other.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryBank {
    balances: BTreeMap<Address, BTreeMap<String, Amount>>,
    supply: BTreeMap<String, Amount>,
    locked: BTreeMap<Address, BTreeMap<String, Amount>>,
    blocked: BTreeSet<Address>,
}

impl MemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints `coins` into `address` outside any engine operation. Used to
    /// seed accounts.
    pub fn fund(&mut self, address: &Address, coins: &Coins) -> Result<(), BankError> {
        let movements: Vec<Movement> = coins
            .iter()
            .map(|coin| Movement::Mint {
                to: address.clone(),
                coin: coin.clone(),
            })
            .collect();
        self.apply(&movements)
    }

    /// Marks `coin` of the account's balance as non-spendable.
    pub fn lock(&mut self, address: &Address, coin: Coin) {
        let entry = self
            .locked
            .entry(address.clone())
            .or_default()
            .entry(coin.denom)
            .or_insert(Amount::ZERO);
        *entry = entry.saturating_add(coin.amount);
    }

    /// Reports `address` as blocked from now on.
    pub fn block(&mut self, address: Address) {
        self.blocked.insert(address);
    }

    pub fn unblock(&mut self, address: &Address) {
        self.blocked.remove(address);
    }

    fn raw(&self, address: &Address, denom: &str) -> Amount {
        self.balances
            .get(address)
            .and_then(|coins| coins.get(denom))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    fn set_raw(&mut self, address: &Address, denom: &str, amount: Amount) {
        if amount.is_zero() {
            if let Some(coins) = self.balances.get_mut(address) {
                coins.remove(denom);
                if coins.is_empty() {
                    self.balances.remove(address);
                }
            }
        } else {
            self.balances
                .entry(address.clone())
                .or_default()
                .insert(denom.to_string(), amount);
        }
    }

    fn locked(&self, address: &Address, denom: &str) -> Amount {
        self.locked
            .get(address)
            .and_then(|coins| coins.get(denom))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    fn raw_supply(&self, denom: &str) -> Amount {
        self.supply.get(denom).copied().unwrap_or(Amount::ZERO)
    }
}

/// Entries written by an in-flight batch, layered over the committed bank.
struct Staged<'a> {
    bank: &'a MemoryBank,
    balances: BTreeMap<(Address, String), Amount>,
    supply: BTreeMap<String, Amount>,
}

impl<'a> Staged<'a> {
    fn new(bank: &'a MemoryBank) -> Self {
        Self {
            bank,
            balances: BTreeMap::new(),
            supply: BTreeMap::new(),
        }
    }

    fn balance(&self, address: &Address, denom: &str) -> Amount {
        self.balances
            .get(&(address.clone(), denom.to_string()))
            .copied()
            .unwrap_or_else(|| self.bank.raw(address, denom))
    }

    fn supply(&self, denom: &str) -> Amount {
        self.supply
            .get(denom)
            .copied()
            .unwrap_or_else(|| self.bank.raw_supply(denom))
    }

    fn add(&mut self, address: &Address, coin: &Coin) -> Result<(), BankError> {
        let next = self
            .balance(address, &coin.denom)
            .checked_add(coin.amount)
            .ok_or_else(|| BankError::Overflow(format!("balance of {address} in {}", coin.denom)))?;
        self.balances.insert((address.clone(), coin.denom.clone()), next);
        Ok(())
    }

    fn sub(&mut self, address: &Address, coin: &Coin) -> Result<(), BankError> {
        let balance = self.balance(address, &coin.denom);
        let spendable = balance
            .checked_sub(self.bank.locked(address, &coin.denom))
            .unwrap_or(Amount::ZERO);
        if spendable < coin.amount {
            return Err(BankError::InsufficientFunds {
                address: address.clone(),
                available: Coin::new(coin.denom.clone(), spendable),
                required: coin.clone(),
            });
        }
        let next = balance.checked_sub(coin.amount).unwrap_or(Amount::ZERO);
        self.balances.insert((address.clone(), coin.denom.clone()), next);
        Ok(())
    }

    fn apply_one(&mut self, movement: &Movement) -> Result<(), BankError> {
        match movement {
            Movement::Mint { to, coin } => {
                let next = self
                    .supply(&coin.denom)
                    .checked_add(coin.amount)
                    .ok_or_else(|| BankError::Overflow(format!("supply of {}", coin.denom)))?;
                self.supply.insert(coin.denom.clone(), next);
                self.add(to, coin)
            }
            Movement::Burn { from, coin } => {
                self.sub(from, coin)?;
                let next = self
                    .supply(&coin.denom)
                    .checked_sub(coin.amount)
                    .unwrap_or(Amount::ZERO);
                self.supply.insert(coin.denom.clone(), next);
                Ok(())
            }
            Movement::Transfer { from, to, coin } => {
                self.sub(from, coin)?;
                self.add(to, coin)
            }
        }
    }
}

impl BaseLedger for MemoryBank {
    fn balance(&self, address: &Address, denom: &str) -> Coin {
        Coin::new(denom, self.raw(address, denom))
    }

    fn all_balances(&self, address: &Address) -> Coins {
        let coins = self
            .balances
            .get(address)
            .map(|coins| {
                coins
                    .iter()
                    .map(|(denom, amount)| Coin::new(denom.clone(), *amount))
                    .collect()
            })
            .unwrap_or_default();
        // Entries are sorted, non-zero and unique by construction.
        Coins::new(coins).unwrap_or_default()
    }

    fn spendable_balance(&self, address: &Address, denom: &str) -> Coin {
        let spendable = self
            .raw(address, denom)
            .checked_sub(self.locked(address, denom))
            .unwrap_or(Amount::ZERO);
        Coin::new(denom, spendable)
    }

    fn supply(&self, denom: &str) -> Coin {
        Coin::new(denom, self.raw_supply(denom))
    }

    fn iterate_total_supply(&self, callback: &mut dyn FnMut(&Coin) -> bool) {
        for (denom, amount) in &self.supply {
            if callback(&Coin::new(denom.clone(), *amount)) {
                break;
            }
        }
    }

    fn is_blocked(&self, address: &Address) -> bool {
        self.blocked.contains(address)
    }

    fn apply(&mut self, movements: &[Movement]) -> Result<(), BankError> {
        let (balances, supply) = {
            let mut staged = Staged::new(self);
            for movement in movements {
                staged.apply_one(movement)?;
            }
            (staged.balances, staged.supply)
        };

        let touched = balances.len();
        for ((address, denom), amount) in balances {
            self.set_raw(&address, &denom, amount);
        }
        for (denom, amount) in supply {
            if amount.is_zero() {
                self.supply.remove(&denom);
            } else {
                self.supply.insert(denom, amount);
            }
        }
        trace!(count = movements.len(), touched, "base ledger movements applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::new(vec![b; 20])
    }

    fn uatom(v: u64) -> Coin {
        Coin::new("uatom", v)
    }

    #[test]
    fn mint_and_transfer() {
        let mut bank = MemoryBank::new();
        bank.apply(&[
            Movement::Mint { to: addr(1), coin: uatom(100) },
            Movement::Transfer { from: addr(1), to: addr(2), coin: uatom(40) },
        ])
        .unwrap();
        assert_eq!(bank.balance(&addr(1), "uatom"), uatom(60));
        assert_eq!(bank.balance(&addr(2), "uatom"), uatom(40));
        assert_eq!(bank.supply("uatom"), uatom(100));
    }

    #[test]
    fn failed_batch_leaves_no_trace() {
        let mut bank = MemoryBank::new();
        bank.fund(&addr(1), &uatom(10).into()).unwrap();
        let before = bank.clone();

        let err = bank
            .apply(&[
                Movement::Transfer { from: addr(1), to: addr(2), coin: uatom(5) },
                Movement::Burn { from: addr(1), coin: uatom(6) },
            ])
            .unwrap_err();
        assert!(matches!(err, BankError::InsufficientFunds { .. }));
        assert_eq!(bank, before);
    }

    #[test]
    fn locked_funds_are_not_spendable() {
        let mut bank = MemoryBank::new();
        bank.fund(&addr(1), &uatom(10).into()).unwrap();
        bank.lock(&addr(1), uatom(7));
        assert_eq!(bank.spendable_balance(&addr(1), "uatom"), uatom(3));
        assert_eq!(bank.balance(&addr(1), "uatom"), uatom(10));
        assert!(bank
            .apply(&[Movement::Burn { from: addr(1), coin: uatom(4) }])
            .is_err());
    }

    #[test]
    fn blocked_list_is_reported_not_enforced() {
        let mut bank = MemoryBank::new();
        bank.fund(&addr(1), &uatom(10).into()).unwrap();
        bank.block(addr(2));
        assert!(bank.is_blocked(&addr(2)));

        bank.apply(&[Movement::Transfer { from: addr(1), to: addr(2), coin: uatom(1) }])
            .unwrap();
        assert_eq!(bank.balance(&addr(2), "uatom"), uatom(1));

        bank.unblock(&addr(2));
        assert!(!bank.is_blocked(&addr(2)));
    }

    #[test]
    fn batch_reads_its_own_writes() {
        let mut bank = MemoryBank::new();
        bank.apply(&[
            Movement::Mint { to: addr(1), coin: uatom(10) },
            Movement::Transfer { from: addr(1), to: addr(2), coin: uatom(10) },
            Movement::Burn { from: addr(2), coin: uatom(4) },
            Movement::Transfer { from: addr(2), to: addr(1), coin: uatom(6) },
        ])
        .unwrap();
        assert_eq!(bank.balance(&addr(1), "uatom"), uatom(6));
        assert!(bank.all_balances(&addr(2)).is_empty());
        assert_eq!(bank.supply("uatom"), uatom(6));
    }

    #[test]
    fn staged_spend_respects_locks() {
        let mut bank = MemoryBank::new();
        bank.fund(&addr(1), &uatom(10).into()).unwrap();
        bank.lock(&addr(1), uatom(8));
        let before = bank.clone();

        // The mint raises the staged balance; only the unlocked part is spendable.
        bank.apply(&[
            Movement::Mint { to: addr(1), coin: uatom(5) },
            Movement::Burn { from: addr(1), coin: uatom(7) },
        ])
        .unwrap();
        assert_eq!(bank.balance(&addr(1), "uatom"), uatom(8));

        let mut other = before.clone();
        let err = other
            .apply(&[
                Movement::Mint { to: addr(1), coin: uatom(5) },
                Movement::Burn { from: addr(1), coin: uatom(8) },
            ])
            .unwrap_err();
        assert_eq!(
            err,
            BankError::InsufficientFunds {
                address: addr(1),
                available: uatom(7),
                required: uatom(8),
            }
        );
        assert_eq!(other, before);
    }

    #[test]
    fn burn_reduces_supply_and_drops_zero_entries() {
        let mut bank = MemoryBank::new();
        bank.fund(&addr(1), &uatom(5).into()).unwrap();
        bank.apply(&[Movement::Burn { from: addr(1), coin: uatom(5) }]).unwrap();
        assert!(bank.all_balances(&addr(1)).is_empty());
        let mut seen = Vec::new();
        bank.iterate_total_supply(&mut |c| {
            seen.push(c.clone());
            false
        });
        assert!(seen.is_empty());
    }

    #[test]
    fn snapshot_roundtrip() {
        let mut bank = MemoryBank::new();
        bank.fund(&addr(3), &"5uatom,9stake".parse().unwrap()).unwrap();
        bank.block(addr(4));
        let bytes = bincode::serialize(&bank).unwrap();
        let back: MemoryBank = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, bank);
    }
}
