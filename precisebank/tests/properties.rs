//! Property and randomized-sequence tests.
//!
//! `proptest` covers the pure arithmetic and short random operation
//! sequences; a seeded `rand` run drives long Mint/Burn/Send sequences
//! against a naive balance model for several conversion factors.

use std::collections::BTreeMap;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use precisebank::conversion::{compose, credit_fractional, debit_fractional, split, UnitDelta};
use precisebank::{Address, Amount, Coin, CoinInfo, MemoryBank, PreciseBank};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn account(n: u8) -> Address {
    Address::new(vec![n; 20])
}

fn engine_with_cf(decimals: u32) -> PreciseBank<MemoryBank> {
    let info = CoinInfo::from_decimals("ucoin", "acoin", decimals).unwrap();
    PreciseBank::new(info, MemoryBank::new()).unwrap()
}

fn acoin(v: u128) -> precisebank::Coins {
    Coin::new("acoin", v).into()
}

fn extended(bank: &PreciseBank<MemoryBank>, who: &Address) -> u128 {
    bank.get_balance(who, "acoin")
        .unwrap()
        .amount
        .to_u128()
        .unwrap()
}

#[derive(Clone, Debug)]
enum Op {
    Mint { to: u8, amount: u64 },
    Burn { from: u8, amount: u64 },
    Send { from: u8, to: u8, amount: u64 },
}

fn op_strategy(cf: u64) -> impl Strategy<Value = Op> {
    let amount = 0..2 * cf;
    prop_oneof![
        (0u8..4, amount.clone()).prop_map(|(to, amount)| Op::Mint { to, amount }),
        (0u8..4, amount.clone()).prop_map(|(from, amount)| Op::Burn { from, amount }),
        (0u8..4, 0u8..4, amount).prop_map(|(from, to, amount)| Op::Send { from, to, amount }),
    ]
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn split_compose_round_trip(amount in any::<u128>(), exp in 0u32..=17) {
        let cf = Amount::pow10(exp).unwrap();
        let amount = Amount::from(amount);
        let (q, r) = split(amount, cf);
        prop_assert!(r < cf);
        prop_assert_eq!(compose(q, r, cf), Some(amount));
    }

    #[test]
    fn credit_then_debit_restores(exp in 1u32..=17, a in any::<u64>(), b in any::<u64>()) {
        let cf_u = 10u64.pow(exp);
        let cf = Amount::from(cf_u);
        let current = Amount::from(a % cf_u);
        let r = Amount::from(b % cf_u);

        let credit = credit_fractional(current, r, cf).unwrap();
        prop_assert!(credit.fractional < cf);
        let debit = debit_fractional(credit.fractional, r, cf).unwrap();
        prop_assert_eq!(debit.fractional, current);

        let expected = if credit.units == UnitDelta::Carry {
            UnitDelta::Borrow
        } else {
            UnitDelta::None
        };
        prop_assert_eq!(debit.units, expected);
    }

    #[test]
    fn random_sequences_keep_invariants(ops in proptest::collection::vec(op_strategy(1000), 1..60)) {
        // CF = 10^3
        let mut bank = engine_with_cf(15);
        for op in ops {
            let before = bank.export_genesis();
            let result = match op {
                Op::Mint { to, amount } => bank.mint(&account(to), &acoin(u128::from(amount))),
                Op::Burn { from, amount } => bank.burn(&account(from), &acoin(u128::from(amount))),
                Op::Send { from, to, amount } => {
                    bank.send_coins(&account(from), &account(to), &acoin(u128::from(amount)))
                }
            };
            if result.is_err() {
                prop_assert_eq!(bank.export_genesis(), before);
            }
            prop_assert!(bank.check_invariants().is_ok());
        }
    }
}

// ---------------------------------------------------------------------------
// Seeded fuzz
// ---------------------------------------------------------------------------

fn fuzz_run(decimals: u32, seed: u64) {
    const ITERATIONS: usize = 1000;
    let mut bank = engine_with_cf(decimals);
    let cf = bank.coin_info().cf().to_u128().unwrap();
    let accounts: Vec<Address> = (1..=5).map(account).collect();
    let mut model: BTreeMap<Address, u128> = BTreeMap::new();
    let mut rng = StdRng::seed_from_u64(seed);

    let mut minted: u128 = 0;
    let mut burned: u128 = 0;

    for i in 0..ITERATIONS {
        let who = accounts[rng.gen_range(0..accounts.len())].clone();
        let held = model.get(&who).copied().unwrap_or(0);

        match rng.gen_range(0..3) {
            1 if held > 0 => {
                let amount = rng.gen_range(1..=held.min(2 * cf - 1));
                bank.burn(&who, &acoin(amount)).unwrap();
                *model.entry(who.clone()).or_default() -= amount;
                burned += amount;
            }
            2 if held > 0 => {
                let to = accounts[rng.gen_range(0..accounts.len())].clone();
                let amount = rng.gen_range(1..=held.min(2 * cf - 1));
                bank.send_coins(&who, &to, &acoin(amount)).unwrap();
                *model.entry(who.clone()).or_default() -= amount;
                *model.entry(to).or_default() += amount;
            }
            _ => {
                let amount = rng.gen_range(1..2 * cf);
                bank.mint(&who, &acoin(amount)).unwrap();
                *model.entry(who.clone()).or_default() += amount;
                minted += amount;
            }
        }

        for account in &accounts {
            let expected = model.get(account).copied().unwrap_or(0);
            assert_eq!(
                extended(&bank, account),
                expected,
                "iteration {i}: balance of {account} diverged (cf {cf})"
            );
        }
        bank.check_invariants()
            .unwrap_or_else(|e| panic!("iteration {i}: {e}"));
    }

    let expected_remainder = (cf - (minted - burned) % cf) % cf;
    assert_eq!(
        bank.get_remainder_amount(),
        Amount::from(expected_remainder),
        "remainder should equal (burned - minted) mod cf"
    );
}

#[test]
fn fuzz_default_factor() {
    fuzz_run(6, 0x5eed_0001);
}

#[test]
fn fuzz_large_factor() {
    // CF = 10^16
    fuzz_run(2, 0x5eed_0002);
}

#[test]
fn fuzz_small_factor() {
    // CF = 10^6
    fuzz_run(12, 0x5eed_0003);
}
