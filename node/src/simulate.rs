//! Seeded random Mint/Burn/Send runs against an in-memory ledger.

use std::fmt;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use precisebank::{
    Address, Amount, BaseLedger, Coin, CoinInfo, Coins, MemoryBank, PreciseBank, PreciseBankError,
};

use crate::cli::SimulateArgs;

/// Outcome of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub seed: u64,
    pub steps: usize,
    pub conversion_factor: Amount,
    pub mints: usize,
    pub burns: usize,
    pub sends: usize,
    /// Operations refused for lack of funds. They must leave no trace.
    pub rejected: usize,
    pub remainder: Amount,
    pub total_fractional: Amount,
    pub reserve_units: Amount,
    pub invariants_ok: bool,
    /// First invariant failure, with the step it happened at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation: Option<String>,
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "seed              : {}", self.seed)?;
        writeln!(f, "steps             : {}", self.steps)?;
        writeln!(f, "conversion factor : {}", self.conversion_factor)?;
        writeln!(f, "mints             : {}", self.mints)?;
        writeln!(f, "burns             : {}", self.burns)?;
        writeln!(f, "sends             : {}", self.sends)?;
        writeln!(f, "rejected          : {}", self.rejected)?;
        writeln!(f, "remainder         : {}", self.remainder)?;
        writeln!(f, "total fractional  : {}", self.total_fractional)?;
        writeln!(f, "reserve units     : {}", self.reserve_units)?;
        match &self.violation {
            None => write!(f, "invariants        : ok"),
            Some(v) => write!(f, "invariants        : BROKEN ({v})"),
        }
    }
}

/// Runs `args.steps` random operations and reports what happened.
///
/// Amounts are drawn from `[1, 2 * CF)` so that every carry and borrow
/// path is hit. Burns and sends may exceed the holder's balance; those
/// must fail with `InsufficientFunds` and change nothing.
pub fn run(args: &SimulateArgs) -> Result<SimulationReport> {
    let info = CoinInfo::from_decimals("uatom", "aatom", args.decimals)
        .context("invalid simulation decimals")?;
    let cf = info
        .cf()
        .to_u128()
        .context("conversion factor exceeds 128 bits")?;
    let mut bank = PreciseBank::new(info, MemoryBank::new())?;
    let accounts: Vec<Address> = (1..=args.accounts)
        .map(|n| Address::new(vec![n; 20]))
        .collect();
    let mut rng = StdRng::seed_from_u64(args.seed);

    let mut report = SimulationReport {
        seed: args.seed,
        steps: args.steps,
        conversion_factor: Amount::from(cf),
        mints: 0,
        burns: 0,
        sends: 0,
        rejected: 0,
        remainder: Amount::ZERO,
        total_fractional: Amount::ZERO,
        reserve_units: Amount::ZERO,
        invariants_ok: true,
        violation: None,
    };

    for step in 0..args.steps {
        let who = &accounts[rng.gen_range(0..accounts.len())];
        let coins: Coins = Coin::new("aatom", rng.gen_range(1..2 * cf)).into();

        let (result, counter) = match rng.gen_range(0..3) {
            0 => (bank.mint(who, &coins), &mut report.mints),
            1 => (bank.burn(who, &coins), &mut report.burns),
            _ => {
                let to = &accounts[rng.gen_range(0..accounts.len())];
                (bank.send_coins(who, to, &coins), &mut report.sends)
            }
        };
        match result {
            Ok(()) => *counter += 1,
            Err(PreciseBankError::InsufficientFunds { .. }) => report.rejected += 1,
            Err(err) => return Err(err).with_context(|| format!("step {step} failed")),
        }

        if let Err(err) = bank.check_invariants() {
            tracing::error!(step, error = %err, "invariant broken during simulation");
            report.invariants_ok = false;
            report.violation = Some(format!("step {step}: {err}"));
            break;
        }
    }

    report.remainder = bank.get_remainder_amount();
    report.total_fractional = bank.get_total_fractional_balances();
    report.reserve_units = bank
        .base()
        .balance(bank.reserve_address(), &bank.coin_info().integer_denom)
        .amount;
    tracing::info!(
        seed = report.seed,
        mints = report.mints,
        burns = report.burns,
        sends = report.sends,
        rejected = report.rejected,
        invariants_ok = report.invariants_ok,
        "simulation finished"
    );
    Ok(report)
}
