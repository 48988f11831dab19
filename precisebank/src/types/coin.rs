//! # Coins
//!
//! A [`Coin`] is an amount tagged with a denomination. [`Coins`] is the
//! canonical multi-denomination set the mutating operations accept: sorted by
//! denomination, one entry per denomination, no zero entries. Keeping the set
//! canonical means two `Coins` with equal value always compare equal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Amount;
use crate::config::{MAX_DENOM_LENGTH, MIN_DENOM_LENGTH};
use crate::error::{PreciseBankError, PreciseBankResult};

/// Checks a denomination against `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
pub fn validate_denom(denom: &str) -> PreciseBankResult<()> {
    let len = denom.len();
    if !(MIN_DENOM_LENGTH..=MAX_DENOM_LENGTH).contains(&len) {
        return Err(PreciseBankError::InvalidDenom(format!(
            "'{denom}' must be {MIN_DENOM_LENGTH} to {MAX_DENOM_LENGTH} characters"
        )));
    }

    let mut chars = denom.chars();
    let first_is_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || "/:._-".contains(c));
    if !first_is_letter || !rest_ok {
        return Err(PreciseBankError::InvalidDenom(format!(
            "'{denom}' contains invalid characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Coin
// ---------------------------------------------------------------------------

/// An amount of a single denomination.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: Amount,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: impl Into<Amount>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }

    /// A zero coin of the given denomination.
    pub fn zero(denom: impl Into<String>) -> Self {
        Self::new(denom, Amount::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Validates the denomination syntax.
    pub fn validate(&self) -> PreciseBankResult<()> {
        validate_denom(&self.denom)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Coin {
    type Err = PreciseBankError;

    /// Parses `"<amount><denom>"`, e.g. `"1000aatom"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '_' || c == '-'))
            .ok_or_else(|| PreciseBankError::InvalidDenom(format!("missing denom in '{s}'")))?;
        let (amount, denom) = s.split_at(split);
        let amount: Amount = amount.parse()?;
        validate_denom(denom)?;
        Ok(Coin::new(denom, amount))
    }
}

// ---------------------------------------------------------------------------
// Coins
// ---------------------------------------------------------------------------

/// A sorted, duplicate-free, zero-free set of coins.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Coin>", into = "Vec<Coin>")]
pub struct Coins(Vec<Coin>);

impl Coins {
    /// An empty set.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Builds a canonical set. Zero coins are dropped; a repeated
    /// denomination or a malformed one is rejected.
    pub fn new(coins: Vec<Coin>) -> PreciseBankResult<Self> {
        let mut coins: Vec<Coin> = coins.into_iter().filter(|c| !c.is_zero()).collect();
        for coin in &coins {
            coin.validate()?;
        }
        coins.sort_by(|a, b| a.denom.cmp(&b.denom));
        if let Some(pair) = coins.windows(2).find(|w| w[0].denom == w[1].denom) {
            return Err(PreciseBankError::InvalidDenom(format!(
                "duplicate denom {}",
                pair[0].denom
            )));
        }
        Ok(Self(coins))
    }

    /// Amount held in `denom`, zero if absent.
    pub fn amount_of(&self, denom: &str) -> Amount {
        self.0
            .binary_search_by(|c| c.denom.as_str().cmp(denom))
            .map(|i| self.0[i].amount)
            .unwrap_or(Amount::ZERO)
    }

    /// Splits `denom` out of the set: its amount and every other coin.
    pub fn take_denom(&self, denom: &str) -> (Amount, Coins) {
        let amount = self.amount_of(denom);
        let rest = self.0.iter().filter(|c| c.denom != denom).cloned().collect();
        (amount, Coins(rest))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Coin> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_vec(self) -> Vec<Coin> {
        self.0
    }
}

impl From<Coin> for Coins {
    fn from(coin: Coin) -> Self {
        if coin.is_zero() {
            Coins::empty()
        } else {
            Coins(vec![coin])
        }
    }
}

impl TryFrom<Vec<Coin>> for Coins {
    type Error = PreciseBankError;

    fn try_from(coins: Vec<Coin>) -> Result<Self, Self::Error> {
        Coins::new(coins)
    }
}

impl From<Coins> for Vec<Coin> {
    fn from(coins: Coins) -> Self {
        coins.0
    }
}

impl<'a> IntoIterator for &'a Coins {
    type Item = &'a Coin;
    type IntoIter = std::slice::Iter<'a, Coin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, coin) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{coin}")?;
        }
        Ok(())
    }
}

impl FromStr for Coins {
    type Err = PreciseBankError;

    /// Parses a comma-separated list such as `"5uatom,1000aatom"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Coins::empty());
        }
        let coins = s
            .split(',')
            .map(str::parse)
            .collect::<PreciseBankResult<Vec<Coin>>>()?;
        Coins::new(coins)
    }
}
