//! # Conversion Arithmetic
//!
//! Pure functions that move value between the integer and extended
//! denominations. No state and no I/O: the engine composes these into plans,
//! and they are tested on their own.
//!
//! All fractional inputs are assumed to be normalized (`< CF`). Under that
//! precondition every function here is total; the `Option` returns only
//! guard the 256-bit range.

use crate::error::{PreciseBankError, PreciseBankResult};
use crate::types::{Amount, Coin, CoinInfo, Coins};

/// Splits an extended amount into `(amount / cf, amount % cf)`.
///
/// `cf` must be non-zero; [`CoinInfo::validate`] guarantees it.
pub fn split(amount: Amount, cf: Amount) -> (Amount, Amount) {
    let integer = amount.checked_div(cf).unwrap_or(Amount::ZERO);
    let fractional = amount.checked_rem(cf).unwrap_or(amount);
    (integer, fractional)
}

/// `integer * cf + fractional`, or `None` past 256 bits.
pub fn compose(integer: Amount, fractional: Amount, cf: Amount) -> Option<Amount> {
    integer.checked_mul(cf)?.checked_add(fractional)
}

/// Whole-unit side effect of a fractional credit or debit on one account.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitDelta {
    /// The fractional balance absorbed the change.
    None,
    /// The fractional balance reached `CF`: one whole unit is owed to the
    /// account.
    Carry,
    /// The fractional balance was short: one whole unit is taken from the
    /// account.
    Borrow,
}

/// New fractional balance plus its whole-unit side effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FractionalStep {
    pub fractional: Amount,
    pub units: UnitDelta,
}

/// Adds `r` to a fractional balance, carrying once if the result reaches `cf`.
pub fn credit_fractional(current: Amount, r: Amount, cf: Amount) -> Option<FractionalStep> {
    let sum = current.checked_add(r)?;
    if sum >= cf {
        Some(FractionalStep {
            fractional: sum.checked_sub(cf)?,
            units: UnitDelta::Carry,
        })
    } else {
        Some(FractionalStep {
            fractional: sum,
            units: UnitDelta::None,
        })
    }
}

/// Subtracts `r` from a fractional balance, borrowing one whole unit first if
/// the balance is short.
pub fn debit_fractional(current: Amount, r: Amount, cf: Amount) -> Option<FractionalStep> {
    if current >= r {
        return Some(FractionalStep {
            fractional: current.checked_sub(r)?,
            units: UnitDelta::None,
        });
    }
    Some(FractionalStep {
        fractional: current.checked_add(cf)?.checked_sub(r)?,
        units: UnitDelta::Borrow,
    })
}

/// Whole-unit change to the reserve's integer holding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReserveDelta {
    Unchanged,
    /// Mint one unit into the reserve.
    Mint,
    /// Burn one unit from the reserve.
    Burn,
}

/// Remainder after `r` fresh fractional units are handed out by a mint.
///
/// The remainder pays for the new units when it can; otherwise the reserve
/// mints one whole unit and the remainder keeps the change.
pub fn remainder_after_mint(
    remainder: Amount,
    r: Amount,
    cf: Amount,
) -> Option<(Amount, ReserveDelta)> {
    if remainder >= r {
        Some((remainder.checked_sub(r)?, ReserveDelta::Unchanged))
    } else {
        let next = remainder.checked_add(cf)?.checked_sub(r)?;
        Some((next, ReserveDelta::Mint))
    }
}

/// Remainder after `r` fractional units are destroyed by a burn.
///
/// Once the remainder accumulates a whole unit, that unit is burned from the
/// reserve.
pub fn remainder_after_burn(
    remainder: Amount,
    r: Amount,
    cf: Amount,
) -> Option<(Amount, ReserveDelta)> {
    let sum = remainder.checked_add(r)?;
    if sum >= cf {
        Some((sum.checked_sub(cf)?, ReserveDelta::Burn))
    } else {
        Some((sum, ReserveDelta::Unchanged))
    }
}

/// Folds the integer and extended amounts of `coins` into a single coin of
/// the extended denomination. Other denominations are ignored.
pub fn sum_extended_coin(coins: &Coins, info: &CoinInfo) -> PreciseBankResult<Coin> {
    let integer = coins.amount_of(&info.integer_denom);
    let extended = coins.amount_of(&info.extended_denom);
    let total = compose(integer, extended, info.cf()).ok_or_else(|| {
        PreciseBankError::Overflow(format!("sum of {coins} in {}", info.extended_denom))
    })?;
    Ok(Coin::new(info.extended_denom.clone(), total))
}
