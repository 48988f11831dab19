//! Query responses for transport layers built on top of the engine.

use serde::{Deserialize, Serialize};

use super::PreciseBank;
use crate::bank::BaseLedger;
use crate::types::{Address, Amount, Coin};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FractionalBalanceResponse {
    pub fractional_balance: Coin,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainderResponse {
    pub remainder: Coin,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalFractionalBalancesResponse {
    pub total: Coin,
}

impl<B: BaseLedger> PreciseBank<B> {
    pub fn query_fractional_balance(&self, address: &Address) -> FractionalBalanceResponse {
        FractionalBalanceResponse {
            fractional_balance: self.extended(self.get_fractional_balance(address)),
        }
    }

    pub fn query_remainder(&self) -> RemainderResponse {
        RemainderResponse {
            remainder: self.extended(self.get_remainder_amount()),
        }
    }

    pub fn query_total_fractional_balances(&self) -> TotalFractionalBalancesResponse {
        TotalFractionalBalancesResponse {
            total: self.extended(self.get_total_fractional_balances()),
        }
    }

    fn extended(&self, amount: Amount) -> Coin {
        Coin::new(self.coin_info.extended_denom.clone(), amount)
    }
}
