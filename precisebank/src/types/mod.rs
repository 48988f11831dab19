//! Value types shared by every layer: amounts, addresses, coins, the coin
//! configuration and the genesis snapshot.

pub mod address;
pub mod amount;
pub mod coin;
pub mod coin_info;
pub mod genesis;

pub use address::Address;
pub use amount::Amount;
pub use coin::{validate_denom, Coin, Coins};
pub use coin_info::CoinInfo;
pub use genesis::{FractionalBalance, FractionalBalances, GenesisState};
