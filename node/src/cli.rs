//! # CLI Interface
//!
//! Defines the command-line argument structure for `precisebank` using
//! `clap` derive. Every subcommand except `simulate`, `validate-genesis`
//! and `version` operates on a data directory holding one sled database.

use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

use precisebank::{Address, Coins};

/// Extended-precision bank operator tool.
///
/// Initializes, mutates and inspects a precisebank data directory, and
/// runs seeded simulations against an in-memory ledger.
#[derive(Parser, Debug)]
#[command(
    name = "precisebank",
    about = "Extended-precision bank operator tool",
    version,
    propagate_version = true
)]
pub struct PreciseBankCli {
    /// Log output format: `pretty` or `json`.
    #[arg(
        long,
        global = true,
        env = "PRECISEBANK_LOG_FORMAT",
        default_value = "pretty"
    )]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a data directory from a coin configuration or a genesis file.
    Init(InitArgs),
    /// Mint coins to an account or a module account.
    Mint(MintArgs),
    /// Burn coins from an account or a module account.
    Burn(BurnArgs),
    /// Send coins between accounts and module accounts.
    Send(SendArgs),
    /// Print the balance of an account.
    Balance(BalanceArgs),
    /// Print the fractional balance of an account.
    Fractional(FractionalArgs),
    /// Print the reserve remainder.
    Remainder(DataDirArgs),
    /// Print the sum of all fractional balances.
    TotalFractional(DataDirArgs),
    /// Run every invariant against the stored state.
    Check(DataDirArgs),
    /// Export the stored state as a genesis document.
    Export(ExportArgs),
    /// Validate a genesis document without touching any data directory.
    ValidateGenesis(ValidateGenesisArgs),
    /// Run a seeded random Mint/Burn/Send sequence in memory.
    Simulate(SimulateArgs),
    /// Print version information and exit.
    Version,
}

/// Location of the data directory.
#[derive(Args, Debug, Clone)]
pub struct DataDirArgs {
    /// Path to the data directory. Created by `init`.
    #[arg(
        long,
        short = 'd',
        env = "PRECISEBANK_DATA_DIR",
        default_value = ".precisebank"
    )]
    pub data_dir: PathBuf,
}

/// Arguments for the `init` subcommand.
#[derive(Args, Debug)]
pub struct InitArgs {
    #[command(flatten)]
    pub dir: DataDirArgs,

    /// Genesis document (plain or exported) to start from. Overrides the
    /// denomination flags.
    #[arg(long)]
    pub genesis: Option<PathBuf>,

    /// Integer denomination held by the base ledger.
    #[arg(long, default_value = "uatom")]
    pub integer_denom: String,

    /// Extended denomination exposed by this module.
    #[arg(long, default_value = "aatom")]
    pub extended_denom: String,

    /// Decimal places of the integer denomination (1..=18).
    #[arg(long, default_value_t = 6)]
    pub decimals: u32,
}

/// Arguments for the `mint` subcommand.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("recipient").required(true).args(["to", "module"])))]
pub struct MintArgs {
    #[command(flatten)]
    pub dir: DataDirArgs,

    /// Recipient account (bech32 or 0x-hex).
    #[arg(long)]
    pub to: Option<Address>,

    /// Recipient module name.
    #[arg(long)]
    pub module: Option<String>,

    /// Coins to mint, e.g. `1000aatom,5stake`.
    pub coins: Coins,
}

/// Arguments for the `burn` subcommand.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("holder").required(true).args(["from", "module"])))]
pub struct BurnArgs {
    #[command(flatten)]
    pub dir: DataDirArgs,

    /// Account to burn from.
    #[arg(long)]
    pub from: Option<Address>,

    /// Module to burn from.
    #[arg(long)]
    pub module: Option<String>,

    /// Coins to burn.
    pub coins: Coins,
}

/// Arguments for the `send` subcommand.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["from", "from_module"])))]
#[command(group(ArgGroup::new("destination").required(true).args(["to", "to_module"])))]
pub struct SendArgs {
    #[command(flatten)]
    pub dir: DataDirArgs,

    /// Sending account.
    #[arg(long)]
    pub from: Option<Address>,

    /// Sending module.
    #[arg(long)]
    pub from_module: Option<String>,

    /// Receiving account.
    #[arg(long)]
    pub to: Option<Address>,

    /// Receiving module.
    #[arg(long)]
    pub to_module: Option<String>,

    /// Coins to send.
    pub coins: Coins,
}

/// Arguments for the `balance` subcommand.
#[derive(Args, Debug)]
pub struct BalanceArgs {
    #[command(flatten)]
    pub dir: DataDirArgs,

    /// Account to query.
    pub address: Address,

    /// Single denomination to report. Defaults to every base-ledger
    /// denomination plus the extended one.
    #[arg(long)]
    pub denom: Option<String>,

    /// Report the spendable amount instead of the full balance.
    #[arg(long, requires = "denom")]
    pub spendable: bool,
}

/// Arguments for the `fractional` subcommand.
#[derive(Args, Debug)]
pub struct FractionalArgs {
    #[command(flatten)]
    pub dir: DataDirArgs,

    /// Account to query.
    pub address: Address,
}

/// Arguments for the `export` subcommand.
#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub dir: DataDirArgs,

    /// Write the document here instead of stdout.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Leave out the base-ledger snapshot.
    #[arg(long)]
    pub without_ledger: bool,
}

/// Arguments for the `validate-genesis` subcommand.
#[derive(Args, Debug)]
pub struct ValidateGenesisArgs {
    /// Genesis document to check.
    pub path: PathBuf,
}

/// Arguments for the `simulate` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// RNG seed. The same seed always yields the same run.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of operations to attempt.
    #[arg(long, default_value_t = 1000)]
    pub steps: usize,

    /// Number of distinct accounts.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..))]
    pub accounts: u8,

    /// Decimal places of the integer denomination (1..=18).
    #[arg(long, default_value_t = 6)]
    pub decimals: u32,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        PreciseBankCli::command().debug_assert();
    }

    #[test]
    fn parses_mint_to_account() {
        let cli = PreciseBankCli::try_parse_from([
            "precisebank",
            "mint",
            "-d",
            "/tmp/pb",
            "--to",
            "0x0101010101010101010101010101010101010101",
            "1000aatom,5stake",
        ])
        .unwrap();
        let Commands::Mint(args) = cli.command else {
            panic!("expected mint");
        };
        assert_eq!(args.dir.data_dir, PathBuf::from("/tmp/pb"));
        assert_eq!(args.to, Some(Address::new(vec![1u8; 20])));
        assert_eq!(args.coins.len(), 2);
    }

    #[test]
    fn mint_requires_a_recipient() {
        let err = PreciseBankCli::try_parse_from(["precisebank", "mint", "10aatom"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn send_rejects_two_sources() {
        let err = PreciseBankCli::try_parse_from([
            "precisebank",
            "send",
            "--from",
            "0x01",
            "--from-module",
            "distribution",
            "--to",
            "0x02",
            "1aatom",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn malformed_coins_are_rejected() {
        let err = PreciseBankCli::try_parse_from([
            "precisebank",
            "burn",
            "--module",
            "gov",
            "aatom10",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
