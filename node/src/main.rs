// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # precisebank Operator CLI
//!
//! Entry point for the `precisebank` binary. Parses CLI arguments,
//! initializes logging, opens the data directory and runs one command
//! against the stored engine. Mutating commands persist before exiting.
//!
//! - `init`             create a data directory
//! - `mint` / `burn` / `send`  mutate balances
//! - `balance` / `fractional` / `remainder` / `total-fractional`  queries
//! - `check`            run every invariant
//! - `export` / `validate-genesis`  genesis documents
//! - `simulate`         seeded in-memory run
//! - `version`          build information

mod cli;
mod logging;
mod simulate;
mod state;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use precisebank::config::MODULE_NAME;
use precisebank::Coin;

use cli::{Commands, PreciseBankCli};
use logging::LogFormat;
use state::{ExportDocument, GenesisFile, NodeState};

fn main() -> Result<()> {
    let cli = PreciseBankCli::parse();
    logging::init_logging(
        logging::DEFAULT_FILTER,
        LogFormat::from_str_lossy(&cli.log_format),
    );

    match cli.command {
        Commands::Init(args) => init(args),
        Commands::Mint(args) => mint(args),
        Commands::Burn(args) => burn(args),
        Commands::Send(args) => send(args),
        Commands::Balance(args) => balance(args),
        Commands::Fractional(args) => {
            let state = NodeState::open(&args.dir.data_dir)?;
            print_json(&state.engine().query_fractional_balance(&args.address))
        }
        Commands::Remainder(args) => {
            let state = NodeState::open(&args.data_dir)?;
            print_json(&state.engine().query_remainder())
        }
        Commands::TotalFractional(args) => {
            let state = NodeState::open(&args.data_dir)?;
            print_json(&state.engine().query_total_fractional_balances())
        }
        Commands::Check(args) => check(args),
        Commands::Export(args) => export(args),
        Commands::ValidateGenesis(args) => validate_genesis(args),
        Commands::Simulate(args) => {
            let report = simulate::run(&args)?;
            if args.json {
                print_json(&report)?;
            } else {
                println!("{report}");
            }
            if !report.invariants_ok {
                anyhow::bail!("simulation broke an invariant");
            }
            Ok(())
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

fn init(args: cli::InitArgs) -> Result<()> {
    let engine = match &args.genesis {
        Some(path) => GenesisFile::read(path)?
            .into_engine()
            .with_context(|| format!("genesis file {} is not usable", path.display()))?,
        None => state::fresh_engine(&args.integer_denom, &args.extended_denom, args.decimals)?,
    };
    let state = NodeState::init(&args.dir.data_dir, engine)?;

    let info = state.engine().coin_info();
    println!("Data directory initialized.");
    println!("  Path              : {}", args.dir.data_dir.display());
    println!("  Integer denom     : {}", info.integer_denom);
    println!("  Extended denom    : {}", info.extended_denom);
    println!("  Conversion factor : {}", info.cf());
    println!("  Reserve account   : {}", state.engine().reserve_address());
    Ok(())
}

fn mint(args: cli::MintArgs) -> Result<()> {
    let mut state = NodeState::open(&args.dir.data_dir)?;
    let engine = state.engine_mut();
    match (&args.to, &args.module) {
        (Some(to), _) => engine.mint(to, &args.coins),
        (None, Some(module)) => engine.mint_coins(module, &args.coins),
        (None, None) => anyhow::bail!("a recipient is required"),
    }
    .context("mint failed")?;
    state.persist()?;
    tracing::info!(coins = %args.coins, "mint persisted");
    Ok(())
}

fn burn(args: cli::BurnArgs) -> Result<()> {
    let mut state = NodeState::open(&args.dir.data_dir)?;
    let engine = state.engine_mut();
    match (&args.from, &args.module) {
        (Some(from), _) => engine.burn(from, &args.coins),
        (None, Some(module)) => engine.burn_coins(module, &args.coins),
        (None, None) => anyhow::bail!("an account or module to burn from is required"),
    }
    .context("burn failed")?;
    state.persist()?;
    tracing::info!(coins = %args.coins, "burn persisted");
    Ok(())
}

fn send(args: cli::SendArgs) -> Result<()> {
    let mut state = NodeState::open(&args.dir.data_dir)?;
    let engine = state.engine_mut();
    let coins = &args.coins;
    match (&args.from, &args.from_module, &args.to, &args.to_module) {
        (Some(from), _, Some(to), _) => engine.send_coins(from, to, coins),
        (Some(from), _, None, Some(module)) => {
            engine.send_coins_from_account_to_module(from, module, coins)
        }
        (None, Some(module), Some(to), _) => {
            engine.send_coins_from_module_to_account(module, to, coins)
        }
        (None, Some(from), None, Some(to)) => {
            engine.send_coins_from_module_to_module(from, to, coins)
        }
        _ => anyhow::bail!("a source and a destination are required"),
    }
    .context("send failed")?;
    state.persist()?;
    tracing::info!(coins = %coins, "send persisted");
    Ok(())
}

fn balance(args: cli::BalanceArgs) -> Result<()> {
    let state = NodeState::open(&args.dir.data_dir)?;
    let engine = state.engine();

    let coins: Vec<Coin> = match &args.denom {
        Some(denom) if args.spendable => vec![engine.spendable_coin(&args.address, denom)?],
        Some(denom) => vec![engine.get_balance(&args.address, denom)?],
        None => {
            let extended = &engine.coin_info().extended_denom;
            let mut coins = engine.get_all_balances(&args.address).into_vec();
            coins.push(engine.get_balance(&args.address, extended)?);
            coins
        }
    };
    print_json(&coins)
}

fn check(args: cli::DataDirArgs) -> Result<()> {
    let state = NodeState::open(&args.data_dir)?;
    state.engine().check_invariants()?;

    let engine = state.engine();
    println!("invariants ok");
    println!("  fractional balances : {}", engine.store().fractional().len());
    println!("  total fractional    : {}", engine.get_total_fractional_balances());
    println!("  remainder           : {}", engine.get_remainder_amount());
    println!("  reserve units       : {}", state.reserve_units());
    Ok(())
}

fn export(args: cli::ExportArgs) -> Result<()> {
    let state = NodeState::open(&args.dir.data_dir)?;
    let doc = ExportDocument::new(state.engine(), !args.without_ledger);
    let json = serde_json::to_string_pretty(&doc).context("failed to encode export")?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(
                path = %path.display(),
                balances = doc.genesis.balances.len(),
                "genesis exported"
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn validate_genesis(args: cli::ValidateGenesisArgs) -> Result<()> {
    let file = GenesisFile::read(&args.path)?;
    let (genesis, exported_at) = match &file {
        GenesisFile::Exported(doc) => (&doc.genesis, Some(doc.exported_at)),
        GenesisFile::Plain(genesis) => (genesis, None),
    };
    genesis.validate()?;
    let total = genesis.total_amount_with_remainder()?;
    let balances = genesis.balances.len();
    let remainder = genesis.remainder;

    // Building the engine also checks the reserve holding of an embedded
    // ledger snapshot.
    file.into_engine()
        .with_context(|| format!("{} does not describe a usable state", args.path.display()))?;

    println!("{} is valid", args.path.display());
    if let Some(at) = exported_at {
        println!("  exported at        : {}", at.to_rfc3339());
    }
    println!("  fractional balances : {balances}");
    println!("  remainder           : {remainder}");
    println!("  total               : {total}");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to encode output")?;
    println!("{json}");
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("precisebank {}", env!("CARGO_PKG_VERSION"));
    println!("module      {}", MODULE_NAME);
    println!("rustc       {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
