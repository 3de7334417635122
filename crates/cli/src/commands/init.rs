//! Initialize ledger command.

use crate::data::DataDir;
use anyhow::{bail, Context, Result};
use auditchain_chain::{Ledger, LedgerConfig, DEFAULT_DIFFICULTY};
use auditchain_consensus::MiningLimits;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct InitArgs {
    /// Directory to store ledger data
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Leading zero hex characters required in block hashes
    #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
    difficulty: u32,

    /// Also check the genesis block during validation
    #[arg(long)]
    validate_genesis: bool,

    /// Give up mining a block after this many hashes
    #[arg(long)]
    max_attempts: Option<u64>,

    /// Give up mining a block after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

pub fn run(args: InitArgs) -> Result<()> {
    let data = DataDir::new(&args.data_dir);
    let storage = data.open_storage()?;
    if data.is_initialized(&storage)? {
        bail!("Ledger already initialized in {:?}", data.path());
    }

    println!("{}", "Initializing auditchain...".bold().cyan());
    println!();

    let config = LedgerConfig {
        difficulty: args.difficulty,
        validate_genesis: args.validate_genesis,
        mining: MiningLimits {
            max_attempts: args.max_attempts,
            timeout_ms: args.timeout_ms,
        },
    };

    println!(
        "  Mining genesis block at difficulty {}...",
        config.difficulty.to_string().bright_cyan()
    );
    let ledger = Ledger::with_config(config).context("Failed to create genesis block")?;

    data.save_config(ledger.config())?;
    data.persist(&storage, &ledger)?;

    let genesis = ledger.latest_block();
    println!();
    println!("{}  Created genesis block", "✓".green().bold());
    println!("    Hash:  {}", genesis.hash.bright_yellow());
    println!("    Nonce: {}", genesis.nonce.to_string().bright_cyan());
    println!(
        "{}  Saved config to: {}",
        "✓".green().bold(),
        data.config_path().display().to_string().bright_black()
    );

    println!();
    println!("{}", "Ledger initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!(
        "  • Use {} to record actions",
        "auditchain append".bright_cyan()
    );
    println!(
        "  • Use {} to check the chain",
        "auditchain verify".bright_cyan()
    );
    println!(
        "  • Use {} to explore blocks",
        "auditchain block list".bright_cyan()
    );

    Ok(())
}
