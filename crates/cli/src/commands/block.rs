//! Block operations command.

use crate::data::DataDir;
use anyhow::{Context, Result};
use auditchain_storage::BlockStore;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct BlockArgs {
    #[command(subcommand)]
    command: BlockCommand,
}

#[derive(Subcommand)]
enum BlockCommand {
    /// List recent blocks
    List {
        /// Directory to store ledger data
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,

        /// Number of blocks to show
        #[arg(short, long, default_value = "10")]
        count: usize,
    },
    /// Show detailed block information
    Info {
        /// Directory to store ledger data
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,

        /// Block index or hash
        block_id: String,
    },
}

pub fn run(args: BlockArgs) -> Result<()> {
    match args.command {
        BlockCommand::List { data_dir, count } => list_blocks(data_dir, count),
        BlockCommand::Info { data_dir, block_id } => show_block_info(data_dir, block_id),
    }
}

fn list_blocks(data_dir: PathBuf, count: usize) -> Result<()> {
    let data = DataDir::new(data_dir);
    let storage = data.open_storage()?;
    let ledger = data.load_ledger(&storage)?;
    let recent = ledger.recent_blocks(count);

    println!();
    println!("{}", "Recent Blocks:".bold().cyan());
    println!();

    if recent.is_empty() {
        println!("  {}", "(none)".bright_black());
    }

    for block in recent {
        println!(
            "  {} {} {}",
            format!("#{}", block.index).bright_black(),
            short(&block.hash).bright_yellow(),
            format!("({} txs)", block.tx_count()).bright_black()
        );
    }

    println!();
    Ok(())
}

fn show_block_info(data_dir: PathBuf, block_id: String) -> Result<()> {
    let storage = DataDir::new(data_dir).open_storage()?;
    let store = BlockStore::new(&storage);

    // Try parsing as an index first, then as a hash
    let block = match block_id.parse::<u64>() {
        Ok(index) => store.get_block_by_index(index)?,
        Err(_) => store.get_block_by_hash(&block_id)?,
    }
    .with_context(|| format!("Block not found: {}", block_id))?;

    println!();
    println!("{}", "Block Information:".bold().cyan());
    println!();
    println!("  Index:         {}", block.index.to_string().bright_cyan());
    println!("  Hash:          {}", block.hash.bright_yellow());
    println!("  Previous Hash: {}", block.previous_hash.bright_black());
    println!("  Merkle Root:   {}", block.merkle_root.bright_black());
    println!("  Nonce:         {}", block.nonce.to_string().bright_black());
    println!("  Timestamp:     {}", block.rendered_timestamp().bright_black());
    println!(
        "  Transactions:  {}",
        block.tx_count().to_string().bright_cyan()
    );
    println!();

    if !block.transactions.is_empty() {
        println!("{}", "Transactions:".bold());
        println!();
        for (i, tx) in block.transactions.iter().enumerate() {
            println!(
                "  {} {} {} {}",
                format!("{}.", i + 1).bright_black(),
                tx.id.bright_cyan(),
                tx.action.bold(),
                short(&tx.hash).bright_yellow()
            );
        }
        println!();
    }

    Ok(())
}

/// First 16 characters of a hash, for listings.
pub(super) fn short(hash: &str) -> &str {
    hash.get(..16).unwrap_or(hash)
}
