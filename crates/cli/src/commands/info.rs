//! Ledger summary command.

use crate::data::DataDir;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct InfoArgs {
    /// Directory to store ledger data
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: InfoArgs) -> Result<()> {
    let data = DataDir::new(args.data_dir);
    let storage = data.open_storage()?;
    let ledger = data.load_ledger(&storage)?;
    let info = ledger.chain_info();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let status = if info.is_valid {
        "valid".green().bold()
    } else {
        "INVALID".red().bold()
    };

    println!();
    println!("{}", "Ledger Information:".bold().cyan());
    println!();
    println!("  Blocks:       {}", info.blocks.to_string().bright_cyan());
    println!(
        "  Transactions: {}",
        info.total_transactions.to_string().bright_cyan()
    );
    println!("  Difficulty:   {}", info.difficulty.to_string().bright_cyan());
    println!("  Latest Hash:  {}", info.latest_block_hash.bright_yellow());
    println!("  Status:       {}", status);
    println!();

    Ok(())
}
