//! Chain verification command.

use crate::data::DataDir;
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct VerifyArgs {
    /// Directory to store ledger data
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,
}

pub fn run(args: VerifyArgs) -> Result<()> {
    let data = DataDir::new(args.data_dir);
    let storage = data.open_storage()?;
    let ledger = data.load_ledger(&storage)?;

    println!(
        "{} {} blocks at difficulty {}...",
        "Verifying".bold().cyan(),
        ledger.len().to_string().bright_cyan(),
        ledger.difficulty().to_string().bright_cyan()
    );

    match ledger.verify_chain() {
        Ok(()) => {
            println!("{}  Chain is valid", "✓".green().bold());
            Ok(())
        }
        Err(e) => {
            println!("{}  {}", "✗".red().bold(), e.to_string().red());
            bail!("Chain verification failed");
        }
    }
}
