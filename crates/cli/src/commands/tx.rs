//! Transaction operations command.

use super::history::print_transactions;
use crate::data::DataDir;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct TxArgs {
    #[command(subcommand)]
    command: TxCommand,
}

#[derive(Subcommand)]
enum TxCommand {
    /// Show a transaction as JSON
    Show {
        /// Directory to store ledger data
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,

        /// Transaction id
        id: String,
    },
    /// List transactions, optionally filtered
    List {
        /// Directory to store ledger data
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,

        /// Only transactions with this action tag
        #[arg(long)]
        action: Option<String>,

        /// Only transactions at or after this RFC 3339 time
        #[arg(long)]
        since: Option<DateTime<Utc>>,

        /// Only transactions at or before this RFC 3339 time
        #[arg(long)]
        until: Option<DateTime<Utc>>,
    },
}

pub fn run(args: TxArgs) -> Result<()> {
    match args.command {
        TxCommand::Show { data_dir, id } => show_transaction(data_dir, id),
        TxCommand::List {
            data_dir,
            action,
            since,
            until,
        } => list_transactions(data_dir, action, since, until),
    }
}

fn show_transaction(data_dir: PathBuf, id: String) -> Result<()> {
    let data = DataDir::new(data_dir);
    let storage = data.open_storage()?;
    let ledger = data.load_ledger(&storage)?;

    let tx = ledger.get_transaction_by_id(&id)?;
    let valid = tx.verify_hash().context("Failed to hash transaction")?;

    println!("{}", serde_json::to_string_pretty(tx)?);
    if !valid {
        println!(
            "{}  Stored hash does not match contents",
            "✗".red().bold()
        );
    }
    Ok(())
}

fn list_transactions(
    data_dir: PathBuf,
    action: Option<String>,
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
) -> Result<()> {
    let data = DataDir::new(data_dir);
    let storage = data.open_storage()?;
    let ledger = data.load_ledger(&storage)?;

    let mut txs = match &action {
        Some(action) => ledger.transactions_by_action(action),
        None => ledger.transactions().collect(),
    };
    if since.is_some() || until.is_some() {
        let in_range = ledger.transactions_between(
            since.unwrap_or(DateTime::<Utc>::MIN_UTC),
            until.unwrap_or(DateTime::<Utc>::MAX_UTC),
        );
        txs.retain(|tx| in_range.iter().any(|kept| std::ptr::eq(*kept, *tx)));
    }

    print_transactions("Transactions:", &txs);
    Ok(())
}
