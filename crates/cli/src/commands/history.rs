//! Subject and actor history commands.

use super::block::short;
use crate::data::DataDir;
use anyhow::Result;
use auditchain_core::Transaction;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct HistoryArgs {
    /// Directory to store ledger data
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Subject whose history to show
    #[arg(long)]
    subject: u64,
}

#[derive(Args)]
pub struct ActorArgs {
    /// Directory to store ledger data
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Actor whose actions to show
    #[arg(long)]
    actor: u64,
}

pub fn run_subject(args: HistoryArgs) -> Result<()> {
    let data = DataDir::new(args.data_dir);
    let storage = data.open_storage()?;
    let ledger = data.load_ledger(&storage)?;

    let title = format!("History of subject {}:", args.subject);
    print_transactions(&title, &ledger.transaction_history(args.subject));
    Ok(())
}

pub fn run_actor(args: ActorArgs) -> Result<()> {
    let data = DataDir::new(args.data_dir);
    let storage = data.open_storage()?;
    let ledger = data.load_ledger(&storage)?;

    let title = format!("Actions by actor {}:", args.actor);
    print_transactions(&title, &ledger.transactions_by_actor(args.actor));
    Ok(())
}

fn party(id: Option<u64>) -> String {
    id.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

/// Print transactions one per line, in append order.
pub(super) fn print_transactions(title: &str, txs: &[&Transaction]) {
    println!();
    println!("{}", title.bold().cyan());
    println!();

    if txs.is_empty() {
        println!("  {}", "(none)".bright_black());
    }

    for tx in txs {
        println!(
            "  {} {} {} {} {} {}",
            tx.timestamp.to_rfc3339().bright_black(),
            tx.id.bright_cyan(),
            tx.action.bold(),
            format!("subject={}", party(tx.subject_id)).bright_black(),
            format!("actor={}", party(tx.actor_id)).bright_black(),
            short(&tx.hash).bright_yellow()
        );
    }

    println!();
}
