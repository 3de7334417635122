//! Append transaction command.

use crate::data::DataDir;
use anyhow::{Context, Result};
use auditchain_core::{Payload, Transaction};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct AppendArgs {
    /// Directory to store ledger data
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Entity the action applies to
    #[arg(long)]
    subject: u64,

    /// Principal performing the action
    #[arg(long)]
    actor: u64,

    /// Action tag, e.g. create, update, delete
    #[arg(long)]
    action: String,

    /// Transaction id (generated if omitted)
    #[arg(long)]
    id: Option<String>,

    /// Action payload as a JSON object
    #[arg(long)]
    payload: Option<String>,
}

fn parse_payload(raw: Option<&str>) -> Result<Payload> {
    match raw {
        Some(json) => serde_json::from_str(json).context("Payload must be a JSON object"),
        None => Ok(Payload::new()),
    }
}

pub fn run(args: AppendArgs) -> Result<()> {
    let payload = parse_payload(args.payload.as_deref())?;
    let id = args
        .id
        .unwrap_or_else(|| Transaction::generate_id(args.subject, args.actor, &args.action));

    let data = DataDir::new(&args.data_dir);
    let storage = data.open_storage()?;
    let mut ledger = data.load_ledger(&storage)?;

    println!("{}", "Mining block...".bold().cyan());

    let block = ledger
        .append(id, args.subject, args.actor, args.action, payload)
        .context("Failed to append transaction")?
        .clone();
    data.persist(&storage, &ledger)?;

    let tx = &block.transactions[0];
    println!();
    println!("{}  Transaction recorded", "✓".green().bold());
    println!("    Tx ID:   {}", tx.id.bright_yellow());
    println!("    Tx Hash: {}", tx.hash.bright_black());
    println!("    Block:   {}", format!("#{}", block.index).bright_cyan());
    println!("    Hash:    {}", block.hash.bright_yellow());
    println!("    Nonce:   {}", block.nonce.to_string().bright_cyan());
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_payload() {
        let payload = parse_payload(Some(r#"{"title": "a", "tags": [1, 2]}"#)).unwrap();
        assert_eq!(payload.get("title"), Some(&json!("a")));

        assert!(parse_payload(None).unwrap().is_empty());
        assert!(parse_payload(Some("[1, 2]")).is_err());
        assert!(parse_payload(Some("not json")).is_err());
    }
}
