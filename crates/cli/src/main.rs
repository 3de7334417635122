//! auditchain CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod data;

#[derive(Parser)]
#[command(name = "auditchain")]
#[command(about = "A tamper-evident append-only audit ledger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<commands::Commands>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(cmd) => {
            if let Err(e) = commands::run(cmd) {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("auditchain - A tamper-evident append-only audit ledger");
            println!("Run 'auditchain --help' for usage information.");
        }
    }
}
