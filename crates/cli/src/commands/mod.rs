//! CLI commands module.

use anyhow::Result;
use clap::Subcommand;

mod append;
mod block;
mod history;
mod info;
mod init;
mod tx;
mod verify;

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new ledger
    Init(init::InitArgs),
    /// Record an action in a new mined block
    Append(append::AppendArgs),
    /// Block operations
    Block(block::BlockArgs),
    /// Transaction operations
    Tx(tx::TxArgs),
    /// Show every transaction recorded against a subject
    History(history::HistoryArgs),
    /// Show every transaction performed by an actor
    Actor(history::ActorArgs),
    /// Re-validate the whole chain
    Verify(verify::VerifyArgs),
    /// Show a summary of the ledger
    Info(info::InfoArgs),
}

pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init(args) => init::run(args),
        Commands::Append(args) => append::run(args),
        Commands::Block(args) => block::run(args),
        Commands::Tx(args) => tx::run(args),
        Commands::History(args) => history::run_subject(args),
        Commands::Actor(args) => history::run_actor(args),
        Commands::Verify(args) => verify::run(args),
        Commands::Info(args) => info::run(args),
    }
}
