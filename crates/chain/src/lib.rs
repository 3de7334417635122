//! Ledger orchestration for auditchain.
//!
//! This crate brings together all components into an append-only ledger:
//! - **Ledger**: genesis creation, transaction intake, mining, validation
//! - **Queries**: lookups by block index, transaction id, subject, actor
//! - **Shared access**: a lock-guarded handle for multi-threaded callers
//!
//! Persistence is left to the caller: blocks can be taken out with
//! [`Ledger::blocks`] and restored with [`Ledger::from_blocks`].
//!
//! # Example
//!
//! ```rust,no_run
//! use auditchain_chain::{Ledger, SharedLedger};
//! use auditchain_core::{Payload, Transaction};
//!
//! // Create a ledger and mine its genesis block
//! let mut ledger = Ledger::new(2).unwrap();
//!
//! // Record an action
//! let id = Transaction::generate_id(1, 7, "create");
//! ledger.append(id, 1, 7, "create", Payload::new()).unwrap();
//! assert!(ledger.validate_chain());
//!
//! // Share it between threads
//! let shared = SharedLedger::new(ledger);
//! println!("{:?}", shared.chain_info());
//! ```

pub mod ledger;
pub mod query;
pub mod shared;

// Re-export commonly used types
pub use ledger::{Ledger, LedgerConfig, LedgerError, DEFAULT_DIFFICULTY};
pub use query::ChainInfo;
pub use shared::SharedLedger;
