//! Persistent storage layer for auditchain.
//!
//! The ledger itself lives in memory. This crate keeps a durable copy of its
//! blocks so a process can stop and pick the chain back up:
//! - Block storage (by index and hash)
//! - Chain head and height tracking
//! - Incremental saves of a ledger's tail
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Application Layer                     │
//! │                (Ledger, Query Surface, CLI)              │
//! └────────────────────────┬────────────────────────────────┘
//!                          │
//! ┌────────────────────────▼────────────────────────────────┐
//! │                   Storage Layer                          │
//! │      ┌─────────────────┐      ┌─────────────────┐        │
//! │      │ BlockStore      │      │ Storage (DB)    │        │
//! │      │  - Blocks       │      │  - sled wrapper │        │
//! │      │  - Head/Height  │      │  - JSON values  │        │
//! │      │  - Genesis      │      │  - key helpers  │        │
//! │      └─────────────────┘      └─────────────────┘        │
//! └────────────────────────┬────────────────────────────────┘
//!                          │
//! ┌────────────────────────▼────────────────────────────────┐
//! │                    sled Database                         │
//! │              (Embedded Key-Value Store)                  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use auditchain_storage::{BlockStore, Storage};
//! use auditchain_core::Block;
//!
//! // Open database
//! let storage = Storage::open("./ledger_data").unwrap();
//!
//! // Persist a chain and read it back
//! let store = BlockStore::new(&storage);
//! let genesis = Block::genesis().unwrap();
//! store.save_blocks(&[genesis]).unwrap();
//! let blocks = store.load_blocks().unwrap();
//! ```

pub mod chain;
pub mod db;

// Re-export commonly used types
pub use chain::BlockStore;
pub use db::{BatchOp, Result, Storage, StorageError};
