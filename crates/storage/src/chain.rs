//! Block storage and chain head tracking.

use crate::db::{BatchOp, Result, Storage, StorageError};
use auditchain_core::Block;
use tracing::debug;

/// Keys for chain metadata.
const CHAIN_HEAD_KEY: &[u8] = b"chain:head";
const CHAIN_HEIGHT_KEY: &[u8] = b"chain:height";

/// Persists ledger blocks in append order.
pub struct BlockStore<'a> {
    storage: &'a Storage,
}

impl<'a> BlockStore<'a> {
    /// Create a new BlockStore wrapping the given storage.
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    // =========================================================================
    // Block Storage
    // =========================================================================

    /// Write operations storing a block and moving the head onto it.
    ///
    /// - Primary: `block:index:{index}` → full block data
    /// - Secondary: `block:hash:{hash}` → index
    fn block_ops(block: &Block) -> Result<Vec<BatchOp>> {
        Ok(vec![
            BatchOp::Insert {
                key: Storage::block_index_key(block.index),
                value: Storage::encode(block)?,
            },
            BatchOp::Insert {
                key: Storage::block_hash_key(&block.hash),
                value: Storage::encode(&block.index)?,
            },
            BatchOp::Insert {
                key: CHAIN_HEAD_KEY.to_vec(),
                value: Storage::encode(&block.hash)?,
            },
            BatchOp::Insert {
                key: CHAIN_HEIGHT_KEY.to_vec(),
                value: Storage::encode(&block.index)?,
            },
        ])
    }

    /// Get a block by its index.
    pub fn get_block_by_index(&self, index: u64) -> Result<Option<Block>> {
        self.storage.get(Storage::block_index_key(index))
    }

    /// Get a block by its hash.
    pub fn get_block_by_hash(&self, hash: &str) -> Result<Option<Block>> {
        let index: Option<u64> = self.storage.get(Storage::block_hash_key(hash))?;

        match index {
            Some(i) => self.get_block_by_index(i),
            None => Ok(None),
        }
    }

    /// Check if a block exists by hash.
    pub fn has_block(&self, hash: &str) -> Result<bool> {
        self.storage.contains(Storage::block_hash_key(hash))
    }

    // =========================================================================
    // Chain Head Tracking
    // =========================================================================

    /// Get the current chain head hash.
    pub fn get_head(&self) -> Result<Option<String>> {
        self.storage.get(CHAIN_HEAD_KEY)
    }

    /// Get the index of the latest stored block.
    /// Returns 0 if the chain is not initialized.
    pub fn get_height(&self) -> Result<u64> {
        Ok(self.storage.get::<_, u64>(CHAIN_HEIGHT_KEY)?.unwrap_or(0))
    }

    /// Get the latest block.
    pub fn get_latest_block(&self) -> Result<Option<Block>> {
        if !self.is_initialized()? {
            return Ok(None);
        }
        self.get_block_by_index(self.get_height()?)
    }

    /// Check if the chain is initialized (has a genesis block).
    pub fn is_initialized(&self) -> Result<bool> {
        Ok(self.get_head()?.is_some())
    }

    // =========================================================================
    // Chain Operations
    // =========================================================================

    /// Initialize the store with a genesis block.
    ///
    /// Fails if the block index is not 0 or the store already holds a chain.
    pub fn init_genesis(&self, genesis: &Block) -> Result<()> {
        if !genesis.is_genesis() {
            return Err(StorageError::InvalidGenesis(
                "Genesis block must have index 0".into(),
            ));
        }

        if self.is_initialized()? {
            return Err(StorageError::InvalidGenesis(
                "Chain already initialized".into(),
            ));
        }

        self.storage.batch(Self::block_ops(genesis)?)?;
        debug!(hash = %genesis.hash, "Stored genesis block");
        Ok(())
    }

    /// Append a block after the current head.
    ///
    /// Checks index continuity and the previous-hash link only. Proof of
    /// work and contents are the validator's job.
    pub fn append_block(&self, block: &Block) -> Result<()> {
        let head = self
            .get_head()?
            .ok_or_else(|| StorageError::InvalidAppend("Chain not initialized".into()))?;
        let expected = self.get_height()? + 1;

        if block.index != expected {
            return Err(StorageError::InvalidAppend(format!(
                "Expected block index {}, got {}",
                expected, block.index
            )));
        }

        if block.previous_hash != head {
            return Err(StorageError::InvalidAppend(format!(
                "Block previous_hash {} doesn't match chain head {}",
                block.previous_hash, head
            )));
        }

        self.storage.batch(Self::block_ops(block)?)?;
        debug!(index = block.index, hash = %block.hash, "Stored block");
        Ok(())
    }

    /// Persist every block past the stored height, returning how many were
    /// written. The blocks must start at genesis and extend the stored chain.
    pub fn save_blocks(&self, blocks: &[Block]) -> Result<usize> {
        let mut written = 0;

        let start = if self.is_initialized()? {
            self.get_height()? + 1
        } else {
            let genesis = blocks.first().ok_or_else(|| {
                StorageError::InvalidGenesis("No blocks to initialize from".into())
            })?;
            self.init_genesis(genesis)?;
            written += 1;
            1
        };

        for block in blocks.iter().filter(|b| b.index >= start) {
            self.append_block(block)?;
            written += 1;
        }

        if written > 0 {
            self.storage.flush()?;
        }
        Ok(written)
    }

    /// Get blocks in a range [from, to].
    pub fn get_blocks_range(&self, from: u64, to: u64) -> Result<Vec<Block>> {
        let mut blocks = Vec::new();
        for index in from..=to {
            match self.get_block_by_index(index)? {
                Some(block) => blocks.push(block),
                None => break,
            }
        }
        Ok(blocks)
    }

    /// Load the whole chain, genesis first.
    ///
    /// Returns an empty vector for an uninitialized store. A gap below the
    /// recorded height is reported as `NotFound`.
    pub fn load_blocks(&self) -> Result<Vec<Block>> {
        if !self.is_initialized()? {
            return Ok(Vec::new());
        }

        let height = self.get_height()?;
        let blocks = self.get_blocks_range(0, height)?;
        if blocks.len() as u64 != height + 1 {
            return Err(StorageError::NotFound(format!(
                "block {}",
                blocks.len()
            )));
        }

        debug!(blocks = blocks.len(), "Loaded chain");
        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auditchain_chain::Ledger;
    use auditchain_core::Payload;

    fn setup() -> Storage {
        Storage::open_temporary().unwrap()
    }

    fn ledger_with(appends: u64) -> Ledger {
        let mut ledger = Ledger::new(1).unwrap();
        for i in 0..appends {
            ledger
                .append(format!("tx{}", i), i, 7, "create", Payload::new())
                .unwrap();
        }
        ledger
    }

    #[test]
    fn test_genesis_init() {
        let storage = setup();
        let store = BlockStore::new(&storage);
        let ledger = ledger_with(0);
        let genesis = &ledger.blocks()[0];

        assert!(!store.is_initialized().unwrap());

        store.init_genesis(genesis).unwrap();

        assert!(store.is_initialized().unwrap());
        assert_eq!(store.get_height().unwrap(), 0);
        assert_eq!(store.get_head().unwrap(), Some(genesis.hash.clone()));
    }

    #[test]
    fn test_genesis_double_init_fails() {
        let storage = setup();
        let store = BlockStore::new(&storage);
        let ledger = ledger_with(0);

        store.init_genesis(&ledger.blocks()[0]).unwrap();

        let result = store.init_genesis(&ledger.blocks()[0]);
        assert!(matches!(result, Err(StorageError::InvalidGenesis(_))));
    }

    #[test]
    fn test_non_genesis_as_genesis_fails() {
        let storage = setup();
        let store = BlockStore::new(&storage);
        let ledger = ledger_with(1);

        let result = store.init_genesis(&ledger.blocks()[1]);
        assert!(matches!(result, Err(StorageError::InvalidGenesis(_))));
    }

    #[test]
    fn test_append_and_lookup() {
        let storage = setup();
        let store = BlockStore::new(&storage);
        let ledger = ledger_with(2);
        let blocks = ledger.blocks();

        store.init_genesis(&blocks[0]).unwrap();
        store.append_block(&blocks[1]).unwrap();
        store.append_block(&blocks[2]).unwrap();

        assert_eq!(store.get_height().unwrap(), 2);
        assert_eq!(store.get_head().unwrap(), Some(blocks[2].hash.clone()));
        assert_eq!(store.get_block_by_index(1).unwrap().as_ref(), Some(&blocks[1]));
        assert_eq!(
            store.get_block_by_hash(&blocks[2].hash).unwrap().as_ref(),
            Some(&blocks[2])
        );
        assert_eq!(store.get_latest_block().unwrap().as_ref(), Some(&blocks[2]));
        assert!(store.get_block_by_index(3).unwrap().is_none());
        assert!(store.has_block(&blocks[0].hash).unwrap());
        assert!(!store.has_block("ffff").unwrap());
    }

    #[test]
    fn test_append_before_init_fails() {
        let storage = setup();
        let store = BlockStore::new(&storage);
        let ledger = ledger_with(1);

        let result = store.append_block(&ledger.blocks()[1]);
        assert!(matches!(result, Err(StorageError::InvalidAppend(_))));
    }

    #[test]
    fn test_append_wrong_index_fails() {
        let storage = setup();
        let store = BlockStore::new(&storage);
        let ledger = ledger_with(2);

        store.init_genesis(&ledger.blocks()[0]).unwrap();

        let result = store.append_block(&ledger.blocks()[2]);
        assert!(matches!(result, Err(StorageError::InvalidAppend(_))));
        assert_eq!(store.get_height().unwrap(), 0);
    }

    #[test]
    fn test_append_wrong_previous_hash_fails() {
        let storage = setup();
        let store = BlockStore::new(&storage);
        let ledger = ledger_with(1);

        store.init_genesis(&ledger.blocks()[0]).unwrap();

        let mut block = ledger.blocks()[1].clone();
        block.previous_hash = "ffff".into();
        let result = store.append_block(&block);
        assert!(matches!(result, Err(StorageError::InvalidAppend(_))));
    }

    #[test]
    fn test_save_blocks_is_incremental() {
        let storage = setup();
        let store = BlockStore::new(&storage);
        let mut ledger = ledger_with(2);

        assert_eq!(store.save_blocks(ledger.blocks()).unwrap(), 3);
        assert_eq!(store.save_blocks(ledger.blocks()).unwrap(), 0);

        ledger.append("late", 9, 9, "update", Payload::new()).unwrap();
        assert_eq!(store.save_blocks(ledger.blocks()).unwrap(), 1);
        assert_eq!(store.get_height().unwrap(), 3);
    }

    #[test]
    fn test_save_diverging_chain_fails() {
        let storage = setup();
        let store = BlockStore::new(&storage);

        store.save_blocks(ledger_with(1).blocks()).unwrap();

        let other = ledger_with(2);
        let result = store.save_blocks(other.blocks());
        assert!(matches!(result, Err(StorageError::InvalidAppend(_))));
    }

    #[test]
    fn test_load_empty_store() {
        let storage = setup();
        let store = BlockStore::new(&storage);

        assert!(store.load_blocks().unwrap().is_empty());
        assert!(store.get_latest_block().unwrap().is_none());
    }

    #[test]
    fn test_reloaded_chain_validates() {
        let storage = setup();
        let store = BlockStore::new(&storage);
        let ledger = ledger_with(3);

        store.save_blocks(ledger.blocks()).unwrap();

        let blocks = store.load_blocks().unwrap();
        assert_eq!(blocks, ledger.blocks());

        let reloaded = Ledger::from_blocks(blocks, ledger.config().clone()).unwrap();
        assert!(reloaded.validate_chain());
    }

    #[test]
    fn test_get_blocks_range() {
        let storage = setup();
        let store = BlockStore::new(&storage);
        store.save_blocks(ledger_with(3).blocks()).unwrap();

        let indexes: Vec<u64> = store
            .get_blocks_range(1, 10)
            .unwrap()
            .iter()
            .map(|b| b.index)
            .collect();
        assert_eq!(indexes, vec![1, 2, 3]);
    }
}
