//! Data directory layout: the sled database plus `config.json`.

use anyhow::{bail, Context, Result};
use auditchain_chain::{Ledger, LedgerConfig};
use auditchain_storage::{BlockStore, Storage};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_FILE: &str = "config.json";

/// A ledger's on-disk home.
pub struct DataDir {
    path: PathBuf,
}

impl DataDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config_path(&self) -> PathBuf {
        self.path.join(CONFIG_FILE)
    }

    /// A directory counts as initialized once its genesis block is stored.
    /// `init` writes the config before that, so a run cut short can be repeated.
    pub fn is_initialized(&self, storage: &Storage) -> Result<bool> {
        Ok(BlockStore::new(storage).is_initialized()?)
    }

    pub fn save_config(&self, config: &LedgerConfig) -> Result<()> {
        fs::create_dir_all(&self.path)
            .with_context(|| format!("Failed to create data directory: {:?}", self.path))?;
        fs::write(self.config_path(), serde_json::to_string_pretty(config)?)
            .context("Failed to write config.json")?;
        Ok(())
    }

    pub fn load_config(&self) -> Result<LedgerConfig> {
        let contents = fs::read_to_string(self.config_path())
            .context("Failed to read config.json. Did you run 'auditchain init'?")?;
        serde_json::from_str(&contents).context("Invalid config.json")
    }

    pub fn open_storage(&self) -> Result<Storage> {
        Storage::open(&self.path)
            .with_context(|| "Failed to open storage. Did you run 'auditchain init'?")
    }

    /// Rebuild the ledger from storage. The chain is not validated here.
    pub fn load_ledger(&self, storage: &Storage) -> Result<Ledger> {
        let config = self.load_config()?;
        let blocks = BlockStore::new(storage).load_blocks()?;
        if blocks.is_empty() {
            bail!("No blocks stored in {:?}. Did you run 'auditchain init'?", self.path);
        }
        debug!(path = ?self.path, blocks = blocks.len(), "loaded ledger");
        Ok(Ledger::from_blocks(blocks, config)?)
    }

    /// Write any blocks the store does not have yet.
    pub fn persist(&self, storage: &Storage, ledger: &Ledger) -> Result<usize> {
        BlockStore::new(storage)
            .save_blocks(ledger.blocks())
            .context("Failed to persist blocks")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auditchain_consensus::MiningLimits;
    use auditchain_core::Payload;
    use tempfile::TempDir;

    #[test]
    fn test_config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let data = DataDir::new(dir.path().join("ledger"));
        let config = LedgerConfig {
            difficulty: 3,
            validate_genesis: true,
            mining: MiningLimits {
                max_attempts: Some(1_000),
                timeout_ms: None,
            },
        };

        data.save_config(&config).unwrap();
        assert_eq!(data.load_config().unwrap(), config);
    }

    #[test]
    fn test_config_defaults_for_missing_fields() {
        let dir = TempDir::new().unwrap();
        let data = DataDir::new(dir.path());
        fs::write(data.config_path(), r#"{"difficulty": 2}"#).unwrap();

        let config = data.load_config().unwrap();
        assert_eq!(config, LedgerConfig::new(2));
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let data = DataDir::new(dir.path());

        assert!(data.load_config().is_err());
    }

    #[test]
    fn test_persisted_ledger_reloads() {
        let dir = TempDir::new().unwrap();
        let data = DataDir::new(dir.path());
        let storage = data.open_storage().unwrap();

        let mut ledger = Ledger::new(1).unwrap();
        data.save_config(ledger.config()).unwrap();
        ledger.append("tx1", 1, 7, "create", Payload::new()).unwrap();
        assert_eq!(data.persist(&storage, &ledger).unwrap(), 2);

        let reloaded = data.load_ledger(&storage).unwrap();
        assert_eq!(reloaded.blocks(), ledger.blocks());
        assert!(reloaded.validate_chain());
    }

    #[test]
    fn test_initialized_once_genesis_stored() {
        let dir = TempDir::new().unwrap();
        let data = DataDir::new(dir.path());
        let storage = data.open_storage().unwrap();
        let ledger = Ledger::new(1).unwrap();

        assert!(!data.is_initialized(&storage).unwrap());

        data.save_config(ledger.config()).unwrap();
        assert!(!data.is_initialized(&storage).unwrap());

        data.persist(&storage, &ledger).unwrap();
        assert!(data.is_initialized(&storage).unwrap());
    }

    #[test]
    fn test_init_can_resume_after_config_only() {
        let dir = TempDir::new().unwrap();
        let data = DataDir::new(dir.path());
        let storage = data.open_storage().unwrap();

        // An earlier run wrote its config and stopped before storing genesis.
        data.save_config(&LedgerConfig::new(2)).unwrap();
        assert!(!data.is_initialized(&storage).unwrap());

        let ledger = Ledger::new(1).unwrap();
        data.save_config(ledger.config()).unwrap();
        data.persist(&storage, &ledger).unwrap();

        let reloaded = data.load_ledger(&storage).unwrap();
        assert_eq!(reloaded.difficulty(), 1);
        assert!(reloaded.validate_chain());
    }

    #[test]
    fn test_load_without_blocks_fails() {
        let dir = TempDir::new().unwrap();
        let data = DataDir::new(dir.path());
        data.save_config(&LedgerConfig::new(1)).unwrap();

        let storage = data.open_storage().unwrap();
        assert!(data.load_ledger(&storage).is_err());
    }
}
