//! Transaction records and their integrity hashes.

use crate::hash::sha256_hex;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Free-form action details attached to a transaction.
pub type Payload = Map<String, Value>;

/// Errors that can occur during transaction operations.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("failed to encode transaction for hashing: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One recorded action on the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Caller-supplied or generated identifier.
    pub id: String,
    /// The document (or other subject) the action applies to.
    pub subject_id: Option<u64>,
    /// The user that performed the action.
    pub actor_id: Option<u64>,
    /// Short action tag, e.g. "create" or "update".
    pub action: String,
    /// Opaque action details.
    #[serde(default)]
    pub payload: Payload,
    /// Set once at construction.
    pub timestamp: DateTime<Utc>,
    /// Integrity hash over every other field. Empty until sealed.
    #[serde(default)]
    pub hash: String,
}

/// Hash input: every field except `hash`, in a fixed order.
#[derive(Serialize)]
struct TransactionPreimage<'a> {
    id: &'a str,
    subject_id: Option<u64>,
    actor_id: Option<u64>,
    action: &'a str,
    payload: CanonicalMap<'a>,
    timestamp: &'a DateTime<Utc>,
}

/// Serializes a JSON object with its keys sorted at every depth.
struct CanonicalMap<'a>(&'a Map<String, Value>);

struct CanonicalValue<'a>(&'a Value);

impl Serialize for CanonicalMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let sorted: BTreeMap<&str, CanonicalValue<'_>> = self
            .0
            .iter()
            .map(|(k, v)| (k.as_str(), CanonicalValue(v)))
            .collect();
        serializer.collect_map(sorted)
    }
}

impl Serialize for CanonicalValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Object(map) => CanonicalMap(map).serialize(serializer),
            Value::Array(items) => serializer.collect_seq(items.iter().map(CanonicalValue)),
            scalar => scalar.serialize(serializer),
        }
    }
}

impl Transaction {
    /// Create a new unsealed transaction stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        subject_id: Option<u64>,
        actor_id: Option<u64>,
        action: impl Into<String>,
        payload: Payload,
    ) -> Self {
        Self {
            id: id.into(),
            subject_id,
            actor_id,
            action: action.into(),
            payload,
            timestamp: Utc::now(),
            hash: String::new(),
        }
    }

    /// Create a transaction about a subject, performed by an actor.
    pub fn document(
        id: impl Into<String>,
        subject_id: u64,
        actor_id: u64,
        action: impl Into<String>,
        payload: Payload,
    ) -> Self {
        Self::new(id, Some(subject_id), Some(actor_id), action, payload)
    }

    /// The synthetic transaction recorded in the genesis block.
    pub fn genesis() -> Self {
        let mut payload = Payload::new();
        payload.insert("message".into(), Value::from("Genesis block"));
        Self::new("genesis", None, None, "genesis", payload)
    }

    /// Compute the integrity hash without touching the stored one.
    pub fn compute_hash(&self) -> Result<String, TransactionError> {
        let preimage = TransactionPreimage {
            id: &self.id,
            subject_id: self.subject_id,
            actor_id: self.actor_id,
            action: &self.action,
            payload: CanonicalMap(&self.payload),
            timestamp: &self.timestamp,
        };
        let encoded = serde_json::to_vec(&preimage)?;
        Ok(sha256_hex(&encoded))
    }

    /// Compute and store the integrity hash.
    pub fn seal(&mut self) -> Result<(), TransactionError> {
        self.hash = self.compute_hash()?;
        Ok(())
    }

    /// Create a sealed transaction.
    pub fn sealed(mut self) -> Result<Self, TransactionError> {
        self.seal()?;
        Ok(self)
    }

    /// Check that the stored hash matches the transaction contents.
    pub fn verify_hash(&self) -> Result<bool, TransactionError> {
        Ok(self.compute_hash()? == self.hash)
    }

    /// Generate an identifier from the current time.
    pub fn generate_id(subject_id: u64, actor_id: u64, action: &str) -> String {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        generate_transaction_id(subject_id, actor_id, action, nanos)
    }
}

/// Derive a 16 hex character transaction id.
///
/// Uniqueness is advisory: no collision check is performed.
pub fn generate_transaction_id(subject_id: u64, actor_id: u64, action: &str, nanos: i64) -> String {
    let data = format!("{}_{}_{}_{}", subject_id, actor_id, action, nanos);
    let mut id = sha256_hex(data.as_bytes());
    id.truncate(16);
    id
}
