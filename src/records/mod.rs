//! Release record storage subsystem.
//!
//! A release record is the durable trace of one sealed release: the
//! descriptive metadata the publisher supplied, the unlock height, and
//! the on-chain coordinates needed to resolve it later. Records are
//! written once at registration and mutated exactly once more, when
//! the decrypted media reference becomes readable.

use std::str::FromStr;

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod file;
pub mod memory;

pub use file::FileRecordStore;
pub use memory::MemoryRecordStore;

/// Usage rights the publisher grants on the released media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RightsClass {
    Exclusive,
    NonExclusive,
    Limited,
}

impl FromStr for RightsClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exclusive" => Ok(Self::Exclusive),
            "non-exclusive" => Ok(Self::NonExclusive),
            "limited" => Ok(Self::Limited),
            other => Err(format!("unknown rights class: {}", other)),
        }
    }
}

/// Durable trace of one sealed release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseRecord {
    /// Opaque record identifier.
    pub id: String,
    /// Release title.
    pub title: String,
    /// Release description.
    pub description: String,
    /// MIME type of the sealed media.
    pub media_type: String,
    /// Usage rights granted on release.
    pub rights: RightsClass,
    /// Publisher-supplied creation date.
    pub created_at: String,
    /// Block height at which the release unlocks.
    pub target_block: u64,
    /// Request ID assigned by the vault contract.
    pub request_id: U256,
    /// Hash of the confirmed submission transaction.
    pub tx_hash: String,
    /// Block explorer link for the submission.
    pub explorer_url: String,
    /// Decrypted media URL, set once after the unlock height passes.
    #[serde(default)]
    pub decrypted_media_url: Option<String>,
}

impl ReleaseRecord {
    /// Whether the release has already been resolved.
    pub fn is_decrypted(&self) -> bool {
        self.decrypted_media_url.is_some()
    }
}

/// Errors raised by record stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists under the requested ID.
    #[error("No release record for id {0}")]
    NotFound(String),

    /// The backing file could not be read or written.
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Keyed storage for release records.
///
/// Implementations must be safe to share across tasks; all writes go
/// through the owning session or registration flow.
pub trait RecordStore: Send + Sync {
    /// Fetch a record by ID.
    fn get(&self, id: &str) -> Result<ReleaseRecord, StoreError>;

    /// Insert a freshly registered record.
    fn put(&self, record: ReleaseRecord) -> Result<(), StoreError>;

    /// Set the decrypted media URL on an existing record.
    fn update_decrypted(&self, id: &str, url: &str) -> Result<ReleaseRecord, StoreError>;

    /// All records, ordered by ID.
    fn list(&self) -> Vec<ReleaseRecord>;
}
