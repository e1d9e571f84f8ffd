//! Release registration subsystem.
//!
//! # Data Flow
//! ```text
//! media bytes + metadata + target height
//!     → media upload (content-addressed storage)
//!     → ABI-encode gateway URL
//!     → seal against target height
//!     → vault submission (confirmed, request ID read back)
//!     → release record persisted
//! ```
//!
//! Each step is fallible and aborts the pipeline; nothing is persisted
//! unless the submission confirmed.

use thiserror::Error;

use crate::chain::ChainError;
use crate::media::UploadError;
use crate::records::{RightsClass, StoreError};
use crate::timelock::EncryptionError;

pub mod builder;

pub use builder::RequestBuilder;

/// Publisher-supplied release metadata.
#[derive(Debug, Clone)]
pub struct ReleaseMeta {
    pub title: String,
    pub description: String,
    pub media_type: String,
    pub rights: RightsClass,
    pub created_at: String,
}

/// Errors raised while registering a release.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// Media upload failed.
    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    /// Sealing failed or the target height was not in the future.
    #[error("Encryption failed: {0}")]
    Encryption(#[from] EncryptionError),

    /// The ledger could not report its height before sealing.
    #[error("Ledger unavailable: {0}")]
    Ledger(ChainError),

    /// The vault submission failed or never confirmed.
    #[error("Submission failed: {0}")]
    Submission(ChainError),

    /// The confirmed release could not be persisted.
    #[error("Record persistence failed: {0}")]
    Store(#[from] StoreError),
}
