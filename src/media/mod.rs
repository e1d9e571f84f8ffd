//! Content-addressed media storage subsystem.
//!
//! Sealed releases never carry the media itself on-chain. The payload
//! is uploaded to content-addressed storage first and only the gateway
//! URL enters the sealed ciphertext.

use async_trait::async_trait;
use thiserror::Error;

pub mod lighthouse;

pub use lighthouse::LighthouseClient;

/// Errors raised while uploading media.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The storage API could not be reached.
    #[error("Storage request failed: {0}")]
    Transport(String),

    /// The storage API rejected the upload.
    #[error("Storage rejected upload with status {0}")]
    Status(u16),

    /// The configured API key environment variable is not set.
    #[error("Environment variable {0} not set")]
    MissingKey(String),

    /// The storage API answered with an unusable body.
    #[error("Malformed storage response: {0}")]
    Malformed(String),
}

/// Where an uploaded payload can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    /// Content identifier assigned by the storage network.
    pub cid: String,
    /// Public gateway URL serving the content.
    pub url: String,
}

/// Upload seam for content-addressed storage.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Upload a payload and return where it now lives.
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<MediaReference, UploadError>;
}
