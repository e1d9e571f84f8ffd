//! Time-lock sealing subsystem.
//!
//! Sealing binds a payload to a block height: the ciphertext reveals
//! nothing until the chain reaches that height, after which the
//! network-held key material lets the vault decrypt it. The sealing
//! primitive itself runs out of process; this module defines the seam
//! and the HTTP adapter that reaches it.

use alloy::primitives::Bytes;
use async_trait::async_trait;
use thiserror::Error;

pub mod remote;

pub use remote::RemoteSealer;

/// Errors raised while sealing a payload.
#[derive(Debug, Error)]
pub enum EncryptionError {
    /// The requested unlock height is not in the future.
    #[error("Target block {target} is not above current height {current}")]
    TargetNotInFuture { target: u64, current: u64 },

    /// The sealing service could not be reached.
    #[error("Sealer unavailable: {0}")]
    Sealer(String),

    /// The sealing service refused the payload.
    #[error("Sealer rejected payload: {0}")]
    Rejected(String),
}

/// Seals payloads against a future block height.
#[async_trait]
pub trait TimelockSealer: Send + Sync {
    /// Seal `payload` so it becomes decryptable at `target_block`.
    async fn seal(&self, payload: &[u8], target_block: u64) -> Result<Bytes, EncryptionError>;
}
