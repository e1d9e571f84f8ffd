//! Chain-specific types and error definitions.

use alloy::primitives::{TxHash, U256};
use thiserror::Error;

// Re-export ChainConfig from config module to avoid duplication
pub use crate::config::schema::ChainConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// RPC connection or request failed.
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Transaction was not confirmed within expected time.
    #[error("Transaction not confirmed after {0} seconds")]
    ConfirmationTimeout(u64),

    /// Transaction was reverted on-chain.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// Invalid private key format or missing signing key.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

/// Result type for ledger operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Outcome of a confirmed time-lock request submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmittedRequest {
    /// Request identifier assigned by the vault contract.
    pub request_id: U256,
    /// Hash of the confirmed submission transaction.
    pub tx_hash: TxHash,
}
