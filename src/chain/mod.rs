//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key)
//!     → wallet.rs (key loading)
//!     → client.rs (RPC connection with timeouts, failover)
//!     → registry.rs (vault contract: submit, confirm, read back)
//!     → gateway.rs (trait seam consumed by register/ and session/)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - Graceful degradation when the ledger is unreachable

pub mod client;
pub mod gateway;
pub mod registry;
pub mod types;
pub mod wallet;

pub use client::ChainClient;
pub use gateway::{ChainGateway, LedgerGateway};
pub use registry::VaultRegistry;
pub use types::{ChainConfig, ChainError, ChainId, ChainResult, SubmittedRequest};
pub use wallet::Wallet;
