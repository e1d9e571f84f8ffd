//! Ledger access seam used by registration and viewer sessions.
//!
//! Higher layers depend on [`LedgerGateway`] rather than on the RPC
//! client and contract binding directly, so tests can substitute a
//! scripted ledger.

use std::sync::Arc;

use alloy::primitives::{Bytes, U256};
use async_trait::async_trait;

use crate::chain::client::ChainClient;
use crate::chain::registry::VaultRegistry;
use crate::chain::types::{ChainResult, SubmittedRequest};

/// Authoritative view of the ledger and the vault contract.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Latest block height.
    async fn current_height(&self) -> ChainResult<u64>;

    /// Submit a sealed payload unlocking at `target_block`.
    async fn submit_request(
        &self,
        target_block: u64,
        ciphertext: Bytes,
    ) -> ChainResult<SubmittedRequest>;

    /// Decrypted payload for a request, `None` while still sealed.
    async fn decrypted_media(&self, request_id: U256) -> ChainResult<Option<String>>;
}

/// Production gateway backed by the RPC client and vault contract.
#[derive(Debug)]
pub struct ChainGateway {
    client: ChainClient,
    registry: VaultRegistry,
}

impl ChainGateway {
    pub fn new(client: ChainClient, registry: VaultRegistry) -> Arc<Self> {
        Arc::new(Self { client, registry })
    }
}

#[async_trait]
impl LedgerGateway for ChainGateway {
    async fn current_height(&self) -> ChainResult<u64> {
        self.client.current_height().await
    }

    async fn submit_request(
        &self,
        target_block: u64,
        ciphertext: Bytes,
    ) -> ChainResult<SubmittedRequest> {
        self.registry.create_request(target_block, ciphertext).await
    }

    async fn decrypted_media(&self, request_id: U256) -> ChainResult<Option<String>> {
        self.registry.decrypted_message(request_id).await
    }
}
