//! Ledger RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoint
//! - Query chain state (block height, chain ID)
//! - Handle timeouts and network errors gracefully
//! - Fail over across configured endpoints

use alloy::providers::{Provider, ProviderBuilder};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::chain::types::{ChainConfig, ChainError, ChainId, ChainResult};

/// Ledger RPC client wrapper with failover support.
#[derive(Clone)]
pub struct ChainClient {
    /// List of providers (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    /// Configuration.
    config: ChainConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl ChainClient {
    /// Create a new ledger client.
    ///
    /// # Arguments
    /// * `config` - Ledger configuration
    ///
    /// # Returns
    /// A new client or error if the primary URL is malformed
    pub async fn new(config: ChainConfig) -> ChainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        // 1. Add primary provider
        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            ChainError::Unavailable(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(
            Arc::new(ProviderBuilder::new().connect_http(primary_url))
                as Arc<dyn Provider + Send + Sync>,
        );

        // 2. Add failover providers
        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(
                    Arc::new(ProviderBuilder::new().connect_http(url))
                        as Arc<dyn Provider + Send + Sync>,
                );
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        let client = Self {
            providers,
            config: config.clone(),
            timeout_duration,
        };

        // Verify chain ID matches configuration
        match client.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(
                    rpc_url = %config.rpc_url,
                    chain_id = config.chain_id,
                    "Ledger client initialized"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Ledger client initialized but chain verification failed"
                );
                // Don't fail initialization - allow graceful degradation
            }
        }

        Ok(client)
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> ChainResult<()> {
        let chain_id = self.chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(ChainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn chain_id(&self) -> ChainResult<ChainId> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_chain_id();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(ChainId(result)),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout, trying next provider");
                }
            }
        }
        Err(ChainError::Unavailable("All RPC providers failed".to_string()))
    }

    /// Get the latest block height.
    pub async fn current_height(&self) -> ChainResult<u64> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_block_number();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(ChainError::Unavailable(
            "All providers failed to get block height".to_string(),
        ))
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ChainConfig {
        ChainConfig {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 31337, // Anvil default
            rpc_timeout_secs: 5,
            confirmation_blocks: 1,
            seconds_per_block: 1,
        }
    }

    #[tokio::test]
    async fn test_client_creation() {
        // Client creation should succeed even if the RPC is unreachable
        let config = test_config();
        let result = ChainClient::new(config).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_rpc_failover_exhaustion() {
        let mut config = test_config();
        config.failover_urls.push("http://127.0.0.1:9".to_string());

        let client = ChainClient::new(config).await.unwrap();

        // Both endpoints refuse connections, so the client should iterate
        // through them and report exhaustion.
        let result = client.current_height().await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("All providers failed"));
    }

    #[tokio::test]
    async fn test_invalid_primary_url_rejected() {
        let mut config = test_config();
        config.rpc_url = "not a url".to_string();
        assert!(ChainClient::new(config).await.is_err());
    }
}
