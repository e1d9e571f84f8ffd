//! Time-lock vault contract binding.
//!
//! # Responsibilities
//! - Submit sealed payloads with their unlock heights
//! - Monitor submission confirmations
//! - Read back the request ID assigned by the vault
//! - Read the decrypted payload once the vault has released it

use std::time::Duration;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use alloy::sol;
use tokio::time::{interval, timeout};

use crate::chain::types::{ChainError, ChainResult, SubmittedRequest};
use crate::chain::wallet::Wallet;
use crate::config::schema::{ChainConfig, VaultConfig};

sol! {
    #[sol(rpc)]
    contract TimelockVault {
        /// Stores a sealed payload to be released at the given block height.
        function createTimelockRequest(uint256 blockHeight, bytes calldata ciphertext) external returns (uint256);

        /// Returns the most recent request ID created by a user.
        function userRequestId(address user) external view returns (uint256);

        /// Returns the decrypted payload for a request, or the empty
        /// string while the unlock height has not been reached.
        function userMessage(uint256 requestId) external view returns (string memory);
    }
}

/// Interval between receipt polls while waiting for confirmation.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Client for the time-lock vault contract.
pub struct VaultRegistry {
    instance: TimelockVault::TimelockVaultInstance<DynProvider>,
    signer_address: Option<Address>,
    rpc_timeout: Duration,
    submit_timeout: Duration,
    confirmation_blocks: u32,
}

impl VaultRegistry {
    /// Connect to the vault contract.
    ///
    /// A wallet is required for submissions; read-only viewers may pass
    /// `None` and still query request state.
    pub fn connect(
        chain: &ChainConfig,
        vault: &VaultConfig,
        wallet: Option<&Wallet>,
    ) -> ChainResult<Self> {
        let contract_address: Address = vault.contract_address.parse().map_err(|e| {
            ChainError::Unavailable(format!(
                "Invalid vault address '{}': {}",
                vault.contract_address, e
            ))
        })?;
        let rpc_url: url::Url = chain.rpc_url.parse().map_err(|e| {
            ChainError::Unavailable(format!("Invalid RPC URL '{}': {}", chain.rpc_url, e))
        })?;

        let provider = match wallet {
            Some(w) => ProviderBuilder::new()
                .wallet(EthereumWallet::from(w.signer().clone()))
                .connect_http(rpc_url)
                .erased(),
            None => ProviderBuilder::new().connect_http(rpc_url).erased(),
        };

        Ok(Self {
            instance: TimelockVault::new(contract_address, provider),
            signer_address: wallet.map(|w| w.address()),
            rpc_timeout: Duration::from_secs(chain.rpc_timeout_secs),
            submit_timeout: Duration::from_secs(vault.submit_timeout_secs),
            confirmation_blocks: chain.confirmation_blocks,
        })
    }

    /// Submit a sealed payload and wait until the transaction confirms.
    ///
    /// Returns the vault-assigned request ID together with the
    /// transaction hash of the confirmed submission.
    pub async fn create_request(
        &self,
        target_block: u64,
        ciphertext: Bytes,
    ) -> ChainResult<SubmittedRequest> {
        let from = self
            .signer_address
            .ok_or_else(|| ChainError::Wallet("No signing key configured".to_string()))?;

        let call = self
            .instance
            .createTimelockRequest(U256::from(target_block), ciphertext);
        let send_fut = call.send();
        let pending = match timeout(self.rpc_timeout, send_fut).await {
            Ok(Ok(pending)) => pending,
            Ok(Err(e)) => {
                return Err(ChainError::Unavailable(format!("Submission failed: {}", e)))
            }
            Err(_) => return Err(ChainError::Timeout(self.rpc_timeout.as_secs())),
        };
        let tx_hash = *pending.tx_hash();
        tracing::info!(tx = %tx_hash, target_block, "Time-lock request submitted");

        let receipt = self.wait_for_confirmation(tx_hash).await?;
        tracing::info!(
            tx = %tx_hash,
            block = receipt.block_number.unwrap_or_default(),
            "Time-lock request confirmed"
        );

        let request_id = self.request_id_for(from).await?;
        Ok(SubmittedRequest { request_id, tx_hash })
    }

    /// Read the most recent request ID the vault assigned to a user.
    pub async fn request_id_for(&self, user: Address) -> ChainResult<U256> {
        let call = self.instance.userRequestId(user);
        let fut = call.call();
        match timeout(self.rpc_timeout, fut).await {
            Ok(Ok(id)) => Ok(id),
            Ok(Err(e)) => Err(ChainError::Unavailable(format!(
                "Request ID read failed: {}",
                e
            ))),
            Err(_) => Err(ChainError::Timeout(self.rpc_timeout.as_secs())),
        }
    }

    /// Read the decrypted payload for a request.
    ///
    /// The vault reports an empty string until its unlock height has
    /// been reached; that case is surfaced as `None`.
    pub async fn decrypted_message(&self, request_id: U256) -> ChainResult<Option<String>> {
        let call = self.instance.userMessage(request_id);
        let fut = call.call();
        match timeout(self.rpc_timeout, fut).await {
            Ok(Ok(message)) if message.is_empty() => Ok(None),
            Ok(Ok(message)) => Ok(Some(message)),
            Ok(Err(e)) => Err(ChainError::Unavailable(format!(
                "Payload read failed: {}",
                e
            ))),
            Err(_) => Err(ChainError::Timeout(self.rpc_timeout.as_secs())),
        }
    }

    /// Wait for a submission to reach the configured confirmation depth.
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> ChainResult<TransactionReceipt> {
        let required = self.confirmation_blocks.max(1) as u64;

        let result = timeout(self.submit_timeout, async {
            let mut ticker = interval(RECEIPT_POLL_INTERVAL);

            loop {
                ticker.tick().await;

                let receipt = match self.instance.provider().get_transaction_receipt(tx_hash).await
                {
                    Ok(Some(r)) => r,
                    Ok(None) => {
                        tracing::debug!(tx = %tx_hash, "Submission pending");
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!(tx = %tx_hash, error = %e, "Receipt query failed");
                        continue;
                    }
                };

                if !receipt.status() {
                    return Err(ChainError::Reverted(tx_hash.to_string()));
                }

                let current_block = match self.instance.provider().get_block_number().await {
                    Ok(n) => n,
                    Err(e) => {
                        tracing::warn!(tx = %tx_hash, error = %e, "Height query failed");
                        continue;
                    }
                };
                let tx_block = receipt.block_number.unwrap_or(current_block);
                // Inclusion counts as the first confirmation.
                let confirmations = current_block.saturating_sub(tx_block) + 1;

                if confirmations >= required {
                    return Ok(receipt);
                }

                tracing::debug!(
                    tx = %tx_hash,
                    confirmations,
                    required,
                    "Waiting for confirmations"
                );
            }
        })
        .await;

        match result {
            Ok(receipt) => receipt,
            Err(_) => Err(ChainError::ConfirmationTimeout(self.submit_timeout.as_secs())),
        }
    }
}

impl std::fmt::Debug for VaultRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultRegistry")
            .field("contract", self.instance.address())
            .field("signer", &self.signer_address)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ChainConfig, VaultConfig};

    #[test]
    fn test_connect_rejects_bad_address() {
        let chain = ChainConfig::default();
        let vault = VaultConfig {
            contract_address: "garbage".to_string(),
            ..VaultConfig::default()
        };
        let result = VaultRegistry::connect(&chain, &vault, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid vault address"));
    }

    #[tokio::test]
    async fn test_submission_requires_wallet() {
        let registry =
            VaultRegistry::connect(&ChainConfig::default(), &VaultConfig::default(), None).unwrap();
        let err = registry
            .create_request(100, Bytes::from(vec![1u8, 2, 3]))
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::Wallet(_)));
    }
}
