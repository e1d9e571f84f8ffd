//! HTTP adapter for the sealing service.

use std::time::Duration;

use alloy::primitives::Bytes;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::schema::SealerConfig;
use crate::timelock::{EncryptionError, TimelockSealer};

/// Client for an out-of-process sealing service.
pub struct RemoteSealer {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct SealRequest {
    /// ABI-encoded payload, hex-encoded on the wire.
    message: Bytes,
    block_height: u64,
}

#[derive(Debug, Deserialize)]
struct SealResponse {
    ciphertext: Bytes,
}

impl RemoteSealer {
    pub fn from_config(config: &SealerConfig) -> Result<Self, EncryptionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EncryptionError::Sealer(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint_url.clone(),
        })
    }
}

#[async_trait]
impl TimelockSealer for RemoteSealer {
    async fn seal(&self, payload: &[u8], target_block: u64) -> Result<Bytes, EncryptionError> {
        let request = SealRequest {
            message: Bytes::copy_from_slice(payload),
            block_height: target_block,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| EncryptionError::Sealer(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EncryptionError::Rejected(format!(
                "Status {}",
                response.status()
            )));
        }

        let body: SealResponse = response
            .json()
            .await
            .map_err(|e| EncryptionError::Sealer(format!("Malformed response: {}", e)))?;
        if body.ciphertext.is_empty() {
            return Err(EncryptionError::Rejected("Empty ciphertext".to_string()));
        }

        tracing::debug!(target_block, bytes = body.ciphertext.len(), "Payload sealed");
        Ok(body.ciphertext)
    }
}
