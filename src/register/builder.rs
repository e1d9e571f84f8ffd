//! Time-lock request builder.

use std::sync::Arc;

use alloy::sol_types::SolValue;

use crate::chain::LedgerGateway;
use crate::media::ContentStore;
use crate::observability::metrics;
use crate::records::{RecordStore, ReleaseRecord};
use crate::register::{RegisterError, ReleaseMeta};
use crate::timelock::{EncryptionError, TimelockSealer};

/// Drives the registration pipeline from media bytes to a persisted
/// release record.
pub struct RequestBuilder {
    content: Arc<dyn ContentStore>,
    sealer: Arc<dyn TimelockSealer>,
    gateway: Arc<dyn LedgerGateway>,
    store: Arc<dyn RecordStore>,
    explorer_base: String,
}

impl RequestBuilder {
    pub fn new(
        content: Arc<dyn ContentStore>,
        sealer: Arc<dyn TimelockSealer>,
        gateway: Arc<dyn LedgerGateway>,
        store: Arc<dyn RecordStore>,
        explorer_base: impl Into<String>,
    ) -> Self {
        Self {
            content,
            sealer,
            gateway,
            store,
            explorer_base: explorer_base.into(),
        }
    }

    /// Register a release: upload, seal and submit the media, then
    /// persist the resulting record.
    ///
    /// The pipeline aborts on the first failure. A failure after the
    /// upload leaves the uploaded content unreferenced but persists
    /// nothing locally.
    pub async fn register(
        &self,
        id: String,
        payload: Vec<u8>,
        filename: &str,
        meta: ReleaseMeta,
        target_block: u64,
    ) -> Result<ReleaseRecord, RegisterError> {
        let media = self.content.upload(payload, filename).await?;
        let encoded = encode_reference(&media.url);

        let current = self
            .gateway
            .current_height()
            .await
            .map_err(RegisterError::Ledger)?;
        if target_block <= current {
            metrics::record_registration("rejected");
            return Err(EncryptionError::TargetNotInFuture {
                target: target_block,
                current,
            }
            .into());
        }

        let ciphertext = self.sealer.seal(&encoded, target_block).await?;

        let submitted = self
            .gateway
            .submit_request(target_block, ciphertext)
            .await
            .map_err(|e| {
                metrics::record_registration("failed");
                RegisterError::Submission(e)
            })?;

        let record = ReleaseRecord {
            id,
            title: meta.title,
            description: meta.description,
            media_type: meta.media_type,
            rights: meta.rights,
            created_at: meta.created_at,
            target_block,
            request_id: submitted.request_id,
            tx_hash: submitted.tx_hash.to_string(),
            explorer_url: explorer_url(&self.explorer_base, &submitted.tx_hash.to_string()),
            decrypted_media_url: None,
        };
        self.store.put(record.clone())?;

        metrics::record_registration("ok");
        tracing::info!(
            record_id = %record.id,
            request_id = %record.request_id,
            target_block,
            cid = %media.cid,
            "Release registered"
        );

        Ok(record)
    }
}

/// ABI-encode a media URL the way the vault expects its payloads: a
/// single Solidity `string` value.
pub fn encode_reference(media_url: &str) -> Vec<u8> {
    media_url.to_string().abi_encode()
}

/// Block explorer link for a submission transaction.
pub fn explorer_url(base: &str, tx_hash: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), tx_hash)
}
