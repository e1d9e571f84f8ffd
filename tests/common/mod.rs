//! Shared scripted collaborators for the integration tests.
//!
//! Every external surface the library talks to (RPC node, vault contract,
//! storage API, sealer sidecar) is replaced by an in-process fake whose
//! behavior the tests flip at runtime through atomics.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use alloy::primitives::{Bytes, TxHash, U256};
use async_trait::async_trait;

use blockdrop::chain::{ChainError, ChainResult, LedgerGateway, SubmittedRequest};
use blockdrop::media::{ContentStore, MediaReference, UploadError};
use blockdrop::records::{ReleaseRecord, RightsClass};
use blockdrop::register::ReleaseMeta;
use blockdrop::timelock::{EncryptionError, TimelockSealer};

pub const FAKE_REQUEST_ID: u64 = 7;
pub const FAKE_CID: &str = "QmTestCid1234";
pub const FAKE_MEDIA_URL: &str = "https://gateway.test/ipfs/QmTestCid1234";

/// Scripted ledger standing in for the RPC node plus the vault contract.
pub struct FakeLedger {
    height: AtomicU64,
    message: Mutex<Option<String>>,
    height_calls: AtomicU64,
    resolve_calls: AtomicU64,
    submit_calls: AtomicU64,
    /// Height polls beyond this count fail with `ChainError::Unavailable`.
    fail_heights_after: AtomicU64,
    fail_submissions: AtomicBool,
    resolve_delay: Mutex<Duration>,
    last_submission: Mutex<Option<(u64, Bytes)>>,
}

impl FakeLedger {
    pub fn new(height: u64) -> Self {
        Self {
            height: AtomicU64::new(height),
            message: Mutex::new(None),
            height_calls: AtomicU64::new(0),
            resolve_calls: AtomicU64::new(0),
            submit_calls: AtomicU64::new(0),
            fail_heights_after: AtomicU64::new(u64::MAX),
            fail_submissions: AtomicBool::new(false),
            resolve_delay: Mutex::new(Duration::ZERO),
            last_submission: Mutex::new(None),
        }
    }

    pub fn set_height(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }

    pub fn set_message(&self, url: &str) {
        *self.message.lock().unwrap() = Some(url.to_string());
    }

    /// Let the first `count` height polls succeed, then fail the rest.
    pub fn fail_heights_after(&self, count: u64) {
        self.fail_heights_after.store(count, Ordering::SeqCst);
    }

    pub fn fail_submissions(&self) {
        self.fail_submissions.store(true, Ordering::SeqCst);
    }

    /// Delay every resolve call, keeping it in flight while a test tears
    /// the session down.
    pub fn set_resolve_delay(&self, delay: Duration) {
        *self.resolve_delay.lock().unwrap() = delay;
    }

    pub fn height_calls(&self) -> u64 {
        self.height_calls.load(Ordering::SeqCst)
    }

    pub fn resolve_calls(&self) -> u64 {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> u64 {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn last_submission(&self) -> Option<(u64, Bytes)> {
        self.last_submission.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerGateway for FakeLedger {
    async fn current_height(&self) -> ChainResult<u64> {
        let calls = self.height_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if calls > self.fail_heights_after.load(Ordering::SeqCst) {
            return Err(ChainError::Unavailable("injected height failure".to_string()));
        }
        Ok(self.height.load(Ordering::SeqCst))
    }

    async fn submit_request(&self, target_block: u64, ciphertext: Bytes) -> ChainResult<SubmittedRequest> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_submissions.load(Ordering::SeqCst) {
            return Err(ChainError::Unavailable("injected submission failure".to_string()));
        }
        *self.last_submission.lock().unwrap() = Some((target_block, ciphertext));
        Ok(SubmittedRequest {
            request_id: U256::from(FAKE_REQUEST_ID),
            tx_hash: TxHash::ZERO,
        })
    }

    async fn decrypted_media(&self, _request_id: U256) -> ChainResult<Option<String>> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.resolve_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(self.message.lock().unwrap().clone())
    }
}

/// Content store that hands back a fixed CID without touching the network.
pub struct FakeContentStore {
    fail: AtomicBool,
    calls: AtomicU64,
}

impl FakeContentStore {
    pub fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
            calls: AtomicU64::new(0),
        }
    }

    pub fn fail_uploads(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for FakeContentStore {
    async fn upload(&self, _bytes: Vec<u8>, _filename: &str) -> Result<MediaReference, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(UploadError::Status(500));
        }
        Ok(MediaReference {
            cid: FAKE_CID.to_string(),
            url: FAKE_MEDIA_URL.to_string(),
        })
    }
}

/// Sealer that passes the payload through unchanged and records it.
pub struct FakeSealer {
    fail: AtomicBool,
    calls: AtomicU64,
    last_payload: Mutex<Option<Vec<u8>>>,
}

impl FakeSealer {
    pub fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
            calls: AtomicU64::new(0),
            last_payload: Mutex::new(None),
        }
    }

    pub fn fail_sealing(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_payload(&self) -> Option<Vec<u8>> {
        self.last_payload.lock().unwrap().clone()
    }
}

#[async_trait]
impl TimelockSealer for FakeSealer {
    async fn seal(&self, payload: &[u8], _target_block: u64) -> Result<Bytes, EncryptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(EncryptionError::Rejected("injected sealer failure".to_string()));
        }
        *self.last_payload.lock().unwrap() = Some(payload.to_vec());
        Ok(Bytes::from(payload.to_vec()))
    }
}

/// A record as it looks right after registration, before any decryption.
pub fn sample_record(id: &str, target_block: u64) -> ReleaseRecord {
    ReleaseRecord {
        id: id.to_string(),
        title: "Test Drop".to_string(),
        description: "An unreleased track".to_string(),
        media_type: "audio/mpeg".to_string(),
        rights: RightsClass::NonExclusive,
        created_at: "2026-08-22".to_string(),
        target_block,
        request_id: U256::from(FAKE_REQUEST_ID),
        tx_hash: TxHash::ZERO.to_string(),
        explorer_url: format!("https://calibration.filfox.info/en/message/{}", TxHash::ZERO),
        decrypted_media_url: None,
    }
}

pub fn sample_meta() -> ReleaseMeta {
    ReleaseMeta {
        title: "Test Drop".to_string(),
        description: "An unreleased track".to_string(),
        media_type: "audio/mpeg".to_string(),
        rights: RightsClass::NonExclusive,
        created_at: "2026-08-22".to_string(),
    }
}
