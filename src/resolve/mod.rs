//! Release resolution subsystem.
//!
//! Once the chain reaches a release's unlock height the vault can hand
//! out the decrypted media reference, but with some lag: the key
//! material propagates a few blocks behind the height itself. The
//! lifecycle state machine tracks where a viewer session stands in
//! that progression, and the resolver performs the actual vault reads.

use std::sync::Arc;

use alloy::primitives::U256;
use serde::Serialize;
use thiserror::Error;

use crate::chain::{ChainError, LedgerGateway};
use crate::records::{RecordStore, ReleaseRecord, StoreError};

/// Errors raised while resolving a release.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The unlock height passed but the vault has not released the
    /// payload yet. Retryable.
    #[error("Decryption key not yet available")]
    NotYetAvailable,

    /// The vault could not be read.
    #[error("Ledger unavailable: {0}")]
    Ledger(#[from] ChainError),
}

/// Where a viewer session stands between sealed and revealed.
///
/// Transitions only move forward, except that a failed resolution
/// falls back from `Resolving` to `ConditionMet` to be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// The chain has not reached the unlock height.
    Locked,
    /// The unlock height has been observed on-chain.
    ConditionMet,
    /// A vault read is in flight.
    Resolving,
    /// The decrypted media reference is known and persisted.
    Decrypted,
}

impl Lifecycle {
    /// Fold a height observation into the state machine.
    ///
    /// Returns true only on the single observation that crosses from
    /// `Locked` to `ConditionMet`; repeated observations of a met
    /// condition change nothing.
    pub fn observe_condition(&mut self, condition_met: bool) -> bool {
        if condition_met && *self == Lifecycle::Locked {
            *self = Lifecycle::ConditionMet;
            return true;
        }
        false
    }

    /// Claim the pending resolution slot.
    ///
    /// Returns true if the caller should start a vault read; a read
    /// already in flight or a terminal state declines.
    pub fn begin_resolve(&mut self) -> bool {
        if *self == Lifecycle::ConditionMet {
            *self = Lifecycle::Resolving;
            return true;
        }
        false
    }

    /// A vault read failed or came back empty; fall back to retry.
    pub fn resolve_failed(&mut self) {
        if *self == Lifecycle::Resolving {
            *self = Lifecycle::ConditionMet;
        }
    }

    /// A vault read produced the decrypted reference.
    pub fn resolve_succeeded(&mut self) {
        if *self == Lifecycle::Resolving {
            *self = Lifecycle::Decrypted;
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Lifecycle::Decrypted
    }
}

/// Reads decrypted media references from the vault and commits them
/// to the record store.
///
/// Fetching and committing are split so a fetch can run on a spawned
/// task while the store write stays with the session that owns the
/// record.
#[derive(Clone)]
pub struct DecryptionResolver {
    gateway: Arc<dyn LedgerGateway>,
    store: Arc<dyn RecordStore>,
}

impl DecryptionResolver {
    pub fn new(gateway: Arc<dyn LedgerGateway>, store: Arc<dyn RecordStore>) -> Self {
        Self { gateway, store }
    }

    /// Ask the vault for the decrypted media reference.
    pub async fn fetch(&self, request_id: U256) -> Result<String, ResolveError> {
        match self.gateway.decrypted_media(request_id).await? {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(ResolveError::NotYetAvailable),
        }
    }

    /// Persist a resolved media reference on its record.
    pub fn commit(&self, record_id: &str, url: &str) -> Result<ReleaseRecord, StoreError> {
        self.store.update_decrypted(record_id, url)
    }
}
