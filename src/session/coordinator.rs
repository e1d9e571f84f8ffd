//! Release session coordinator.
//!
//! # Responsibilities
//! - Drive the local display tick and the height poll from one loop
//! - Re-anchor the countdown whenever an authoritative height lands
//! - Advance the lifecycle and launch vault reads past the unlock height
//! - Publish immutable snapshots for renderers
//!
//! # Design Decisions
//! - Session state is owned by the loop; nothing else mutates it
//! - Ledger calls run on spawned tasks reporting over channels, so a
//!   slow RPC can never stall the display tick
//! - A failed poll keeps the last observed height; the display keeps
//!   counting locally until the ledger recovers

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};

use crate::chain::{ChainResult, LedgerGateway};
use crate::config::schema::ReleaseConfig;
use crate::countdown::CountdownState;
use crate::observability::metrics;
use crate::records::{RecordStore, ReleaseRecord};
use crate::resolve::{DecryptionResolver, Lifecycle, ResolveError};
use crate::session::snapshot::ReleaseSnapshot;
use crate::session::Teardown;

/// Timing knobs for a viewer session.
#[derive(Debug, Clone, Copy)]
pub struct SessionTiming {
    /// Local countdown tick interval.
    pub display_tick: Duration,
    /// Height polling interval.
    pub poll_interval: Duration,
    /// Average block production interval in seconds.
    pub seconds_per_block: u64,
}

impl SessionTiming {
    pub fn from_config(config: &ReleaseConfig) -> Self {
        Self {
            display_tick: Duration::from_millis(config.session.display_tick_ms),
            poll_interval: Duration::from_secs(config.session.poll_interval_secs),
            seconds_per_block: config.chain.seconds_per_block,
        }
    }
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            display_tick: Duration::from_millis(1_000),
            poll_interval: Duration::from_secs(10),
            seconds_per_block: 30,
        }
    }
}

/// Handle to a running viewer session.
pub struct SessionHandle {
    snapshots: watch::Receiver<ReleaseSnapshot>,
    teardown: Teardown,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Subscribe to session snapshots.
    pub fn snapshots(&self) -> watch::Receiver<ReleaseSnapshot> {
        self.snapshots.clone()
    }

    /// Tear the session down. In-flight ledger calls are abandoned and
    /// their late results discarded.
    pub fn stop(&self) {
        self.teardown.trigger();
    }

    /// Whether the session loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the session loop to exit.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

/// Drives one release from its sealed record to resolution.
pub struct ReleaseSession {
    record: ReleaseRecord,
    gateway: Arc<dyn LedgerGateway>,
    resolver: DecryptionResolver,
    timing: SessionTiming,
    countdown: CountdownState,
    lifecycle: Lifecycle,
    current_block: Option<u64>,
    snapshot_tx: watch::Sender<ReleaseSnapshot>,
}

impl ReleaseSession {
    /// Start a viewer session for a record.
    ///
    /// The session runs until the release resolves or the handle tears
    /// it down. A record that already carries its decrypted URL
    /// completes immediately.
    pub fn spawn(
        record: ReleaseRecord,
        gateway: Arc<dyn LedgerGateway>,
        store: Arc<dyn RecordStore>,
        timing: SessionTiming,
    ) -> SessionHandle {
        let lifecycle = if record.is_decrypted() {
            Lifecycle::Decrypted
        } else {
            Lifecycle::Locked
        };
        let resolver = DecryptionResolver::new(gateway.clone(), store);
        let countdown = CountdownState::new();

        let (snapshot_tx, snapshots) =
            watch::channel(build_snapshot(&record, lifecycle, &countdown, None));
        let teardown = Teardown::new();
        let teardown_rx = teardown.subscribe();

        let session = Self {
            record,
            gateway,
            resolver,
            timing,
            countdown,
            lifecycle,
            current_block: None,
            snapshot_tx,
        };
        let task = tokio::spawn(session.run(teardown_rx));

        SessionHandle {
            snapshots,
            teardown,
            task,
        }
    }

    async fn run(mut self, mut teardown: broadcast::Receiver<()>) {
        metrics::session_started();
        tracing::info!(
            record_id = %self.record.id,
            target_block = self.record.target_block,
            "Viewer session started"
        );

        if self.lifecycle.is_terminal() {
            tracing::info!(record_id = %self.record.id, "Release already resolved");
            metrics::session_ended();
            return;
        }

        let (height_tx, mut height_rx) = mpsc::unbounded_channel::<ChainResult<u64>>();
        let (resolve_tx, mut resolve_rx) =
            mpsc::unbounded_channel::<Result<String, ResolveError>>();
        let mut height_inflight = false;

        let mut display = interval_at(
            Instant::now() + self.timing.display_tick,
            self.timing.display_tick,
        );
        display.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // First poll fires immediately and seeds the countdown.
        let mut poll = interval(self.timing.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = display.tick() => {
                    self.countdown.tick();
                    self.publish();
                }
                _ = poll.tick() => {
                    if !height_inflight {
                        height_inflight = true;
                        let gateway = self.gateway.clone();
                        let tx = height_tx.clone();
                        tokio::spawn(async move {
                            let _ = tx.send(gateway.current_height().await);
                        });
                    }
                }
                Some(result) = height_rx.recv() => {
                    height_inflight = false;
                    match result {
                        Ok(height) => {
                            metrics::record_chain_poll("ok");
                            self.on_height(height, &resolve_tx);
                            self.publish();
                        }
                        Err(e) => {
                            metrics::record_chain_poll("error");
                            tracing::warn!(
                                record_id = %self.record.id,
                                error = %e,
                                "Height poll failed, keeping last height"
                            );
                        }
                    }
                }
                Some(result) = resolve_rx.recv() => {
                    self.on_resolved(result);
                    self.publish();
                    if self.lifecycle.is_terminal() {
                        break;
                    }
                }
                _ = teardown.recv() => {
                    tracing::debug!(record_id = %self.record.id, "Viewer session torn down");
                    break;
                }
            }
        }

        metrics::session_ended();
    }

    /// Fold an observed height into countdown and lifecycle.
    fn on_height(
        &mut self,
        height: u64,
        resolve_tx: &mpsc::UnboundedSender<Result<String, ResolveError>>,
    ) {
        self.current_block = Some(height);
        let blocks_remaining =
            i64::try_from(self.record.target_block.saturating_sub(height)).unwrap_or(i64::MAX);
        self.countdown
            .reanchor(blocks_remaining, self.timing.seconds_per_block);

        if self
            .lifecycle
            .observe_condition(height >= self.record.target_block)
        {
            tracing::info!(
                record_id = %self.record.id,
                height,
                target_block = self.record.target_block,
                "Unlock height reached"
            );
        }

        if self.lifecycle.begin_resolve() {
            metrics::record_resolve("started");
            let resolver = self.resolver.clone();
            let request_id = self.record.request_id;
            let tx = resolve_tx.clone();
            tokio::spawn(async move {
                let _ = tx.send(resolver.fetch(request_id).await);
            });
        }
    }

    fn on_resolved(&mut self, result: Result<String, ResolveError>) {
        match result {
            Ok(url) => match self.resolver.commit(&self.record.id, &url) {
                Ok(updated) => {
                    self.record = updated;
                    self.lifecycle.resolve_succeeded();
                    metrics::record_resolve("ok");
                    tracing::info!(record_id = %self.record.id, "Release resolved");
                }
                Err(e) => {
                    self.lifecycle.resolve_failed();
                    metrics::record_resolve("error");
                    tracing::error!(
                        record_id = %self.record.id,
                        error = %e,
                        "Failed to persist resolved media URL"
                    );
                }
            },
            Err(ResolveError::NotYetAvailable) => {
                self.lifecycle.resolve_failed();
                metrics::record_resolve("not_yet");
                tracing::debug!(
                    record_id = %self.record.id,
                    "Decryption key not yet available, retrying on next poll"
                );
            }
            Err(ResolveError::Ledger(e)) => {
                self.lifecycle.resolve_failed();
                metrics::record_resolve("error");
                tracing::warn!(record_id = %self.record.id, error = %e, "Vault read failed");
            }
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(build_snapshot(
            &self.record,
            self.lifecycle,
            &self.countdown,
            self.current_block,
        ));
    }
}

fn build_snapshot(
    record: &ReleaseRecord,
    lifecycle: Lifecycle,
    countdown: &CountdownState,
    current_block: Option<u64>,
) -> ReleaseSnapshot {
    ReleaseSnapshot {
        record_id: record.id.clone(),
        target_block: record.target_block,
        current_block,
        blocks_remaining: current_block
            .map(|h| record.target_block.saturating_sub(h))
            .unwrap_or(0),
        seconds_remaining: countdown.seconds_remaining(),
        parts: countdown.parts(),
        changed: countdown.changed(),
        lifecycle,
        decrypted_media_url: record.decrypted_media_url.clone(),
    }
}
