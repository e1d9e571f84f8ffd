//! Viewer session subsystem.
//!
//! # Data Flow
//! ```text
//! release record
//!     → coordinator.rs (one task: display tick + height polls)
//!         → countdown re-anchored on every poll
//!         → lifecycle advanced on observed heights
//!         → vault reads spawned once the unlock height passes
//!     → snapshot.rs (immutable per-tick view, published via watch)
//! ```
//!
//! All mutation happens inside the coordinator loop. Spawned fetches
//! report back over channels; once a session is torn down those
//! channels are gone and late results change nothing.

use tokio::sync::broadcast;

pub mod coordinator;
pub mod snapshot;

pub use coordinator::{ReleaseSession, SessionHandle, SessionTiming};
pub use snapshot::ReleaseSnapshot;

/// Teardown coordination for a viewer session.
///
/// Provides a broadcast channel the coordinator loop subscribes to.
pub struct Teardown {
    tx: broadcast::Sender<()>,
}

impl Teardown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the teardown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the teardown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Teardown {
    fn default() -> Self {
        Self::new()
    }
}
