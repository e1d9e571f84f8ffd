//! Immutable per-tick view of a viewer session.

use serde::Serialize;

use crate::countdown::{ChangedUnits, TimeParts};
use crate::resolve::Lifecycle;

/// Everything a renderer needs for one frame of a release countdown.
///
/// Snapshots are cheap clones published over a watch channel; readers
/// never touch session state directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleaseSnapshot {
    /// Record this session is watching.
    pub record_id: String,
    /// Height at which the release unlocks.
    pub target_block: u64,
    /// Latest height observed on-chain, if any poll has landed.
    pub current_block: Option<u64>,
    /// Blocks left until the unlock height, zero once passed.
    pub blocks_remaining: u64,
    /// Estimated seconds left.
    pub seconds_remaining: u64,
    /// Seconds left split into display units.
    #[serde(flatten)]
    pub parts: TimeParts,
    /// Which display units changed in the latest mutation.
    pub changed: ChangedUnits,
    /// Where the session stands between sealed and revealed.
    pub lifecycle: Lifecycle,
    /// Decrypted media URL once the release has resolved.
    pub decrypted_media_url: Option<String>,
}
