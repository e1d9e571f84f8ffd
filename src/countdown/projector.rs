//! Block-to-time projection.
//!
//! The chain does not expose wall-clock unlock times, only heights.
//! The projector turns a block distance into an estimated duration
//! using the network's average block interval, and splits durations
//! into display units.

use serde::Serialize;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_DAY: u64 = 86_400;

/// A duration split into calendar display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TimeParts {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeParts {
    /// Total seconds represented by these parts.
    pub fn total_seconds(&self) -> u64 {
        self.days * SECONDS_PER_DAY
            + self.hours * SECONDS_PER_HOUR
            + self.minutes * SECONDS_PER_MINUTE
            + self.seconds
    }
}

/// Estimated seconds until a block `blocks_remaining` ahead is mined.
///
/// Negative distances (the height already passed) clamp to zero.
pub fn project(blocks_remaining: i64, seconds_per_block: u64) -> u64 {
    u64::try_from(blocks_remaining.max(0))
        .unwrap_or(0)
        .saturating_mul(seconds_per_block)
}

/// Split a duration in seconds into days, hours, minutes and seconds.
pub fn decompose(total_seconds: u64) -> TimeParts {
    TimeParts {
        days: total_seconds / SECONDS_PER_DAY,
        hours: (total_seconds % SECONDS_PER_DAY) / SECONDS_PER_HOUR,
        minutes: (total_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE,
        seconds: total_seconds % SECONDS_PER_MINUTE,
    }
}
