//! Countdown state reconciling two clocks.
//!
//! The display advances on a local one-second tick; the truth arrives
//! in coarse steps whenever a height poll lands. A poll re-anchors the
//! remaining time wholesale and any local drift since the previous
//! anchor is discarded. Between polls the local tick keeps the display
//! moving smoothly.

use serde::Serialize;

use crate::countdown::projector::{decompose, project, TimeParts};

/// Which display units changed in the latest mutation.
///
/// A unit counts as changed only when its previous value was nonzero,
/// so freshly seeded displays come up without every digit flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ChangedUnits {
    pub days: bool,
    pub hours: bool,
    pub minutes: bool,
    pub seconds: bool,
}

impl ChangedUnits {
    pub fn any(&self) -> bool {
        self.days || self.hours || self.minutes || self.seconds
    }
}

/// Remaining time as the viewer sees it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountdownState {
    seconds_remaining: u64,
    parts: TimeParts,
    changed: ChangedUnits,
}

impl CountdownState {
    /// A zeroed countdown awaiting its first anchor.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seconds_remaining(&self) -> u64 {
        self.seconds_remaining
    }

    pub fn parts(&self) -> TimeParts {
        self.parts
    }

    pub fn changed(&self) -> ChangedUnits {
        self.changed
    }

    /// Whether the countdown has reached zero.
    pub fn is_elapsed(&self) -> bool {
        self.seconds_remaining == 0
    }

    /// Advance the local clock by one second, saturating at zero.
    pub fn tick(&mut self) {
        self.apply(self.seconds_remaining.saturating_sub(1));
    }

    /// Re-anchor to an authoritative block distance, discarding any
    /// local drift accumulated since the previous anchor.
    pub fn reanchor(&mut self, blocks_remaining: i64, seconds_per_block: u64) {
        self.apply(project(blocks_remaining, seconds_per_block));
    }

    fn apply(&mut self, seconds: u64) {
        let previous = self.parts;
        self.seconds_remaining = seconds;
        self.parts = decompose(seconds);
        self.changed = ChangedUnits {
            days: previous.days != self.parts.days && previous.days != 0,
            hours: previous.hours != self.parts.hours && previous.hours != 0,
            minutes: previous.minutes != self.parts.minutes && previous.minutes != 0,
            seconds: previous.seconds != self.parts.seconds && previous.seconds != 0,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_seed_flags_nothing() {
        let mut state = CountdownState::new();
        state.reanchor(10, 30);
        assert_eq!(state.seconds_remaining(), 300);
        assert_eq!(
            state.parts(),
            TimeParts { days: 0, hours: 0, minutes: 5, seconds: 0 }
        );
        assert!(!state.changed().any());
    }

    #[test]
    fn test_tick_counts_down_and_saturates() {
        let mut state = CountdownState::new();
        state.reanchor(0, 30);
        assert!(state.is_elapsed());

        state.tick();
        assert_eq!(state.seconds_remaining(), 0);

        state.reanchor(1, 3);
        for _ in 0..5 {
            state.tick();
        }
        assert!(state.is_elapsed());
    }

    #[test]
    fn test_reanchor_discards_local_drift() {
        let mut state = CountdownState::new();
        state.reanchor(10, 30);
        state.tick();
        state.tick();
        state.tick();
        assert_eq!(state.seconds_remaining(), 297);

        // The next poll observes one block mined. Authoritative time is
        // 270s regardless of how far the local clock wandered.
        state.reanchor(9, 30);
        assert_eq!(state.seconds_remaining(), 270);
    }

    #[test]
    fn test_reanchor_clamps_passed_heights() {
        let mut state = CountdownState::new();
        state.reanchor(5, 30);
        state.reanchor(-3, 30);
        assert!(state.is_elapsed());
    }

    #[test]
    fn test_changed_units_track_rollover() {
        let mut state = CountdownState::new();
        state.reanchor(2, 30); // 60s = 1m 0s
        state.tick(); // 59s = 0m 59s

        let changed = state.changed();
        // Minutes rolled 1 -> 0 from a nonzero value.
        assert!(changed.minutes);
        // Seconds moved 0 -> 59, but a unit leaving zero is not a change.
        assert!(!changed.seconds);
        assert!(!changed.hours);
        assert!(!changed.days);
    }

    #[test]
    fn test_steady_tick_flags_seconds_only() {
        let mut state = CountdownState::new();
        state.reanchor(10, 30); // 5m 0s
        state.tick(); // 4m 59s: minutes 5->4 changed, seconds 0->59 not
        state.tick(); // 4m 58s: seconds 59->58 changed

        let changed = state.changed();
        assert!(changed.seconds);
        assert!(!changed.minutes);
    }
}
