//! Countdown projection subsystem.
//!
//! # Data Flow
//! ```text
//! height poll → blocks remaining
//!     → projector.rs (blocks → seconds → display units)
//!     → state.rs (re-anchor, then local 1s ticks until next poll)
//!     → session snapshot
//! ```

pub mod projector;
pub mod state;

pub use projector::{decompose, project, TimeParts};
pub use state::{ChangedUnits, CountdownState};
