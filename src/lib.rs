//! Time-locked media release library for Filecoin Calibration.
//!
//! A publisher seals a media reference behind a future block height; a
//! viewer session counts down locally and reconciles against the chain
//! until the decrypted reference becomes readable on-chain.

pub mod chain;
pub mod config;
pub mod countdown;
pub mod media;
pub mod observability;
pub mod records;
pub mod register;
pub mod resolve;
pub mod session;
pub mod timelock;

pub use config::schema::ReleaseConfig;
pub use records::ReleaseRecord;
pub use session::ReleaseSession;
