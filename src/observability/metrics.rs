//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define release engine metrics (polls, resolutions, registrations)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `blockdrop_chain_polls_total` (counter): height polls by outcome
//! - `blockdrop_resolves_total` (counter): vault reads by outcome
//! - `blockdrop_registrations_total` (counter): registrations by outcome
//! - `blockdrop_uploads_total` (counter): media uploads by outcome
//! - `blockdrop_sessions_active` (gauge): currently running sessions
//! - `blockdrop_release_records` (gauge): records in the store
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Outcome labels instead of separate success/failure metrics

use std::net::SocketAddr;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter and register metric descriptions.
///
/// Must run inside a Tokio runtime; the exporter serves scrapes on its
/// own task.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics exporter");
            return;
        }
    }

    describe_counter!(
        "blockdrop_chain_polls_total",
        "Ledger height polls by outcome"
    );
    describe_counter!("blockdrop_resolves_total", "Vault reads by outcome");
    describe_counter!(
        "blockdrop_registrations_total",
        "Release registrations by outcome"
    );
    describe_counter!("blockdrop_uploads_total", "Media uploads by outcome");
    describe_gauge!("blockdrop_sessions_active", "Currently running viewer sessions");
    describe_gauge!("blockdrop_release_records", "Records in the release store");
}

/// Record the outcome of a ledger height poll.
pub fn record_chain_poll(outcome: &'static str) {
    counter!("blockdrop_chain_polls_total", "outcome" => outcome).increment(1);
}

/// Record the outcome of a vault read.
pub fn record_resolve(outcome: &'static str) {
    counter!("blockdrop_resolves_total", "outcome" => outcome).increment(1);
}

/// Record the outcome of a registration.
pub fn record_registration(outcome: &'static str) {
    counter!("blockdrop_registrations_total", "outcome" => outcome).increment(1);
}

/// Record the outcome of a media upload.
pub fn record_upload(outcome: &'static str) {
    counter!("blockdrop_uploads_total", "outcome" => outcome).increment(1);
}

/// Track the number of records held by the store.
pub fn record_store_size(count: usize) {
    gauge!("blockdrop_release_records").set(count as f64);
}

pub fn session_started() {
    gauge!("blockdrop_sessions_active").increment(1.0);
}

pub fn session_ended() {
    gauge!("blockdrop_sessions_active").decrement(1.0);
}
