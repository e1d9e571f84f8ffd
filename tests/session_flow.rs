//! Viewer session integration tests.
//!
//! These run the real session loop against a scripted ledger, with
//! millisecond timings so each scenario settles quickly.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use blockdrop::records::{MemoryRecordStore, RecordStore};
use blockdrop::resolve::Lifecycle;
use blockdrop::session::{ReleaseSession, SessionHandle, SessionTiming};

use common::{sample_record, FakeLedger, FAKE_MEDIA_URL};

fn fast_timing(display_ms: u64, poll_ms: u64) -> SessionTiming {
    SessionTiming {
        display_tick: Duration::from_millis(display_ms),
        poll_interval: Duration::from_millis(poll_ms),
        seconds_per_block: 30,
    }
}

async fn wait_until_finished(handle: &SessionHandle) -> bool {
    for _ in 0..200 {
        if handle.is_finished() {
            return true;
        }
        sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn test_initial_poll_seeds_countdown() {
    let ledger = Arc::new(FakeLedger::new(990));
    let store = Arc::new(MemoryRecordStore::new());
    store.put(sample_record("rel-seed", 1_000)).unwrap();

    // Display tick far out so only the poll anchor shapes the state.
    let timing = fast_timing(2_000, 20);
    let handle = ReleaseSession::spawn(
        store.get("rel-seed").unwrap(),
        ledger.clone(),
        store.clone(),
        timing,
    );
    sleep(Duration::from_millis(150)).await;

    let snapshot = handle.snapshots().borrow().clone();
    assert_eq!(snapshot.current_block, Some(990));
    assert_eq!(snapshot.blocks_remaining, 10);
    assert_eq!(snapshot.seconds_remaining, 300, "10 blocks at 30s each");
    assert_eq!(snapshot.parts.days, 0);
    assert_eq!(snapshot.parts.hours, 0);
    assert_eq!(snapshot.parts.minutes, 5);
    assert_eq!(snapshot.parts.seconds, 0);
    assert_eq!(snapshot.lifecycle, Lifecycle::Locked);

    handle.stop();
    handle.join().await;
}

#[tokio::test]
async fn test_display_ticks_between_polls() {
    let ledger = Arc::new(FakeLedger::new(990));
    let store = Arc::new(MemoryRecordStore::new());
    store.put(sample_record("rel-tick", 1_000)).unwrap();

    // A single immediate poll, then the local tick carries the count.
    let timing = fast_timing(30, 3_600_000);
    let handle = ReleaseSession::spawn(
        store.get("rel-tick").unwrap(),
        ledger.clone(),
        store.clone(),
        timing,
    );
    sleep(Duration::from_millis(200)).await;

    let snapshot = handle.snapshots().borrow().clone();
    assert_eq!(ledger.height_calls(), 1, "no further polls were due");
    assert_eq!(snapshot.current_block, Some(990), "anchor height retained");
    assert!(
        snapshot.seconds_remaining < 300,
        "local tick should decrement between polls, got {}",
        snapshot.seconds_remaining
    );
    assert!(
        snapshot.seconds_remaining >= 290,
        "tick should stay close to wall time, got {}",
        snapshot.seconds_remaining
    );
    assert!(snapshot.changed.seconds, "steady ticking flags seconds");
    assert_eq!(snapshot.lifecycle, Lifecycle::Locked);

    handle.stop();
    handle.join().await;
}

#[tokio::test]
async fn test_ledger_outage_keeps_last_height() {
    let ledger = Arc::new(FakeLedger::new(990));
    ledger.fail_heights_after(1);
    let store = Arc::new(MemoryRecordStore::new());
    store.put(sample_record("rel-outage", 1_000)).unwrap();

    let timing = fast_timing(40, 25);
    let handle = ReleaseSession::spawn(
        store.get("rel-outage").unwrap(),
        ledger.clone(),
        store.clone(),
        timing,
    );
    sleep(Duration::from_millis(250)).await;

    let snapshot = handle.snapshots().borrow().clone();
    assert!(
        ledger.height_calls() >= 3,
        "polling should continue through the outage, saw {}",
        ledger.height_calls()
    );
    assert_eq!(
        snapshot.current_block,
        Some(990),
        "failed polls keep the last observed height"
    );
    assert!(
        snapshot.seconds_remaining < 300 && snapshot.seconds_remaining > 0,
        "display keeps counting through the outage, got {}",
        snapshot.seconds_remaining
    );
    assert_eq!(snapshot.lifecycle, Lifecycle::Locked);

    handle.stop();
    handle.join().await;
}

#[tokio::test]
async fn test_resolve_retries_until_key_available() {
    let ledger = Arc::new(FakeLedger::new(1_000));
    let store = Arc::new(MemoryRecordStore::new());
    store.put(sample_record("rel-retry", 1_000)).unwrap();

    let timing = fast_timing(200, 25);
    let handle = ReleaseSession::spawn(
        store.get("rel-retry").unwrap(),
        ledger.clone(),
        store.clone(),
        timing,
    );

    // The unlock height is already reached but the vault still answers
    // empty, so every poll launches one more attempt.
    sleep(Duration::from_millis(150)).await;
    assert!(
        ledger.resolve_calls() >= 2,
        "expected retries while the key is unavailable, saw {}",
        ledger.resolve_calls()
    );
    assert!(
        ledger.resolve_calls() <= ledger.height_calls(),
        "at most one resolve attempt per poll"
    );
    assert!(!handle.is_finished(), "session must keep waiting");

    let snapshot = handle.snapshots().borrow().clone();
    assert_eq!(snapshot.blocks_remaining, 0);
    assert_eq!(snapshot.seconds_remaining, 0);
    assert!(
        snapshot.lifecycle == Lifecycle::ConditionMet || snapshot.lifecycle == Lifecycle::Resolving,
        "lifecycle should sit between condition and resolution, got {:?}",
        snapshot.lifecycle
    );

    ledger.set_message(FAKE_MEDIA_URL);
    assert!(
        wait_until_finished(&handle).await,
        "session should complete once the vault answers"
    );

    let stored = store.get("rel-retry").unwrap();
    assert_eq!(stored.decrypted_media_url.as_deref(), Some(FAKE_MEDIA_URL));
    let snapshot = handle.snapshots().borrow().clone();
    assert_eq!(snapshot.lifecycle, Lifecycle::Decrypted);
    assert_eq!(snapshot.decrypted_media_url.as_deref(), Some(FAKE_MEDIA_URL));

    // A finished session launches nothing further.
    let settled = ledger.resolve_calls();
    sleep(Duration::from_millis(100)).await;
    assert_eq!(ledger.resolve_calls(), settled);
}

#[tokio::test]
async fn test_height_crossing_target_triggers_resolution() {
    let ledger = Arc::new(FakeLedger::new(995));
    let store = Arc::new(MemoryRecordStore::new());
    store.put(sample_record("rel-cross", 1_000)).unwrap();

    let timing = fast_timing(200, 25);
    let handle = ReleaseSession::spawn(
        store.get("rel-cross").unwrap(),
        ledger.clone(),
        store.clone(),
        timing,
    );
    sleep(Duration::from_millis(80)).await;

    let snapshot = handle.snapshots().borrow().clone();
    assert_eq!(snapshot.lifecycle, Lifecycle::Locked);
    assert_eq!(snapshot.seconds_remaining, 150, "5 blocks at 30s each");
    assert_eq!(ledger.resolve_calls(), 0, "no attempts below the target");

    // Chain catches up and the key is ready.
    ledger.set_message(FAKE_MEDIA_URL);
    ledger.set_height(1_000);

    assert!(
        wait_until_finished(&handle).await,
        "session should resolve after the target height passes"
    );
    assert_eq!(ledger.resolve_calls(), 1, "one attempt was enough");
    let stored = store.get("rel-cross").unwrap();
    assert_eq!(stored.decrypted_media_url.as_deref(), Some(FAKE_MEDIA_URL));
}

#[tokio::test]
async fn test_teardown_abandons_inflight_resolution() {
    let ledger = Arc::new(FakeLedger::new(1_000));
    ledger.set_message(FAKE_MEDIA_URL);
    ledger.set_resolve_delay(Duration::from_millis(300));
    let store = Arc::new(MemoryRecordStore::new());
    store.put(sample_record("rel-abandon", 1_000)).unwrap();

    let timing = fast_timing(200, 20);
    let handle = ReleaseSession::spawn(
        store.get("rel-abandon").unwrap(),
        ledger.clone(),
        store.clone(),
        timing,
    );

    // The first poll launches a resolve that is still sleeping when the
    // session is torn down.
    sleep(Duration::from_millis(80)).await;
    assert_eq!(ledger.resolve_calls(), 1, "resolve should be in flight");
    handle.stop();
    handle.join().await;

    // Let the abandoned attempt complete; its result has nowhere to go.
    sleep(Duration::from_millis(350)).await;
    let stored = store.get("rel-abandon").unwrap();
    assert_eq!(
        stored.decrypted_media_url, None,
        "a torn-down session must not write the store"
    );
}

#[tokio::test]
async fn test_already_resolved_record_completes_without_polling() {
    let ledger = Arc::new(FakeLedger::new(2_000));
    let store = Arc::new(MemoryRecordStore::new());
    let mut record = sample_record("rel-done", 1_000);
    record.decrypted_media_url = Some(FAKE_MEDIA_URL.to_string());
    store.put(record.clone()).unwrap();

    let handle = ReleaseSession::spawn(record, ledger.clone(), store.clone(), fast_timing(50, 50));
    assert!(
        wait_until_finished(&handle).await,
        "resolved records complete immediately"
    );

    let snapshot = handle.snapshots().borrow().clone();
    assert_eq!(snapshot.lifecycle, Lifecycle::Decrypted);
    assert_eq!(snapshot.decrypted_media_url.as_deref(), Some(FAKE_MEDIA_URL));
    assert_eq!(ledger.height_calls(), 0, "no ledger traffic was needed");
    assert_eq!(ledger.resolve_calls(), 0);
}
