use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::{mpsc, watch};

use tickerboard::error::AppError;
use tickerboard::event::AppEvent;
use tickerboard::watchlist_store::{run_listener, WatchlistListener, WatchlistStore};

fn temp_store_path(test_name: &str) -> std::path::PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be monotonic")
        .as_nanos();
    std::env::temp_dir()
        .join(format!("tb-{}-{}", test_name, ts))
        .join("watchlists.json")
}

#[test]
/// Verifies first sign-in creates an empty document exactly once.
fn ensure_user_creates_empty_document_once() {
    let store = WatchlistStore::open(&temp_store_path("ensure-user"));
    assert!(store.load("alice").unwrap().is_none());

    assert!(store.ensure_user("alice").expect("create should succeed"));
    assert!(!store.ensure_user("alice").expect("second call should succeed"));

    let doc = store.load("alice").unwrap().expect("document should exist");
    assert!(doc.watchlist.is_empty());
}

#[test]
/// Verifies array-union / array-remove semantics and persistence across
/// store handles.
fn add_and_remove_round_trip_through_file() {
    let path = temp_store_path("add-remove");
    let store = WatchlistStore::open(&path);
    store.ensure_user("bob").unwrap();

    store.add("bob", "TSLA").unwrap();
    store.add("bob", "AAPL").unwrap();
    let after_dup = store.add("bob", "TSLA").unwrap();
    assert_eq!(after_dup, vec!["TSLA".to_string(), "AAPL".to_string()]);

    let after_remove = store.remove("bob", "TSLA").unwrap();
    assert_eq!(after_remove, vec!["AAPL".to_string()]);
    assert_eq!(store.remove("bob", "MSFT").unwrap(), vec!["AAPL".to_string()]);

    let reopened = WatchlistStore::open(&path);
    let doc = reopened.load("bob").unwrap().unwrap();
    assert_eq!(doc.watchlist, vec!["AAPL".to_string()]);
}

#[test]
/// Verifies documents are keyed per user and do not leak between users.
fn users_are_isolated() {
    let store = WatchlistStore::open(&temp_store_path("isolation"));
    store.save("u1", &["GOOG".to_string()]).unwrap();
    store.save("u2", &["NVDA".to_string(), "META".to_string()]).unwrap();

    assert_eq!(store.load("u1").unwrap().unwrap().watchlist, vec!["GOOG".to_string()]);
    assert_eq!(store.load("u2").unwrap().unwrap().watchlist.len(), 2);
}

#[test]
/// Verifies updating a user without a document is a store error, not a
/// silent create.
fn update_without_document_fails() {
    let store = WatchlistStore::open(&temp_store_path("missing-doc"));
    let err = store.add("ghost", "AMD").unwrap_err();
    assert!(matches!(err, AppError::Store(_)));
    assert!(store.load("ghost").unwrap().is_none());
}

#[test]
/// Verifies a corrupt store file surfaces as a JSON error.
fn corrupt_file_is_reported() {
    let path = temp_store_path("corrupt");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{not json").unwrap();

    let store = WatchlistStore::open(&path);
    assert!(matches!(store.load("x"), Err(AppError::Json(_))));
}

#[tokio::test(start_paused = true)]
/// Verifies a second session sees writes made through another store handle:
/// the listener forwards the new watchlist and stops on shutdown.
async fn listener_forwards_writes_from_another_handle() {
    let path = temp_store_path("listener");
    let writer = WatchlistStore::open(&path);
    writer.ensure_user("carol").unwrap();

    let reader = WatchlistStore::open(&path);
    let current = reader.load("carol").unwrap();
    let listener = WatchlistListener::new(reader, "carol", current);

    let (app_tx, mut app_rx) = mpsc::channel(8);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(run_listener(
        listener,
        Duration::from_secs(1),
        app_tx,
        shutdown_rx,
    ));

    // Let the listener take its first look at the unchanged document.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(app_rx.try_recv().is_err());

    writer.add("carol", "TSLA").unwrap();
    writer.add("carol", "NVDA").unwrap();

    let event = tokio::time::timeout(Duration::from_secs(5), app_rx.recv())
        .await
        .expect("listener should report within a few polls")
        .expect("listener channel open");
    match event {
        AppEvent::WatchlistChanged(symbols) => {
            assert_eq!(symbols, vec!["TSLA".to_string(), "NVDA".to_string()]);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    writer.remove("carol", "TSLA").unwrap();
    let event = tokio::time::timeout(Duration::from_secs(5), app_rx.recv())
        .await
        .expect("listener should report the removal")
        .expect("listener channel open");
    assert!(matches!(
        event,
        AppEvent::WatchlistChanged(ref symbols) if symbols == &vec!["NVDA".to_string()]
    ));

    shutdown_tx.send(true).unwrap();
    task.await.expect("listener task should exit cleanly");
}

#[tokio::test(start_paused = true)]
/// Verifies an unreadable store is reported once, not on every poll.
async fn listener_reports_read_failure_once() {
    let path = temp_store_path("listener-corrupt");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{not json").unwrap();

    let listener = WatchlistListener::new(WatchlistStore::open(&path), "erin", None);
    let (app_tx, mut app_rx) = mpsc::channel(8);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(run_listener(
        listener,
        Duration::from_secs(1),
        app_tx,
        shutdown_rx,
    ));

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    let first = app_rx.try_recv().expect("first failure is reported");
    assert!(matches!(first, AppEvent::Error(_)));
    assert!(app_rx.try_recv().is_err());

    shutdown_tx.send(true).unwrap();
    task.await.unwrap();
}
