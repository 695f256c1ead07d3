// Tests for the save/pull engine against a recording store

use crate::support::{
    make_world, snapshot, world_archive, Call, ChannelSelector, RecordingSelector, RecordingStore,
};
use save_sync::sync::{EngineConfig, ProgressReporter, SyncEngine, SyncOutcome};
use save_sync::SyncError;
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn engine(store: Arc<RecordingStore>, saves: &Path, scratch: &Path) -> SyncEngine {
    SyncEngine::with_reporter(store, EngineConfig::new(saves, scratch), ProgressReporter::hidden())
}

#[tokio::test]
async fn test_save_all_uploads_each_world() {
    let saves = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    make_world(saves.path(), "World1", 1);
    make_world(saves.path(), "World2", 2);
    fs::write(saves.path().join("notes.txt"), b"not a world").unwrap();

    let store = Arc::new(RecordingStore::default());
    let selector = RecordingSelector::new(Some(0));
    let outcome = engine(store.clone(), saves.path(), scratch.path()).save(&selector).await.unwrap();

    assert_eq!(outcome, SyncOutcome::Completed(vec!["World1".into(), "World2".into()]));
    assert_eq!(selector.menus(), vec![vec!["All of them", "World1", "World2"]]);

    let uploads: Vec<_> = store
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Upload { key, staged } => Some((key, staged)),
            _ => None,
        })
        .collect();
    assert_eq!(uploads.len(), 2);
    for ((key, staged), expected) in uploads.iter().zip(["World1.zip", "World2.zip"]) {
        assert_eq!(key, expected);
        assert_eq!(staged.file_name().unwrap(), expected);
        assert_eq!(staged.parent().unwrap(), scratch.path());
        assert!(!staged.exists(), "staged archive should be removed after upload");
    }
    assert!(store.objects.lock().unwrap().contains_key("World2.zip"));
}

#[tokio::test]
async fn test_save_single_world() {
    let saves = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    make_world(saves.path(), "Alpha", 1);
    make_world(saves.path(), "Beta", 2);

    let store = Arc::new(RecordingStore::default());
    let outcome = engine(store.clone(), saves.path(), scratch.path())
        .save(&RecordingSelector::new(Some(2)))
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::Completed(vec!["Beta".into()]));
    let keys: Vec<_> = store.objects.lock().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["Beta.zip"]);
}

#[tokio::test]
async fn test_save_cancelled_makes_no_calls() {
    let saves = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    make_world(saves.path(), "World1", 1);

    let store = Arc::new(RecordingStore::default());
    let outcome = engine(store.clone(), saves.path(), scratch.path())
        .save(&RecordingSelector::new(None))
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::Cancelled);
    assert!(store.calls().is_empty());
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_save_missing_saves_dir_fails() {
    let scratch = tempfile::tempdir().unwrap();
    let store = Arc::new(RecordingStore::default());
    let err = engine(store, &scratch.path().join("no-saves"), scratch.path())
        .save(&RecordingSelector::new(Some(0)))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Io { .. }));
}

#[tokio::test]
async fn test_save_upload_failure_stops_and_cleans_scratch() {
    let saves = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    make_world(saves.path(), "Alpha", 1);
    make_world(saves.path(), "Beta", 2);
    make_world(saves.path(), "Gamma", 3);

    let mut store = RecordingStore::default();
    store.fail_upload = Some("Beta.zip".to_string());
    let store = Arc::new(store);

    let err = engine(store.clone(), saves.path(), scratch.path())
        .save(&RecordingSelector::new(Some(0)))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::StoreUnavailable { .. }));
    let uploaded: Vec<_> = store
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Upload { key, .. } => Some(key),
            _ => None,
        })
        .collect();
    assert_eq!(uploaded, vec!["Alpha.zip", "Beta.zip"]);
    let keys: Vec<_> = store.objects.lock().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["Alpha.zip"]);
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_save_waits_for_selection_without_blocking() {
    let saves = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    make_world(saves.path(), "World1", 1);

    let store = Arc::new(RecordingStore::default());
    let (selector, answer) = ChannelSelector::new();
    // Single-threaded runtime: the answer is only sent if selection yields
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        let _ = answer.send(Some(1));
    });

    let outcome = engine(store.clone(), saves.path(), scratch.path()).save(&selector).await.unwrap();

    assert_eq!(outcome, SyncOutcome::Completed(vec!["World1".into()]));
    assert!(store.objects.lock().unwrap().contains_key("World1.zip"));
}

#[tokio::test]
async fn test_pull_filters_and_extracts() {
    let saves = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let store = Arc::new(RecordingStore::with_objects(vec![
        ("World1.zip", world_archive("World1", 7)),
        ("notes.txt", b"hello".to_vec()),
    ]));
    let selector = RecordingSelector::new(Some(1));

    let outcome = engine(store.clone(), saves.path(), scratch.path()).pull(&selector).await.unwrap();

    assert_eq!(outcome, SyncOutcome::Completed(vec!["World1".into()]));
    assert_eq!(selector.menus(), vec![vec!["All of them", "World1.zip"]]);

    let expected_dir = tempfile::tempdir().unwrap();
    let expected = make_world(expected_dir.path(), "World1", 7);
    assert_eq!(snapshot(&saves.path().join("World1")), snapshot(&expected));

    assert!(store.calls().iter().all(|c| !matches!(c, Call::Download { key, .. } if key == "notes.txt")));
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_pull_skips_keys_that_are_not_one_directory() {
    let root = tempfile::tempdir().unwrap();
    let saves = root.path().join("saves");
    fs::create_dir_all(&saves).unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let store = Arc::new(RecordingStore::with_objects(vec![
        ("...zip", world_archive("Dots", 1)),
        ("..zip", world_archive("Dot", 2)),
        ("nested/World2.zip", world_archive("World2", 3)),
        ("World1.zip", world_archive("World1", 4)),
    ]));
    let selector = RecordingSelector::new(Some(0));

    let outcome = engine(store.clone(), &saves, scratch.path()).pull(&selector).await.unwrap();

    assert_eq!(outcome, SyncOutcome::Completed(vec!["World1".into()]));
    assert_eq!(selector.menus(), vec![vec!["All of them", "World1.zip"]]);
    assert!(!root.path().join("level.dat").exists());
    assert!(!saves.join("level.dat").exists());
    assert!(saves.join("World1").join("level.dat").is_file());
    let downloaded: Vec<_> = store
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Download { key, .. } => Some(key),
            _ => None,
        })
        .collect();
    assert_eq!(downloaded, vec!["World1.zip"]);
}

#[tokio::test]
async fn test_pull_all_downloads_every_archive() {
    let saves = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let store = Arc::new(RecordingStore::with_objects(vec![
        ("Alpha.zip", world_archive("Alpha", 1)),
        ("Beta.zip", world_archive("Beta", 2)),
        ("Gamma.zip", world_archive("Gamma", 3)),
    ]));

    let outcome = engine(store.clone(), saves.path(), scratch.path())
        .pull(&RecordingSelector::new(Some(0)))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        SyncOutcome::Completed(vec!["Alpha".into(), "Beta".into(), "Gamma".into()])
    );
    for name in ["Alpha", "Beta", "Gamma"] {
        assert!(saves.path().join(name).join("level.dat").is_file());
    }
    let downloads = store.calls().iter().filter(|c| matches!(c, Call::Download { .. })).count();
    assert_eq!(downloads, 3);
}

#[tokio::test]
async fn test_pull_overwrites_local_world() {
    let saves = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let local = make_world(saves.path(), "World1", 1);
    fs::write(local.join("level.dat"), b"stale").unwrap();

    let store = Arc::new(RecordingStore::with_objects(vec![("World1.zip", world_archive("World1", 8))]));
    engine(store, saves.path(), scratch.path())
        .pull(&RecordingSelector::new(Some(1)))
        .await
        .unwrap();

    assert_eq!(fs::read(local.join("level.dat")).unwrap(), vec![8u8; 4096]);
}

#[tokio::test]
async fn test_pull_nothing_found() {
    let saves = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let store = Arc::new(RecordingStore::with_objects(vec![("notes.txt", b"hi".to_vec())]));
    let selector = RecordingSelector::new(Some(0));

    let outcome = engine(store.clone(), saves.path(), scratch.path()).pull(&selector).await.unwrap();

    assert_eq!(outcome, SyncOutcome::NothingFound);
    assert!(selector.menus().is_empty());
    assert_eq!(store.calls(), vec![Call::List]);
}

#[tokio::test]
async fn test_pull_cancelled_makes_no_transfers() {
    let saves = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let store = Arc::new(RecordingStore::with_objects(vec![("World1.zip", world_archive("World1", 1))]));

    let outcome = engine(store.clone(), saves.path(), scratch.path())
        .pull(&RecordingSelector::new(None))
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::Cancelled);
    assert_eq!(store.transfer_count(), 0);
    assert!(!saves.path().join("World1").exists());
}

#[tokio::test]
async fn test_pull_download_failure_aborts_everything() {
    let saves = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let mut store = RecordingStore::with_objects(vec![
        ("Alpha.zip", world_archive("Alpha", 1)),
        ("Beta.zip", world_archive("Beta", 2)),
    ]);
    store.fail_download = Some("Beta.zip".to_string());

    let err = engine(Arc::new(store), saves.path(), scratch.path())
        .pull(&RecordingSelector::new(Some(0)))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::StoreUnavailable { .. }));
    // Extraction never starts when a download fails
    assert!(!saves.path().join("Alpha").exists());
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_pull_corrupt_archive_fails() {
    let saves = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let store = Arc::new(RecordingStore::with_objects(vec![("Broken.zip", b"garbage".to_vec())]));

    let err = engine(store, saves.path(), scratch.path())
        .pull(&RecordingSelector::new(Some(1)))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::CorruptArchive { .. }));
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}
