// Tests for the user-facing messages of save and pull

use crate::support::{make_world, world_archive, RecordingStore};
use save_sync::commands;
use save_sync::sync::{EngineConfig, FixedSelector, ProgressReporter, SyncEngine};
use std::sync::Arc;

fn engine(store: RecordingStore, saves: &std::path::Path, scratch: &std::path::Path) -> SyncEngine {
    SyncEngine::with_reporter(Arc::new(store), EngineConfig::new(saves, scratch), ProgressReporter::hidden())
}

#[tokio::test]
async fn test_save_prints_summary() {
    let saves = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    make_world(saves.path(), "World1", 1);
    make_world(saves.path(), "World2", 2);

    let mut out = Vec::new();
    commands::save(&engine(RecordingStore::default(), saves.path(), scratch.path()), &FixedSelector(Some(0)), &mut out)
        .await
        .unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "Saved worlds:\n  - World1\n  - World2\n");
}

#[tokio::test]
async fn test_pull_prints_summary() {
    let saves = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let store = RecordingStore::with_objects(vec![("World1.zip", world_archive("World1", 1))]);

    let mut out = Vec::new();
    commands::pull(&engine(store, saves.path(), scratch.path()), &FixedSelector(Some(1)), &mut out)
        .await
        .unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "Pulled worlds:\n  - World1\n");
}

#[tokio::test]
async fn test_pull_with_no_archives_reports_and_succeeds() {
    let saves = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let store = RecordingStore::with_objects(vec![("readme.md", b"#".to_vec())]);

    let mut out = Vec::new();
    commands::pull(&engine(store, saves.path(), scratch.path()), &FixedSelector(Some(0)), &mut out)
        .await
        .unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "No worlds found in bucket\n");
}

#[tokio::test]
async fn test_cancel_prints_nothing() {
    let saves = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    make_world(saves.path(), "World1", 1);

    let mut out = Vec::new();
    commands::save(&engine(RecordingStore::default(), saves.path(), scratch.path()), &FixedSelector(None), &mut out)
        .await
        .unwrap();

    assert!(out.is_empty());
}
