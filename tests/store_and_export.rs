use std::path::PathBuf;
use std::time::{Duration, Instant};

use tempfile::TempDir;
use watchlog::{
    CsvExporter, EventCorrelator, EventStore, FileEvent, FileEventKind, QueryCriteria, RawKind,
    RawNotification,
};

fn event(path: &str, kind: FileEventKind) -> FileEvent {
    FileEvent::new(PathBuf::from(path), kind)
}

#[test]
fn test_store_survives_reopen() {
    let temp = TempDir::new().expect("temp dir");
    let db_path = temp.path().join("events.db");

    {
        let store = EventStore::open(&db_path).expect("open store");
        store.record(&event("/d/a.txt", FileEventKind::Created)).unwrap();
        store.record(&event("/d/b.txt", FileEventKind::Deleted)).unwrap();
    }

    let store = EventStore::open(&db_path).expect("reopen store");
    let all = store.query_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(store.existing_paths().unwrap(), [PathBuf::from("/d/a.txt")]);
}

#[test]
fn test_seeding_from_history_reclassifies_known_paths() {
    let temp = TempDir::new().expect("temp dir");
    let store = EventStore::open(&temp.path().join("events.db")).expect("open store");
    store.record(&event("/d/kept.txt", FileEventKind::Changed)).unwrap();
    store.record(&event("/d/gone.txt", FileEventKind::Deleted)).unwrap();

    let mut correlator = EventCorrelator::new(Duration::from_millis(1000));
    correlator.seed(store.existing_paths().unwrap());

    let now = Instant::now();
    let kept = correlator
        .process_at(
            RawNotification::new(PathBuf::from("/d/kept.txt"), RawKind::Created),
            now,
        )
        .expect("event for kept path");
    assert_eq!(kept.kind, FileEventKind::Changed);

    let gone = correlator
        .process_at(
            RawNotification::new(PathBuf::from("/d/gone.txt"), RawKind::Created),
            now,
        )
        .expect("event for recreated path");
    assert_eq!(gone.kind, FileEventKind::Created);
}

#[test]
fn test_bulk_clear_then_reseed_forgets_history() {
    let temp = TempDir::new().expect("temp dir");
    let store = EventStore::open(&temp.path().join("events.db")).expect("open store");
    store.record(&event("/d/a.txt", FileEventKind::Created)).unwrap();

    let mut correlator = EventCorrelator::new(Duration::from_millis(1000));
    correlator.seed(store.existing_paths().unwrap());
    assert_eq!(correlator.tracked_count(), 1);

    store.clear_all().unwrap();
    correlator.seed(store.existing_paths().unwrap());

    let classified = correlator
        .process_at(
            RawNotification::new(PathBuf::from("/d/a.txt"), RawKind::Created),
            Instant::now(),
        )
        .expect("event after reseed");
    assert_eq!(classified.kind, FileEventKind::Created);
}

#[test]
fn test_query_criteria_against_store() {
    let temp = TempDir::new().expect("temp dir");
    let store = EventStore::open(&temp.path().join("events.db")).expect("open store");
    store.record(&event("/logs/app.log", FileEventKind::Changed)).unwrap();
    store.record(&event("/logs/app.txt", FileEventKind::Changed)).unwrap();
    store.record(&event("/other/app.log", FileEventKind::Deleted)).unwrap();

    let results = store
        .query(&QueryCriteria {
            extension: Some("log".into()),
            kind: Some(FileEventKind::Changed),
            directory: Some(PathBuf::from("/logs")),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].path, PathBuf::from("/logs/app.log"));
}

#[test]
fn test_csv_export_of_query_results() {
    let temp = TempDir::new().expect("temp dir");
    let store = EventStore::open(&temp.path().join("events.db")).expect("open store");
    store.record(&event("/d/report.txt", FileEventKind::Created)).unwrap();
    store.record(&event("/d/notes.md", FileEventKind::Changed)).unwrap();

    let out = temp.path().join("export.csv");
    let results = store.query_all().unwrap();
    CsvExporter::new().export(&results, &out).unwrap();

    let content = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines[0], "FileName,Extension,FilePath,EventType,Timestamp");
    assert_eq!(lines.len(), 3);
    assert!(content.contains("report.txt,txt,/d/report.txt,Created,"));
    assert!(content.contains("notes.md,md,/d/notes.md,Changed,"));
}
