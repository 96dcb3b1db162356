use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tempfile::TempDir;
use watchlog::{
    AppEvent, DirectoryWatcher, EventCorrelator, ExtensionFilter, FileEvent, FileEventKind,
};

fn start_session(
    dir: &Path,
    window: Duration,
) -> (DirectoryWatcher, Arc<Mutex<EventCorrelator>>) {
    let correlator = Arc::new(Mutex::new(EventCorrelator::new(window)));
    let session = DirectoryWatcher::start(
        dir.to_path_buf(),
        ExtensionFilter::all(),
        Arc::clone(&correlator),
    )
    .expect("failed to start watch session");
    (session, correlator)
}

/// Drains the sink until no event arrives for 700ms.
fn drain(session: &DirectoryWatcher) -> Vec<FileEvent> {
    let mut events = Vec::new();
    while let Ok(app_event) = session.recv_timeout(Duration::from_millis(700)) {
        if let AppEvent::FileChanged(event) = app_event {
            events.push(event);
        }
    }
    events
}

fn kinds_for(events: &[FileEvent], path: &Path) -> Vec<FileEventKind> {
    events
        .iter()
        .filter(|e| e.path == path)
        .map(|e| e.kind)
        .collect()
}

#[test]
fn test_create_modify_delete_lifecycle() {
    let temp = TempDir::new().expect("temp dir");
    let (session, _) = start_session(temp.path(), Duration::from_millis(100));

    let file = temp.path().join("a.txt");
    fs::write(&file, "one").expect("write");
    std::thread::sleep(Duration::from_millis(300));
    fs::write(&file, "two").expect("rewrite");
    std::thread::sleep(Duration::from_millis(300));
    fs::remove_file(&file).expect("remove");

    let kinds = kinds_for(&drain(&session), &file);

    assert_eq!(kinds.first(), Some(&FileEventKind::Created), "got {kinds:?}");
    assert_eq!(
        kinds.iter().filter(|k| **k == FileEventKind::Created).count(),
        1,
        "duplicate Created for one creation, got {kinds:?}"
    );
    assert!(kinds.contains(&FileEventKind::Changed), "got {kinds:?}");
    assert_eq!(kinds.last(), Some(&FileEventKind::Deleted), "got {kinds:?}");
    assert_eq!(
        kinds.iter().filter(|k| **k == FileEventKind::Deleted).count(),
        1,
        "got {kinds:?}"
    );
}

#[test]
fn test_rapid_write_burst_collapses_to_one_changed() {
    let temp = TempDir::new().expect("temp dir");
    // A window longer than the whole burst: every Changed after the first
    // must be suppressed.
    let (session, _) = start_session(temp.path(), Duration::from_secs(5));

    let file = temp.path().join("burst.txt");
    fs::write(&file, "0").expect("write");
    for i in 1..=5 {
        fs::write(&file, i.to_string()).expect("rewrite");
    }

    let kinds = kinds_for(&drain(&session), &file);

    assert_eq!(
        kinds.iter().filter(|k| **k == FileEventKind::Created).count(),
        1,
        "got {kinds:?}"
    );
    assert_eq!(
        kinds.iter().filter(|k| **k == FileEventKind::Changed).count(),
        1,
        "burst of writes must collapse to one Changed, got {kinds:?}"
    );
}

#[test]
fn test_recreation_after_delete_is_a_genuine_created() {
    let temp = TempDir::new().expect("temp dir");
    let (session, _) = start_session(temp.path(), Duration::from_secs(5));

    let file = temp.path().join("cycle.txt");
    fs::write(&file, "first").expect("write");
    std::thread::sleep(Duration::from_millis(200));
    fs::remove_file(&file).expect("remove");
    std::thread::sleep(Duration::from_millis(200));
    fs::write(&file, "second").expect("recreate");

    let kinds = kinds_for(&drain(&session), &file);

    let deleted_idx = kinds
        .iter()
        .position(|k| *k == FileEventKind::Deleted)
        .unwrap_or_else(|| panic!("no Deleted event, got {kinds:?}"));
    assert!(
        kinds[deleted_idx + 1..].contains(&FileEventKind::Created),
        "recreation after delete must classify as Created, got {kinds:?}"
    );
    assert_eq!(
        kinds.iter().filter(|k| **k == FileEventKind::Created).count(),
        2,
        "got {kinds:?}"
    );
}

#[test]
fn test_extension_filter_limits_the_stream() {
    let temp = TempDir::new().expect("temp dir");
    let correlator = Arc::new(Mutex::new(EventCorrelator::new(Duration::from_millis(100))));
    let session = DirectoryWatcher::start(
        temp.path().to_path_buf(),
        ExtensionFilter::new("txt"),
        Arc::clone(&correlator),
    )
    .expect("failed to start watch session");

    fs::write(temp.path().join("keep.txt"), "x").expect("write");
    fs::write(temp.path().join("skip.log"), "x").expect("write");

    let events = drain(&session);

    assert!(events.iter().any(|e| e.file_name == "keep.txt"));
    assert!(events.iter().all(|e| e.file_name != "skip.log"));
}

#[test]
fn test_manual_injection_then_external_created_stay_consistent() {
    let temp = TempDir::new().expect("temp dir");
    let (session, _) = start_session(temp.path(), Duration::from_secs(5));
    let injector = session.injector();

    let path = injector
        .create_file(temp.path(), "manual.txt")
        .expect("create file");

    let kinds = kinds_for(&drain(&session), &path);

    // The injected Created arrives first; the backend's own notification for
    // the same creation must reclassify, never duplicate the Created.
    assert_eq!(kinds.first(), Some(&FileEventKind::Created), "got {kinds:?}");
    assert_eq!(
        kinds.iter().filter(|k| **k == FileEventKind::Created).count(),
        1,
        "got {kinds:?}"
    );
    assert!(
        kinds[1..].iter().all(|k| *k == FileEventKind::Changed),
        "got {kinds:?}"
    );
}

#[test]
fn test_stop_preserves_correlator_state_for_resume() {
    let temp = TempDir::new().expect("temp dir");
    let (mut session, correlator) = start_session(temp.path(), Duration::from_millis(100));

    let file = temp.path().join("persist.txt");
    fs::write(&file, "x").expect("write");
    let kinds = kinds_for(&drain(&session), &file);
    assert!(kinds.contains(&FileEventKind::Created), "got {kinds:?}");

    session.stop();

    // A resumed session on the same correlator still knows the path, so a
    // Created for it is a rewrite, not a new file.
    let resumed = DirectoryWatcher::start(
        temp.path().to_path_buf(),
        ExtensionFilter::all(),
        Arc::clone(&correlator),
    )
    .expect("failed to resume watch session");
    resumed.injector().inject_created(file.clone());

    let kinds = kinds_for(&drain(&resumed), &file);
    assert_eq!(kinds, vec![FileEventKind::Changed]);
}
