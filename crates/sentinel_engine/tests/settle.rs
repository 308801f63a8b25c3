use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use sentinel_engine::{
    new_items, BaselineStore, FileBaselineStore, MemoryBaselineStore, MonitorKey, Notification,
    Notifier, Settlement, Settler, BASELINE_FILENAME,
};
use tempfile::TempDir;

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    fn take(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().drain(..).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        self.sent.lock().unwrap().push(notification.clone());
    }
}

fn list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn key() -> MonitorKey {
    MonitorKey::new("grade_course_names")
}

fn setup() -> (Arc<MemoryBaselineStore>, Arc<RecordingNotifier>, Settler) {
    sentinel_logging::initialize_for_tests();
    let store = Arc::new(MemoryBaselineStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let settler = Settler::new(store.clone(), notifier.clone());
    (store, notifier, settler)
}

#[test]
fn first_run_stores_baseline_and_reports_everything() {
    let (store, notifier, settler) = setup();

    let settlement = settler.settle(&key(), list(&["Algebra", "Biology"]));

    assert_eq!(
        settlement,
        Settlement {
            is_first_run: true,
            new_items: list(&["Algebra", "Biology"]),
        }
    );
    assert_eq!(store.get(&key()), Some(list(&["Algebra", "Biology"])));
    let sent = notifier.take();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body.contains("Algebra, Biology"));
    assert!(!sent[0].sticky);
}

#[test]
fn first_run_with_empty_list_still_counts_as_observed() {
    let (store, notifier, settler) = setup();

    let settlement = settler.settle(&key(), Vec::new());

    assert!(settlement.is_first_run);
    assert_eq!(store.get(&key()), Some(Vec::new()));
    assert_eq!(notifier.take().len(), 1);

    let second = settler.settle(&key(), list(&["Algebra"]));
    assert!(!second.is_first_run);
    assert_eq!(second.new_items, list(&["Algebra"]));
}

#[test]
fn unchanged_list_is_idempotent() {
    let (store, notifier, settler) = setup();
    settler.settle(&key(), list(&["Algebra", "Biology"]));
    notifier.take();
    let writes = store.write_count();

    let first = settler.settle(&key(), list(&["Algebra", "Biology"]));
    let second = settler.settle(&key(), list(&["Algebra", "Biology"]));

    assert_eq!(first.new_items, Vec::<String>::new());
    assert_eq!(second.new_items, Vec::<String>::new());
    assert_eq!(store.write_count(), writes);
    assert!(notifier.take().is_empty());
}

#[test]
fn set_difference_keeps_duplicates_and_overwrites_baseline() {
    let (store, notifier, settler) = setup();
    store.set(&key(), &list(&["Algebra", "Biology"]));

    let settlement = settler.settle(&key(), list(&["Biology", "Chemistry", "Chemistry"]));

    assert!(!settlement.is_first_run);
    assert_eq!(settlement.new_items, list(&["Chemistry", "Chemistry"]));
    assert_eq!(
        store.get(&key()),
        Some(list(&["Biology", "Chemistry", "Chemistry"]))
    );
    let sent = notifier.take();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].sticky);
    assert!(sent[0].body.starts_with("2 new:"));
    assert!(sent[0].body.contains("-> Chemistry"));
}

#[test]
fn disappearance_is_silent_and_keeps_baseline() {
    let (store, notifier, settler) = setup();
    store.set(&key(), &list(&["Algebra", "Biology", "Chemistry"]));
    let writes = store.write_count();

    let settlement = settler.settle(&key(), list(&["Algebra"]));

    assert_eq!(settlement.new_items, Vec::<String>::new());
    assert_eq!(
        store.get(&key()),
        Some(list(&["Algebra", "Biology", "Chemistry"]))
    );
    assert_eq!(store.write_count(), writes);
    assert!(notifier.take().is_empty());
}

#[test]
fn membership_is_exact_string_equality() {
    assert_eq!(
        new_items(&list(&["algebra", "Algebra "]), &list(&["Algebra"])),
        list(&["algebra", "Algebra "])
    );
}

#[test]
fn baseline_survives_restart() {
    sentinel_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    let notifier = Arc::new(RecordingNotifier::default());

    {
        let store = Arc::new(FileBaselineStore::new(temp.path().to_path_buf()));
        let settler = Settler::new(store, notifier.clone());
        assert!(settler.settle(&key(), list(&["Algebra"])).is_first_run);
    }

    let store = Arc::new(FileBaselineStore::new(temp.path().to_path_buf()));
    let settler = Settler::new(store, notifier.clone());
    let settlement = settler.settle(&key(), list(&["Algebra", "Biology"]));

    assert!(!settlement.is_first_run);
    assert_eq!(settlement.new_items, list(&["Biology"]));
    assert_eq!(notifier.take().len(), 2);
}

#[test]
fn corrupt_baseline_file_reads_as_first_run() {
    sentinel_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(BASELINE_FILENAME), "not ron at all {").unwrap();
    let store = Arc::new(FileBaselineStore::new(temp.path().to_path_buf()));
    let notifier = Arc::new(RecordingNotifier::default());
    let settler = Settler::new(store.clone(), notifier.clone());

    let settlement = settler.settle(&key(), list(&["Algebra"]));

    assert!(settlement.is_first_run);
    assert_eq!(store.get(&key()), Some(list(&["Algebra"])));
}

#[test]
fn unwritable_state_dir_does_not_fail_settle() {
    sentinel_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    let not_a_dir = temp.path().join("file");
    std::fs::write(&not_a_dir, "x").unwrap();
    let store = Arc::new(FileBaselineStore::new(not_a_dir));
    let notifier = Arc::new(RecordingNotifier::default());
    let settler = Settler::new(store, notifier.clone());

    let first = settler.settle(&key(), list(&["Algebra"]));
    let second = settler.settle(&key(), list(&["Algebra"]));

    assert!(first.is_first_run);
    assert!(second.is_first_run);
    assert_eq!(notifier.take().len(), 2);
}
