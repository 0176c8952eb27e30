use std::fs;
use std::sync::Arc;

use catalog_core::{parse_checkpoint_date, Checkpoint, Creator, FilterPolicy, Item};
use catalog_engine::{
    backup_path, CrawlOutput, PersistError, SnapshotStore, StoredState, ACCEPTED_CREATORS_FILE,
    ACCEPTED_ITEMS_FILE, EXCLUDED_ITEMS_FILE,
};
use chrono::NaiveDateTime;
use engine_logging::MemorySink;
use log::Level;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn store(dir: &TempDir) -> (SnapshotStore, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let store = SnapshotStore::new(
        dir.path().join("output"),
        dir.path().join("state.json"),
        sink.clone(),
    );
    (store, sink)
}

fn time(raw: &str) -> NaiveDateTime {
    parse_checkpoint_date(raw).unwrap()
}

fn item(id: u32, name: &str) -> Item {
    let mut item = Item::new(format!("https://example.org/galleries/{id}.html"), name);
    item.kind = "manga".to_string();
    item.credits.artists = vec!["alice".to_string()];
    item.tags = vec!["sole female".to_string()];
    item.published_at = time("30/09/2017 23:14");
    item
}

#[test]
fn missing_state_loads_defaults() {
    let dir = TempDir::new().unwrap();
    let (store, sink) = store(&dir);

    let stored = store.load_state().unwrap();

    assert_eq!(stored, StoredState::default());
    assert!(sink.contains(Level::Info, "No saved state"));
}

#[test]
fn state_survives_a_save_and_load() {
    let dir = TempDir::new().unwrap();
    let (store, sink) = store(&dir);
    let mut stored = StoredState::default();
    stored.state.seen_series.insert("touhou project".to_string());
    stored.state.unread_series.insert("fate".to_string());
    stored.state.known_creators.insert("alice".to_string());
    stored.state.mark_decided("https://example.org/galleries/1.html");
    stored.state.checkpoint = Checkpoint {
        time: time("01/02/2024 10:30"),
        title: "Last seen".to_string(),
    };
    stored.state.pending_checkpoint = Some(Checkpoint {
        time: time("03/02/2024 08:00"),
        title: "Newest".to_string(),
    });
    stored.state.run_incomplete = true;
    stored.policy = FilterPolicy {
        excluded_tags: ["full censorship".to_string()].into_iter().collect(),
        required_series: Some("fate".to_string()),
        max_creator_count: 3,
        ..FilterPolicy::default()
    };
    stored.check_creators = false;

    store.save_state(&stored).unwrap();
    let loaded = store.load_state().unwrap();

    assert_eq!(loaded, stored);
    assert!(sink.lines().iter().all(|(level, _)| *level != Level::Warn));
}

#[test]
fn checkpoint_keeps_its_seconds() {
    let dir = TempDir::new().unwrap();
    let (store, _) = store(&dir);
    let mut stored = StoredState::default();
    stored.state.checkpoint = Checkpoint {
        time: time("05/01/2024 12:00:30"),
        title: "Newest".to_string(),
    };
    stored.state.pending_checkpoint = Some(Checkpoint {
        time: time("06/01/2024 08:15:59"),
        title: "Pending".to_string(),
    });

    store.save_state(&stored).unwrap();

    let raw = fs::read_to_string(store.state_file()).unwrap();
    assert!(raw.contains("\"05/01/2024 12:00:30\""), "{raw}");
    assert_eq!(store.load_state().unwrap(), stored);
}

#[test]
fn minute_only_checkpoint_of_older_files_still_loads() {
    let dir = TempDir::new().unwrap();
    let (store, sink) = store(&dir);
    fs::write(
        store.state_file(),
        r#"{ "checkpoint_time": "01/02/2024 10:30", "checkpoint_title": "Old" }"#,
    )
    .unwrap();

    let loaded = store.load_state().unwrap();

    assert_eq!(loaded.state.checkpoint.time, time("01/02/2024 10:30:00"));
    assert_eq!(loaded.state.checkpoint.title, "Old");
    assert!(!sink.contains(Level::Warn, "unreadable date"));
}

#[test]
fn unknown_keys_are_reported_and_ignored() {
    let dir = TempDir::new().unwrap();
    let (store, sink) = store(&dir);
    fs::write(
        store.state_file(),
        r#"{
            "seen_series": ["touhou project"],
            "checkpoint_time": "not a date",
            "legacy_flag": true,
            "filters": { "excluded_types": ["gamecg"], "colour": "red" }
        }"#,
    )
    .unwrap();

    let loaded = store.load_state().unwrap();

    assert!(loaded.state.seen_series.contains("touhou project"));
    assert!(loaded.policy.excluded_types.contains("gamecg"));
    assert_eq!(loaded.policy.creator_minimum_accepted_count, 2);
    assert!(loaded.check_creators);
    assert_eq!(loaded.state.checkpoint, Checkpoint::default());
    assert!(sink.contains(Level::Warn, "Unknown state key 'legacy_flag'"));
    assert!(sink.contains(Level::Warn, "Unknown filters key 'colour'"));
    assert!(sink.contains(Level::Warn, "unreadable date 'not a date'"));
}

#[test]
fn malformed_state_is_an_error() {
    let dir = TempDir::new().unwrap();
    let (store, _) = store(&dir);
    fs::write(store.state_file(), "{ not json").unwrap();

    assert!(matches!(store.load_state(), Err(PersistError::Json { .. })));
}

#[test]
fn lists_are_deduplicated_and_sorted_on_save() {
    let dir = TempDir::new().unwrap();
    let (store, sink) = store(&dir);
    let mut output = CrawlOutput::new();
    output.accept(item(2, "Zebra"));
    output.accept(item(1, "Apple"));
    output.accept(item(2, "Zebra again"));
    output.exclude(item(3, "Dropped"));
    output.accept_creator(Creator::from_url("https://example.org/artist/alice-japanese.html"));
    output.accept_creator(Creator::from_url("https://example.org/artist/alice-japanese.html"));

    store.save_output(&mut output).unwrap();
    let loaded = store.load_output().unwrap();

    let names: Vec<&str> = loaded.accepted.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Apple", "Zebra"]);
    assert_eq!(loaded.excluded.len(), 1);
    assert_eq!(loaded.accepted_creators.len(), 1);
    assert_eq!(loaded.accepted_creators[0].name, "alice");
    assert!(loaded.rejected_creators.is_empty());

    let apple = &loaded.accepted[0];
    assert_eq!(apple.kind, "manga");
    assert_eq!(apple.credits.artists, vec!["alice".to_string()]);
    assert_eq!(apple.tags, vec!["sole female".to_string()]);
    assert_eq!(apple.published_at, time("30/09/2017 23:14"));
    assert!(sink.contains(Level::Debug, "Repeated"));
}

#[test]
fn stored_item_uses_the_documented_keys() {
    let dir = TempDir::new().unwrap();
    let (store, _) = store(&dir);
    let mut output = CrawlOutput::new();
    output.accept(item(1, "Apple"));

    store.save_output(&mut output).unwrap();
    let text = fs::read_to_string(store.output_dir().join(ACCEPTED_ITEMS_FILE)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(value[0]["type"], "manga");
    assert_eq!(value[0]["date"], "30 Sep 2017, 23:14");
    assert_eq!(value[0]["artists"][0], "alice");
}

#[test]
fn bad_list_entries_are_skipped() {
    let dir = TempDir::new().unwrap();
    let (store, sink) = store(&dir);
    fs::create_dir_all(store.output_dir()).unwrap();
    fs::write(
        store.output_dir().join(EXCLUDED_ITEMS_FILE),
        r#"[
            { "url": "https://example.org/galleries/1.html", "name": "Kept", "rating": 5 },
            { "name": "No url" }
        ]"#,
    )
    .unwrap();
    fs::write(
        store.output_dir().join(ACCEPTED_CREATORS_FILE),
        r#"[{ "name": "stale name", "url": "https://example.org/group/the%20circle-japanese.html" }]"#,
    )
    .unwrap();

    let loaded = store.load_output().unwrap();

    assert_eq!(loaded.excluded.len(), 1);
    assert_eq!(loaded.excluded[0].name, "Kept");
    assert_eq!(loaded.accepted_creators[0].name, "the circle");
    assert!(loaded.accepted.is_empty());
    assert!(sink.contains(Level::Warn, "skipping item #1"));
    assert!(sink.contains(Level::Warn, "Unknown item key 'rating'"));
}

#[test]
fn flush_writes_lists_and_state() {
    let dir = TempDir::new().unwrap();
    let (store, _) = store(&dir);
    let mut stored = StoredState::default();
    stored.state.begin_run();
    let mut output = CrawlOutput::new();
    output.accept(item(1, "Apple"));

    store.flush(&stored, &mut output).unwrap();

    assert!(store.state_file().is_file());
    assert!(store.output_dir().join(ACCEPTED_ITEMS_FILE).is_file());
    assert!(store.load_state().unwrap().state.run_incomplete);
}

#[test]
fn backup_copies_lists_and_state() {
    let dir = TempDir::new().unwrap();
    let (store, _) = store(&dir);
    let mut output = CrawlOutput::new();
    output.accept(item(1, "Apple"));
    store.flush(&StoredState::default(), &mut output).unwrap();

    let backup_dir = dir.path().join("backup");
    let copied = store.backup(&backup_dir).unwrap();

    assert_eq!(copied, 5);
    assert!(backup_dir.join(ACCEPTED_ITEMS_FILE).is_file());
    assert!(dir.path().join("state-backup.json").is_file());
    assert_eq!(
        backup_path(store.state_file()),
        dir.path().join("state-backup.json")
    );
}

#[test]
fn backup_of_a_fresh_setup_copies_nothing() {
    let dir = TempDir::new().unwrap();
    let (store, _) = store(&dir);

    assert_eq!(store.backup(&dir.path().join("backup")).unwrap(), 0);
}
