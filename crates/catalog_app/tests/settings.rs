use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use catalog_app::settings::{Settings, SettingsError};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn missing_file_means_defaults() {
    let dir = TempDir::new().unwrap();

    let settings = Settings::load(&dir.path().join("settings.ron")).unwrap();

    assert_eq!(settings, Settings::default());
    assert_eq!(settings.output_dir, PathBuf::from("output"));
    assert_eq!(settings.state_file, PathBuf::from("state.json"));
    assert_eq!(settings.site().base_url, "https://hitomi.la");
}

#[test]
fn partial_file_keeps_remaining_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.ron");
    fs::write(
        &path,
        r#"(
            base_url: "https://example.org/",
            bookmarks_file: Some("Bookmarks"),
            creator_folders: ["reading/artists", "reading/groups"],
            fetch: (max_attempts: 5),
        )"#,
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();

    assert_eq!(settings.site().base_url, "https://example.org");
    assert_eq!(settings.language, "japanese");
    assert_eq!(settings.bookmarks_file, Some(PathBuf::from("Bookmarks")));
    assert_eq!(settings.creator_folders.len(), 2);
    let fetch = settings.fetch.to_fetch_settings();
    assert_eq!(fetch.max_attempts, 5);
    assert_eq!(fetch.page_timeout, Duration::from_secs(30));
    assert_eq!(settings.fetch.request_timeout(), Duration::from_secs(30));
}

#[test]
fn malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.ron");
    fs::write(&path, "(output_dir: 3").unwrap();

    assert!(matches!(Settings::load(&path), Err(SettingsError::Ron { .. })));
}

#[test]
fn later_file_lists_one_series_per_line() {
    let dir = TempDir::new().unwrap();
    let later = dir.path().join("later.txt");
    fs::write(&later, "fate\n\n  touhou project  \n").unwrap();
    let settings = Settings {
        later_file: Some(later),
        ..Settings::default()
    };

    let expected: BTreeSet<String> = ["fate", "touhou project"].into_iter().map(String::from).collect();
    assert_eq!(settings.later_series().unwrap(), expected);
}

#[test]
fn absent_later_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let settings = Settings {
        later_file: Some(dir.path().join("missing.txt")),
        ..Settings::default()
    };

    assert!(settings.later_series().unwrap().is_empty());
    assert!(Settings::default().later_series().unwrap().is_empty());
}
