use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use catalog_core::{Creator, Item};
use engine_logging::{sink_log, LogSink};
use log::Level;
use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::output::CrawlOutput;
use crate::records::{decode_list, CreatorRecord, ItemRecord, StateRecord, StoredState};

pub const ACCEPTED_ITEMS_FILE: &str = "accepted_items.json";
pub const EXCLUDED_ITEMS_FILE: &str = "excluded_items.json";
pub const ACCEPTED_CREATORS_FILE: &str = "accepted_creators.json";
pub const REJECTED_CREATORS_FILE: &str = "rejected_creators.json";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Writes `{dir}/{filename}` through a temp file in the same directory, so
/// a crash mid-write leaves the previous snapshot intact.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// The state document plus the four list snapshots of a crawl.
pub struct SnapshotStore {
    output_dir: PathBuf,
    state_file: PathBuf,
    sink: Arc<dyn LogSink>,
}

impl SnapshotStore {
    pub fn new(output_dir: PathBuf, state_file: PathBuf, sink: Arc<dyn LogSink>) -> Self {
        Self {
            output_dir,
            state_file,
            sink,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn state_file(&self) -> &Path {
        &self.state_file
    }

    /// A missing state document yields the defaults.
    pub fn load_state(&self) -> Result<StoredState, PersistError> {
        let Some(text) = read_optional(&self.state_file)? else {
            sink_log!(self.sink, Level::Info, "No saved state, loading defaults");
            return Ok(StoredState::default());
        };
        let record: StateRecord =
            serde_json::from_str(&text).map_err(|source| PersistError::Json {
                path: self.state_file.clone(),
                source,
            })?;
        Ok(record.into_stored(self.sink.as_ref()))
    }

    pub fn save_state(&self, stored: &StoredState) -> Result<(), PersistError> {
        let record = StateRecord::from_stored(stored);
        let (dir, name) = split_path(&self.state_file);
        AtomicFileWriter::new(dir).write(&name, &to_json(&record, &self.state_file)?)?;
        Ok(())
    }

    /// Lists of an interrupted run. Missing files are empty lists.
    pub fn load_output(&self) -> Result<CrawlOutput, PersistError> {
        let sink = self.sink.as_ref();
        let output = CrawlOutput {
            accepted: decode_list(
                self.load_values(ACCEPTED_ITEMS_FILE)?,
                "item",
                sink,
                ItemRecord::into_item,
            ),
            excluded: decode_list(
                self.load_values(EXCLUDED_ITEMS_FILE)?,
                "item",
                sink,
                ItemRecord::into_item,
            ),
            accepted_creators: decode_list(
                self.load_values(ACCEPTED_CREATORS_FILE)?,
                "creator",
                sink,
                CreatorRecord::into_creator,
            ),
            rejected_creators: decode_list(
                self.load_values(REJECTED_CREATORS_FILE)?,
                "creator",
                sink,
                CreatorRecord::into_creator,
            ),
        };
        sink_log!(self.sink, Level::Info, "Loaded previous session: {}", output.summary());
        Ok(output)
    }

    /// Normalizes the lists in place, then writes each of them.
    pub fn save_output(&self, output: &mut CrawlOutput) -> Result<(), PersistError> {
        output.normalize(self.sink.as_ref());
        sink_log!(self.sink, Level::Info, "TOTAL: {}", output.summary());

        self.write_list(ACCEPTED_ITEMS_FILE, &item_records(&output.accepted))?;
        self.write_list(EXCLUDED_ITEMS_FILE, &item_records(&output.excluded))?;
        self.write_list(ACCEPTED_CREATORS_FILE, &creator_records(&output.accepted_creators))?;
        self.write_list(REJECTED_CREATORS_FILE, &creator_records(&output.rejected_creators))?;
        Ok(())
    }

    /// Writes the lists and the state document. Both are attempted even if
    /// the first fails; the first error is returned.
    pub fn flush(
        &self,
        stored: &StoredState,
        output: &mut CrawlOutput,
    ) -> Result<(), PersistError> {
        sink_log!(self.sink, Level::Info, "Dumping lists...");
        let lists = self.save_output(output);
        let state = self.save_state(stored);
        lists.and(state)
    }

    /// Copies every file of the output directory into `backup_dir`, and the
    /// state document next to itself as `<stem>-backup.<ext>`.
    pub fn backup(&self, backup_dir: &Path) -> Result<usize, PersistError> {
        let mut copied = 0;
        if self.output_dir.is_dir() {
            ensure_output_dir(backup_dir)?;
            for entry in fs::read_dir(&self.output_dir)? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    fs::copy(entry.path(), backup_dir.join(entry.file_name()))?;
                    copied += 1;
                }
            }
        }
        if self.state_file.is_file() {
            fs::copy(&self.state_file, backup_path(&self.state_file))?;
            copied += 1;
        }
        sink_log!(self.sink, Level::Debug, "Backed up {copied} files");
        Ok(copied)
    }

    fn load_values(&self, filename: &str) -> Result<Vec<Value>, PersistError> {
        let path = self.output_dir.join(filename);
        let Some(text) = read_optional(&path)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&text).map_err(|source| PersistError::Json { path, source })
    }

    fn write_list<T: Serialize>(&self, filename: &str, records: &[T]) -> Result<(), PersistError> {
        let path = self.output_dir.join(filename);
        let json = to_json(&records, &path)?;
        AtomicFileWriter::new(self.output_dir.clone()).write(filename, &json)?;
        Ok(())
    }
}

/// `state.json` -> `state-backup.json`.
pub fn backup_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}-backup.{}", ext.to_string_lossy()),
        None => format!("{stem}-backup"),
    };
    path.with_file_name(name)
}

fn item_records(items: &[Item]) -> Vec<ItemRecord> {
    items.iter().map(ItemRecord::from_item).collect()
}

fn creator_records(creators: &[Creator]) -> Vec<CreatorRecord> {
    creators.iter().map(CreatorRecord::from_creator).collect()
}

fn read_optional(path: &Path) -> Result<Option<String>, PersistError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<String, PersistError> {
    serde_json::to_string_pretty(value).map_err(|source| PersistError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn split_path(path: &Path) -> (PathBuf, String) {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    (dir, name)
}
