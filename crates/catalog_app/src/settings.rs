//! Application settings, read from a RON file.
//!
//! Everything here is about where files live and how the origin is
//! reached. The filter policy is part of the persisted state instead.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use catalog_core::Site;
use catalog_engine::FetchSettings;
use engine_logging::engine_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed settings {path}: {source}")]
    Ron {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub state_file: PathBuf,
    pub base_url: String,
    pub language: String,
    /// Chromium-family `Bookmarks` file to seed known creators from.
    pub bookmarks_file: Option<PathBuf>,
    /// Folder paths (`a/b/c`) inside the bookmarks holding creator links.
    pub creator_folders: Vec<String>,
    /// One series name per line; left out of the unread report.
    pub later_file: Option<PathBuf>,
    pub fetch: FetchConfig,
}

impl Default for Settings {
    fn default() -> Self {
        let site = Site::default();
        Self {
            output_dir: PathBuf::from("output"),
            backup_dir: PathBuf::from("output-backup"),
            state_file: PathBuf::from("state.json"),
            base_url: site.base_url,
            language: site.language,
            bookmarks_file: None,
            creator_folders: Vec::new(),
            later_file: None,
            fetch: FetchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub page_timeout_secs: u64,
    pub max_attempts: usize,
    pub detail_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_timeout_secs: 30,
            max_attempts: 3,
            detail_timeout_secs: 30,
        }
    }
}

impl FetchConfig {
    pub fn to_fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            page_timeout: Duration::from_secs(self.page_timeout_secs),
            max_attempts: self.max_attempts,
            detail_timeout: Duration::from_secs(self.detail_timeout_secs),
        }
    }

    /// Upper bound for a single HTTP request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs.max(self.detail_timeout_secs))
    }
}

impl Settings {
    /// Reads the settings file; a missing file means the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                engine_info!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        ron::from_str(&text).map_err(|source| SettingsError::Ron {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn site(&self) -> Site {
        Site::new(self.base_url.clone(), self.language.clone())
    }

    /// Series the user already plans to read. No file configured, or a
    /// missing file, is an empty list.
    pub fn later_series(&self) -> Result<BTreeSet<String>, SettingsError> {
        let Some(path) = &self.later_file else {
            return Ok(BTreeSet::new());
        };
        match fs::read_to_string(path) {
            Ok(text) => Ok(text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeSet::new()),
            Err(source) => Err(SettingsError::Io {
                path: path.clone(),
                source,
            }),
        }
    }
}
