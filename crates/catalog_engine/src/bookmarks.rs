//! Reading the user's existing creator bookmarks.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use catalog_core::creator_name_from_url;
use engine_logging::{sink_log, LogSink};
use log::Level;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookmarkError {
    #[error("cannot read bookmarks {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed bookmarks: {0}")]
    Json(#[from] serde_json::Error),
}

/// Anything that can list the links of a bookmark folder.
pub trait BookmarkSource {
    /// Urls directly inside the folder at `path` (`a/b/c`), or `None` when
    /// the folder does not exist.
    fn folder_urls(&self, path: &str) -> Option<Vec<String>>;
}

#[derive(Debug, Clone, Deserialize)]
struct ChromiumNode {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    children: Vec<ChromiumNode>,
}

impl ChromiumNode {
    fn is_folder(&self) -> bool {
        self.kind == "folder"
    }

    fn child_folder(&self, name: &str) -> Option<&ChromiumNode> {
        self.children
            .iter()
            .find(|child| child.is_folder() && child.name == name)
    }

    fn find_folder_deep<'a>(&'a self, name: &str) -> Option<&'a ChromiumNode> {
        if self.is_folder() && self.name == name {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find_folder_deep(name))
    }
}

#[derive(Debug, Deserialize)]
struct ChromiumFile {
    roots: BTreeMap<String, Value>,
}

/// A Chromium-family `Bookmarks` JSON file (Chrome, Brave, Edge).
#[derive(Debug, Clone)]
pub struct ChromiumBookmarks {
    roots: Vec<ChromiumNode>,
}

impl ChromiumBookmarks {
    pub fn load(path: &Path) -> Result<Self, BookmarkError> {
        let text = fs::read_to_string(path).map_err(|source| BookmarkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Roots that are not folder nodes (sync metadata) are ignored.
    pub fn from_json(text: &str) -> Result<Self, BookmarkError> {
        let file: ChromiumFile = serde_json::from_str(text)?;
        let roots = file
            .roots
            .into_values()
            .filter_map(|value| serde_json::from_value::<ChromiumNode>(value).ok())
            .filter(ChromiumNode::is_folder)
            .collect();
        Ok(Self { roots })
    }
}

impl BookmarkSource for ChromiumBookmarks {
    /// The first path segment may be any folder, found depth first; the
    /// remaining segments descend by child name.
    fn folder_urls(&self, path: &str) -> Option<Vec<String>> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let first = segments.next()?;
        let mut folder = self.roots.iter().find_map(|root| root.find_folder_deep(first))?;
        for segment in segments {
            folder = folder.child_folder(segment)?;
        }
        Some(
            folder
                .children
                .iter()
                .filter_map(|child| child.url.clone())
                .collect(),
        )
    }
}

/// Creator names bookmarked under any of `folders`. Missing folders are
/// reported and contribute nothing.
pub fn bookmarked_creators(
    source: &dyn BookmarkSource,
    folders: &[String],
    sink: &dyn LogSink,
) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for folder in folders {
        match source.folder_urls(folder) {
            Some(urls) => names.extend(
                urls.iter()
                    .map(|url| creator_name_from_url(url))
                    .filter(|name| !name.is_empty()),
            ),
            None => sink_log!(sink, Level::Warn, "bookmark folder '{folder}' was not found"),
        }
    }
    names
}
