//! Netscape bookmark file export of the accepted items and creators.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use catalog_core::{build_export_tree, BookmarkNode, Creator, ExportLayout, Item};
use engine_logging::{sink_log, LogSink};
use log::Level;
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};

const HEADER: &str = "<!DOCTYPE NETSCAPE-Bookmark-file-1>\n\
<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">\n\
<TITLE>Bookmarks</TITLE>\n\
<H1>Bookmarks</H1>\n\
<DL><p>\n";
const FOOTER: &str = "</DL><p>\n";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// `touhou project` -> `touhou_project.html`; no series -> `bookmarks.html`.
pub fn export_file_name(series: Option<&str>) -> String {
    match series {
        Some(series) if !series.is_empty() => format!("{}.html", series.replace(' ', "_")),
        _ => "bookmarks.html".to_string(),
    }
}

/// Renders the children of `root` as a bookmark document.
pub fn render_netscape(root: &BookmarkNode) -> String {
    let mut out = String::from(HEADER);
    for child in root.children() {
        write_node(&mut out, child, 1);
    }
    out.push_str(FOOTER);
    out
}

fn write_node(out: &mut String, node: &BookmarkNode, depth: usize) {
    let tabs = "\t".repeat(depth);
    match node {
        BookmarkNode::Folder { name, children } => {
            let _ = writeln!(out, "{tabs}<DT><H3>{}</H3>", escape(name));
            let _ = writeln!(out, "{tabs}<DL><p>");
            for child in children {
                write_node(out, child, depth + 1);
            }
            let _ = writeln!(out, "{tabs}</DL><p>");
        }
        // Titles arrive escaped from the tree.
        BookmarkNode::Link { title, url } => {
            let _ = writeln!(out, "{tabs}<DT><A HREF=\"{}\">{title}</A>", url.replace('"', "%22"));
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

pub struct BookmarkExporter {
    dir: PathBuf,
    sink: Arc<dyn LogSink>,
}

impl BookmarkExporter {
    pub fn new(dir: PathBuf, sink: Arc<dyn LogSink>) -> Self {
        Self { dir, sink }
    }

    /// Writes the bookmark file, or nothing when both lists are empty.
    pub fn export(
        &self,
        accepted: &[Item],
        creators: &[Creator],
        series: Option<&str>,
    ) -> Result<Option<PathBuf>, ExportError> {
        if accepted.is_empty() {
            sink_log!(self.sink, Level::Info, "No items to export");
        }
        if creators.is_empty() {
            sink_log!(self.sink, Level::Info, "No creators to export");
        }
        let layout = ExportLayout::for_series(series);
        let Some(root) = build_export_tree(accepted, creators, &layout) else {
            sink_log!(self.sink, Level::Info, "Nothing to export");
            return Ok(None);
        };

        let name = export_file_name(series);
        let path = AtomicFileWriter::new(self.dir.clone()).write(&name, &render_netscape(&root))?;
        sink_log!(
            self.sink,
            Level::Info,
            "Exported {} bookmarks to {}",
            root.link_count(),
            path.display()
        );
        Ok(Some(path))
    }
}
