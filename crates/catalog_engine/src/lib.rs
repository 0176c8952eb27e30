//! Catalog engine: listing traversal, creator probes, persistence and export.
mod bookmarks;
mod cursor;
mod engine;
mod export;
mod fetch;
mod html;
mod listing;
mod output;
mod persist;
mod records;
mod source;
mod types;
mod verify;

pub use bookmarks::{bookmarked_creators, BookmarkError, BookmarkSource, ChromiumBookmarks};
pub use cursor::{ListingCursor, PageWindow};
pub use engine::{CrawlEngine, RunEnd, RunOptions, RunSummary};
pub use export::{export_file_name, render_netscape, BookmarkExporter, ExportError};
pub use fetch::{enrich_from_detail, fetch_listing_page, FetchSettings};
pub use html::{parse_detail, parse_listing, HttpSession, HttpSessionProvider};
pub use listing::{describe_pager, next_page_url, page_items};
pub use output::CrawlOutput;
pub use persist::{
    backup_path, ensure_output_dir, AtomicFileWriter, PersistError, SnapshotStore,
    ACCEPTED_CREATORS_FILE, ACCEPTED_ITEMS_FILE, EXCLUDED_ITEMS_FILE, REJECTED_CREATORS_FILE,
};
pub use records::{CreatorRecord, FiltersRecord, ItemRecord, StateRecord, StoredState};
pub use source::{DetailSource, PageSource, Session, SessionProvider};
pub use types::{CrawlError, FailureKind, FetchError, PageLink, RawPage};
pub use verify::{verify_seen_series, SeriesVerification};
