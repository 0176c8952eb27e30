//! Catalog core: pure filtering, resumable state and export grouping.
mod creator;
mod dates;
mod disposition;
mod entry;
mod gate;
mod grouping;
mod item;
mod policy;
mod site;
mod state;

pub use creator::{creator_name_from_url, Creator};
pub use dates::{
    default_checkpoint_time, epoch_floor, parse_checkpoint_date, parse_listing_date, DateParseError,
    CHECKPOINT_DATE_FORMAT, ITEM_DATE_FORMAT,
};
pub use disposition::{classify, is_original, Disposition, NO_SERIES_PLACEHOLDERS};
pub use entry::Entry;
pub use gate::{CheckpointGate, GateDecision, RunMode};
pub use grouping::{
    bucket_by_creator, build_export_tree, is_reserved_bucket, BookmarkNode, Bucket, ExportLayout,
    ANTHOLOGY_BUCKET, DEFAULT_CREATORS_FOLDER, DEFAULT_ITEMS_FOLDER, EXPORT_ANTHOLOGY_THRESHOLD,
    UNDEFINED_BUCKET,
};
pub use item::{CreatorRole, Credits, Item, ItemDetail, PROBE_ANTHOLOGY_THRESHOLD};
pub use policy::{Evaluation, FilterPolicy};
pub use site::Site;
pub use state::{Checkpoint, CrawlState};
