//! On-disk schema of the state document and the list snapshots.
//!
//! Every entity has an explicit record type. Keys this version does not
//! know are collected rather than rejected, and reported once per key on
//! decode.

use std::collections::{BTreeMap, BTreeSet};

use catalog_core::{
    default_checkpoint_time, epoch_floor, parse_checkpoint_date, Checkpoint, CrawlState, Creator,
    FilterPolicy, Item, CHECKPOINT_DATE_FORMAT, ITEM_DATE_FORMAT,
};
use chrono::NaiveDateTime;
use engine_logging::{sink_log, LogSink};
use log::Level;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything `state.json` holds: resumable state plus the run settings
/// stored alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredState {
    pub state: CrawlState,
    pub policy: FilterPolicy,
    pub check_creators: bool,
}

impl Default for StoredState {
    fn default() -> Self {
        Self {
            state: CrawlState::default(),
            policy: FilterPolicy::default(),
            check_creators: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateRecord {
    #[serde(default)]
    pub decided_item_ids: Vec<String>,
    #[serde(default)]
    pub seen_series: Vec<String>,
    #[serde(default)]
    pub unread_series: Vec<String>,
    #[serde(default)]
    pub known_creators: Vec<String>,
    #[serde(default)]
    pub checkpoint_time: Option<String>,
    #[serde(default)]
    pub checkpoint_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_checkpoint_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_checkpoint_title: Option<String>,
    #[serde(default)]
    pub run_incomplete: bool,
    #[serde(default = "enabled")]
    pub check_creators: bool,
    #[serde(default)]
    pub filters: FiltersRecord,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersRecord {
    #[serde(default)]
    pub excluded_types: Vec<String>,
    #[serde(default)]
    pub required_tags: Vec<String>,
    #[serde(default)]
    pub excluded_tags: Vec<String>,
    #[serde(default)]
    pub required_characters: Vec<String>,
    /// Empty means no series restriction.
    #[serde(default)]
    pub required_series: String,
    #[serde(default = "default_creator_limit")]
    pub max_creator_count: usize,
    #[serde(default = "default_creator_limit")]
    pub creator_minimum_accepted_count: usize,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

impl Default for FiltersRecord {
    fn default() -> Self {
        Self::from_policy(&FilterPolicy::default())
    }
}

fn enabled() -> bool {
    true
}

fn default_creator_limit() -> usize {
    2
}

impl FiltersRecord {
    pub fn from_policy(policy: &FilterPolicy) -> Self {
        Self {
            excluded_types: policy.excluded_types.iter().cloned().collect(),
            required_tags: policy.required_tags.iter().cloned().collect(),
            excluded_tags: policy.excluded_tags.iter().cloned().collect(),
            required_characters: policy.required_characters.iter().cloned().collect(),
            required_series: policy.required_series.clone().unwrap_or_default(),
            max_creator_count: policy.max_creator_count,
            creator_minimum_accepted_count: policy.creator_minimum_accepted_count,
            unknown: BTreeMap::new(),
        }
    }

    pub fn into_policy(self, sink: &dyn LogSink) -> FilterPolicy {
        warn_unknown(sink, "filters", &self.unknown);
        FilterPolicy {
            excluded_types: self.excluded_types.into_iter().collect(),
            required_tags: self.required_tags.into_iter().collect(),
            excluded_tags: self.excluded_tags.into_iter().collect(),
            required_characters: self.required_characters.into_iter().collect(),
            required_series: Some(self.required_series).filter(|s| !s.is_empty()),
            max_creator_count: self.max_creator_count,
            creator_minimum_accepted_count: self.creator_minimum_accepted_count,
        }
    }
}

impl StateRecord {
    pub fn from_stored(stored: &StoredState) -> Self {
        let state = &stored.state;
        Self {
            decided_item_ids: sorted(&state.decided_item_ids),
            seen_series: sorted(&state.seen_series),
            unread_series: sorted(&state.unread_series),
            known_creators: sorted(&state.known_creators),
            checkpoint_time: Some(state.checkpoint.time.format(CHECKPOINT_DATE_FORMAT).to_string()),
            checkpoint_title: state.checkpoint.title.clone(),
            pending_checkpoint_time: state
                .pending_checkpoint
                .as_ref()
                .map(|c| c.time.format(CHECKPOINT_DATE_FORMAT).to_string()),
            pending_checkpoint_title: state.pending_checkpoint.as_ref().map(|c| c.title.clone()),
            run_incomplete: state.run_incomplete,
            check_creators: stored.check_creators,
            filters: FiltersRecord::from_policy(&stored.policy),
            unknown: BTreeMap::new(),
        }
    }

    pub fn into_stored(self, sink: &dyn LogSink) -> StoredState {
        warn_unknown(sink, "state", &self.unknown);

        let checkpoint_time = match self.checkpoint_time.as_deref() {
            None => default_checkpoint_time(),
            Some(raw) => checkpoint_or_warn(sink, raw)
                .unwrap_or_else(default_checkpoint_time),
        };
        let pending_checkpoint = self
            .pending_checkpoint_time
            .as_deref()
            .and_then(|raw| checkpoint_or_warn(sink, raw))
            .map(|time| Checkpoint {
                time,
                title: self.pending_checkpoint_title.clone().unwrap_or_default(),
            });

        StoredState {
            state: CrawlState {
                decided_item_ids: self.decided_item_ids.into_iter().collect(),
                seen_series: self.seen_series.into_iter().collect(),
                unread_series: self.unread_series.into_iter().collect(),
                known_creators: self.known_creators.into_iter().collect(),
                checkpoint: Checkpoint {
                    time: checkpoint_time,
                    title: self.checkpoint_title,
                },
                pending_checkpoint,
                run_incomplete: self.run_incomplete,
            },
            policy: self.filters.into_policy(sink),
            check_creators: self.check_creators,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    pub url: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub series: Vec<String>,
    #[serde(default)]
    pub characters: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub exclude_reasons: Vec<String>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

impl ItemRecord {
    pub fn from_item(item: &Item) -> Self {
        Self {
            url: item.url.clone(),
            name: item.name.clone(),
            kind: item.kind.clone(),
            groups: item.credits.groups.clone(),
            artists: item.credits.artists.clone(),
            series: item.series.clone(),
            characters: item.characters.clone(),
            tags: item.tags.clone(),
            date: Some(item.published_at.format(ITEM_DATE_FORMAT).to_string()),
            exclude_reasons: item.exclude_reasons.clone(),
            unknown: BTreeMap::new(),
        }
    }

    pub fn into_item(self, sink: &dyn LogSink) -> Item {
        warn_unknown(sink, "item", &self.unknown);
        let mut item = Item::new(self.url, self.name);
        item.kind = self.kind;
        item.credits.groups = self.groups;
        item.credits.artists = self.artists;
        item.series = self.series;
        item.characters = self.characters;
        item.tags = self.tags;
        item.published_at = self
            .date
            .as_deref()
            .and_then(|raw| parse_or_warn(sink, raw, ITEM_DATE_FORMAT))
            .unwrap_or_else(epoch_floor);
        item.exclude_reasons = self.exclude_reasons;
        item
    }
}

/// A creator is stored with its name for readability; the url is
/// authoritative and the name is derived from it again on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorRecord {
    #[serde(default)]
    pub name: String,
    pub url: String,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

impl CreatorRecord {
    pub fn from_creator(creator: &Creator) -> Self {
        Self {
            name: creator.name.clone(),
            url: creator.url.clone(),
            unknown: BTreeMap::new(),
        }
    }

    pub fn into_creator(self, sink: &dyn LogSink) -> Creator {
        warn_unknown(sink, "creator", &self.unknown);
        Creator::from_url(self.url)
    }
}

/// Decodes a JSON array entry by entry; entries that do not fit the
/// record are logged and skipped.
pub fn decode_list<R, T>(
    values: Vec<Value>,
    what: &str,
    sink: &dyn LogSink,
    convert: impl Fn(R, &dyn LogSink) -> T,
) -> Vec<T>
where
    R: serde::de::DeserializeOwned,
{
    let mut decoded = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<R>(value) {
            Ok(record) => decoded.push(convert(record, sink)),
            Err(err) => sink_log!(sink, Level::Warn, "skipping {what} #{index}: {err}"),
        }
    }
    decoded
}

fn warn_unknown(sink: &dyn LogSink, what: &str, unknown: &BTreeMap<String, Value>) {
    for key in unknown.keys() {
        sink_log!(sink, Level::Warn, "Unknown {what} key '{key}', skipping...");
    }
}

fn parse_or_warn(sink: &dyn LogSink, raw: &str, format: &str) -> Option<NaiveDateTime> {
    match NaiveDateTime::parse_from_str(raw, format) {
        Ok(time) => Some(time),
        Err(err) => {
            sink_log!(sink, Level::Warn, "unreadable date '{raw}': {err}");
            None
        }
    }
}

fn checkpoint_or_warn(sink: &dyn LogSink, raw: &str) -> Option<NaiveDateTime> {
    match parse_checkpoint_date(raw) {
        Ok(time) => Some(time),
        Err(err) => {
            sink_log!(sink, Level::Warn, "unreadable date '{raw}': {err}");
            None
        }
    }
}

fn sorted(set: &BTreeSet<String>) -> Vec<String> {
    set.iter().cloned().collect()
}
