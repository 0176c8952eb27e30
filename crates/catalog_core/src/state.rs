use std::collections::BTreeSet;

use chrono::NaiveDateTime;

use crate::dates::default_checkpoint_time;

/// Newest item seen by a completed full run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub time: NaiveDateTime,
    pub title: String,
}

impl Default for Checkpoint {
    fn default() -> Self {
        Self {
            time: default_checkpoint_time(),
            title: String::new(),
        }
    }
}

/// Resumable crawl state, persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrawlState {
    pub decided_item_ids: BTreeSet<String>,
    pub seen_series: BTreeSet<String>,
    pub unread_series: BTreeSet<String>,
    pub known_creators: BTreeSet<String>,
    pub checkpoint: Checkpoint,
    /// Candidate captured by a full run that has not completed yet.
    pub pending_checkpoint: Option<Checkpoint>,
    pub run_incomplete: bool,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepares a freshly loaded state for a run. A state that did not end
    /// mid-run has nothing to resume, so its decided set is dropped.
    pub fn prepare_for_run(&mut self) {
        if !self.run_incomplete {
            self.decided_item_ids.clear();
            self.pending_checkpoint = None;
        }
    }

    pub fn begin_run(&mut self) {
        self.run_incomplete = true;
    }

    /// Marks the run as complete and resets per-run bookkeeping.
    pub fn finish_run(&mut self) {
        self.run_incomplete = false;
        self.decided_item_ids.clear();
        self.unread_series.clear();
        self.pending_checkpoint = None;
    }

    pub fn is_resuming(&self) -> bool {
        self.run_incomplete
    }

    pub fn is_decided(&self, url: &str) -> bool {
        self.decided_item_ids.contains(url)
    }

    pub fn mark_decided(&mut self, url: &str) {
        self.decided_item_ids.insert(url.to_string());
    }

    /// Returns true when the creator had not been seen before.
    pub fn remember_creator(&mut self, name: &str) -> bool {
        self.known_creators.insert(name.to_string())
    }

    pub fn knows_creator(&self, name: &str) -> bool {
        self.known_creators.contains(name)
    }

    pub fn seed_creators<I>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let before = self.known_creators.len();
        self.known_creators.extend(names);
        self.known_creators.len() - before
    }

    /// Unread series that are not already on the user's reading list.
    pub fn unread_not_planned<'a>(&'a self, planned: &'a BTreeSet<String>) -> Vec<&'a str> {
        self.unread_series
            .difference(planned)
            .map(String::as_str)
            .collect()
    }
}
