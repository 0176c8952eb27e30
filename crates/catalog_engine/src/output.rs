use std::collections::HashSet;

use catalog_core::{Creator, Entry, Item};
use engine_logging::{sink_log, LogSink};
use log::Level;

/// The four running lists a crawl appends to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlOutput {
    pub accepted: Vec<Item>,
    pub excluded: Vec<Item>,
    pub accepted_creators: Vec<Creator>,
    pub rejected_creators: Vec<Creator>,
}

impl CrawlOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, item: Item) {
        self.accepted.push(item);
    }

    pub fn exclude(&mut self, item: Item) {
        self.excluded.push(item);
    }

    pub fn accept_creator(&mut self, creator: Creator) {
        self.accepted_creators.push(creator);
    }

    pub fn reject_creator(&mut self, creator: Creator) {
        self.rejected_creators.push(creator);
    }

    pub fn summary(&self) -> String {
        format!(
            "{} accepted and {} excluded items, {} accepted and {} rejected creators",
            self.accepted.len(),
            self.excluded.len(),
            self.accepted_creators.len(),
            self.rejected_creators.len()
        )
    }

    /// Drops repeated entries (first occurrence wins) and sorts every list
    /// by name.
    pub fn normalize(&mut self, sink: &dyn LogSink) {
        self.accepted = normalized(std::mem::take(&mut self.accepted), sink);
        self.excluded = normalized(std::mem::take(&mut self.excluded), sink);
        self.accepted_creators = normalized(std::mem::take(&mut self.accepted_creators), sink);
        self.rejected_creators = normalized(std::mem::take(&mut self.rejected_creators), sink);
    }
}

fn normalized<T>(list: Vec<T>, sink: &dyn LogSink) -> Vec<T>
where
    T: Clone + Into<Entry>,
{
    let mut seen = HashSet::new();
    let mut unique: Vec<(Entry, T)> = Vec::with_capacity(list.len());
    for value in list {
        let entry: Entry = value.clone().into();
        if seen.insert(entry.identity().to_string()) {
            unique.push((entry, value));
        } else {
            sink_log!(sink, Level::Debug, "Repeated {}", entry.url());
        }
    }
    unique.sort_by(|(a, _), (b, _)| a.name().cmp(b.name()));
    unique.into_iter().map(|(_, value)| value).collect()
}
