//! Turns the accepted items into a folder tree keyed by primary creator.

use std::collections::HashMap;

use crate::creator::Creator;
use crate::entry::{escape_markup, Entry};
use crate::item::Item;

pub const ANTHOLOGY_BUCKET: &str = "new-anthologies";
pub const UNDEFINED_BUCKET: &str = "undefined";
/// Items credited to more creators than this are filed as anthologies.
pub const EXPORT_ANTHOLOGY_THRESHOLD: usize = 3;

pub const DEFAULT_ITEMS_FOLDER: &str = "new-items";
pub const DEFAULT_CREATORS_FOLDER: &str = "new-creators";

/// Items filed under one inferred creator (or a reserved name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub name: String,
    pub items: Vec<Item>,
}

impl Bucket {
    pub fn is_reserved(&self) -> bool {
        is_reserved_bucket(&self.name)
    }
}

pub fn is_reserved_bucket(name: &str) -> bool {
    name == ANTHOLOGY_BUCKET || name == UNDEFINED_BUCKET
}

/// Buckets in order of first appearance, each sorted by item name.
pub fn bucket_by_creator(items: &[Item]) -> Vec<Bucket> {
    let counts = creator_occurrences(items);

    let mut buckets: Vec<Bucket> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for item in items {
        let name = primary_bucket(item, &counts);
        let slot = *index.entry(name.clone()).or_insert_with(|| {
            buckets.push(Bucket {
                name,
                items: Vec::new(),
            });
            buckets.len() - 1
        });
        buckets[slot].items.push(item.clone());
    }

    for bucket in &mut buckets {
        bucket.items.sort_by(|a, b| a.name.cmp(&b.name));
    }
    buckets
}

fn creator_occurrences(items: &[Item]) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in items {
        if let Some((_, creators)) = item.credited_creators() {
            for creator in creators {
                *counts.entry(creator.as_str()).or_insert(0) += 1;
            }
        }
    }
    counts
}

fn primary_bucket(item: &Item, counts: &HashMap<&str, usize>) -> String {
    let creators = match item.credited_creators() {
        None => return UNDEFINED_BUCKET.to_string(),
        Some((_, creators)) => creators,
    };
    if creators.len() == 1 {
        return creators[0].clone();
    }
    if creators.len() > EXPORT_ANTHOLOGY_THRESHOLD {
        return ANTHOLOGY_BUCKET.to_string();
    }

    // First creator with the highest count wins ties.
    let mut best: Option<(&String, usize)> = None;
    for creator in creators {
        let count = counts.get(creator.as_str()).copied().unwrap_or(0);
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((creator, count));
        }
    }
    match best {
        Some((creator, count)) if count > 1 => creator.clone(),
        _ => UNDEFINED_BUCKET.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkNode {
    Folder {
        name: String,
        children: Vec<BookmarkNode>,
    },
    Link {
        title: String,
        url: String,
    },
}

impl BookmarkNode {
    pub fn folder(name: impl Into<String>) -> Self {
        BookmarkNode::Folder {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn link(entry: &Entry) -> Self {
        BookmarkNode::Link {
            title: entry.bookmark_title(),
            url: entry.url().to_string(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            BookmarkNode::Folder { name, .. } => name,
            BookmarkNode::Link { title, .. } => title,
        }
    }

    pub fn children(&self) -> &[BookmarkNode] {
        match self {
            BookmarkNode::Folder { children, .. } => children,
            BookmarkNode::Link { .. } => &[],
        }
    }

    pub fn find_folder(&self, name: &str) -> Option<&BookmarkNode> {
        self.children()
            .iter()
            .find(|child| matches!(child, BookmarkNode::Folder { name: n, .. } if n == name))
    }

    /// Number of links anywhere below this node.
    pub fn link_count(&self) -> usize {
        match self {
            BookmarkNode::Link { .. } => 1,
            BookmarkNode::Folder { children, .. } => children.iter().map(Self::link_count).sum(),
        }
    }

    fn push(&mut self, node: BookmarkNode) {
        if let BookmarkNode::Folder { children, .. } = self {
            children.push(node);
        }
    }
}

/// Folder names of the exported document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLayout {
    pub items_folder: String,
    pub creators_folder: String,
}

impl Default for ExportLayout {
    fn default() -> Self {
        Self {
            items_folder: DEFAULT_ITEMS_FOLDER.to_string(),
            creators_folder: DEFAULT_CREATORS_FOLDER.to_string(),
        }
    }
}

impl ExportLayout {
    /// Single-series exports name the items folder after the series.
    pub fn for_series(series: Option<&str>) -> Self {
        match series {
            Some(series) if !series.is_empty() => Self {
                items_folder: series.to_string(),
                ..Self::default()
            },
            _ => Self::default(),
        }
    }
}

/// Builds the export tree, or `None` when there is nothing to export.
///
/// Non-reserved buckets with one item are flattened into the items folder;
/// the reserved buckets always get their own folder. A lone accepted item
/// is placed in the items folder without grouping, titled by its name only.
pub fn build_export_tree(
    accepted: &[Item],
    creators: &[Creator],
    layout: &ExportLayout,
) -> Option<BookmarkNode> {
    if accepted.is_empty() && creators.is_empty() {
        return None;
    }

    let mut root = BookmarkNode::folder("root");

    if !accepted.is_empty() {
        let mut items_folder = BookmarkNode::folder(layout.items_folder.clone());
        if let [only] = accepted {
            items_folder.push(BookmarkNode::Link {
                title: escape_markup(&only.name),
                url: only.url.clone(),
            });
        } else {
            for bucket in bucket_by_creator(accepted) {
                if bucket.items.len() == 1 && !bucket.is_reserved() {
                    items_folder.push(BookmarkNode::link(&Entry::Item(bucket.items[0].clone())));
                    continue;
                }
                let mut folder = BookmarkNode::folder(bucket.name);
                for item in bucket.items {
                    folder.push(BookmarkNode::link(&Entry::Item(item)));
                }
                items_folder.push(folder);
            }
        }
        root.push(items_folder);
    }

    if !creators.is_empty() {
        let mut creators_folder = BookmarkNode::folder(layout.creators_folder.clone());
        for creator in creators {
            creators_folder.push(BookmarkNode::link(&Entry::Creator(creator.clone())));
        }
        root.push(creators_folder);
    }

    Some(root)
}
