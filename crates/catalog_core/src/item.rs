use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDateTime;

use crate::dates::{epoch_floor, ITEM_DATE_FORMAT};

/// Items on a creator's page credited to more artists than this are
/// treated as anthologies and do not count towards admitting the creator.
pub const PROBE_ANTHOLOGY_THRESHOLD: usize = 2;

/// Creators credited on an item, as listed by the origin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credits {
    pub artists: Vec<String>,
    pub groups: Vec<String>,
}

/// Which credit list an item's creators were taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatorRole {
    Artist,
    Group,
}

/// A cataloged work.
///
/// Identity is the `url` alone: two items with the same url are the same
/// item even if other fields drifted between fetches.
#[derive(Debug, Clone)]
pub struct Item {
    pub url: String,
    pub name: String,
    pub kind: String,
    pub credits: Credits,
    pub series: Vec<String>,
    pub characters: Vec<String>,
    pub tags: Vec<String>,
    pub published_at: NaiveDateTime,
    pub exclude_reasons: Vec<String>,
}

/// Fields only the item's own page reliably carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDetail {
    pub groups: Vec<String>,
    pub characters: Vec<String>,
}

impl Item {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            kind: String::new(),
            credits: Credits::default(),
            series: Vec::new(),
            characters: Vec::new(),
            tags: Vec::new(),
            published_at: epoch_floor(),
            exclude_reasons: Vec::new(),
        }
    }

    /// The creators this item is attributed to: artists when any are listed,
    /// otherwise groups.
    pub fn credited_creators(&self) -> Option<(CreatorRole, &[String])> {
        if !self.credits.artists.is_empty() {
            Some((CreatorRole::Artist, &self.credits.artists))
        } else if !self.credits.groups.is_empty() {
            Some((CreatorRole::Group, &self.credits.groups))
        } else {
            None
        }
    }

    pub fn artist_count(&self) -> usize {
        self.credits.artists.len()
    }

    pub fn could_be_anthology(&self) -> bool {
        self.artist_count() > PROBE_ANTHOLOGY_THRESHOLD
    }

    /// Appends detail-page fields to what the listing supplied.
    pub fn enrich(&mut self, detail: ItemDetail) {
        self.credits.groups.extend(detail.groups);
        self.characters.extend(detail.characters);
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        write!(f, "\n\tArtists: {:?}", self.credits.artists)?;
        write!(f, "\n\tGroups: {:?}", self.credits.groups)?;
        write!(f, "\n\tSeries: {:?}", self.series)?;
        write!(f, "\n\tType: {}", self.kind)?;
        write!(f, "\n\tCharacters: {:?}", self.characters)?;
        write!(f, "\n\tTags: {:?}", self.tags)?;
        write!(f, "\n\tDate: {}", self.published_at.format(ITEM_DATE_FORMAT))?;
        if !self.exclude_reasons.is_empty() {
            write!(f, "\n\tExclude reasons: {:?}", self.exclude_reasons)?;
        }
        Ok(())
    }
}
