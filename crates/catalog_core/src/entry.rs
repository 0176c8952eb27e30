use crate::creator::Creator;
use crate::item::Item;

/// Anything that ends up as a bookmark or in a persisted list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Item(Item),
    Creator(Creator),
}

impl Entry {
    pub fn name(&self) -> &str {
        match self {
            Entry::Item(item) => &item.name,
            Entry::Creator(creator) => &creator.name,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Entry::Item(item) => &item.url,
            Entry::Creator(creator) => &creator.url,
        }
    }

    /// Identity used when de-duplicating persisted lists.
    pub fn identity(&self) -> &str {
        match self {
            Entry::Item(item) => &item.url,
            Entry::Creator(creator) => &creator.name,
        }
    }

    /// Link title: items are prefixed with their credited creators,
    /// `a,b | name`; creators use their name.
    pub fn bookmark_title(&self) -> String {
        match self {
            Entry::Item(item) => {
                let name = escape_markup(&item.name);
                match item.credited_creators() {
                    Some((_, creators)) => format!("{} | {name}", creators.join(",")),
                    None => name,
                }
            }
            Entry::Creator(creator) => escape_markup(&creator.name),
        }
    }
}

impl From<Item> for Entry {
    fn from(item: Item) -> Self {
        Entry::Item(item)
    }
}

impl From<Creator> for Entry {
    fn from(creator: Creator) -> Self {
        Entry::Creator(creator)
    }
}

pub(crate) fn escape_markup(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}
