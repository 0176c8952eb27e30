use crate::item::Item;
use crate::policy::FilterPolicy;
use crate::state::CrawlState;

/// Series names the origin uses when a work belongs to no series.
pub const NO_SERIES_PLACEHOLDERS: [&str; 2] = ["original", "n/a"];

/// What happens to an item that passed the filter policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Not part of any series.
    Original,
    /// Carries the series the run is restricted to.
    RequiredSeries(String),
    /// Belongs to series the user already reads.
    SeenSeries(Vec<String>),
    /// Belongs only to series the user has not vetted yet.
    UnreadSeries(Vec<String>),
}

impl Disposition {
    pub fn is_included(&self) -> bool {
        !matches!(self, Disposition::UnreadSeries(_))
    }

    /// Log line / exclusion reason for this disposition.
    pub fn describe(&self) -> String {
        match self {
            Disposition::Original => "original work".to_string(),
            Disposition::RequiredSeries(series) => format!("is from series {series}"),
            Disposition::SeenSeries(series) => format!("is from seen series: {series:?}"),
            Disposition::UnreadSeries(series) => format!("Unread series: {series:?}"),
        }
    }
}

pub fn is_original(item: &Item) -> bool {
    match item.series.first() {
        None => true,
        Some(first) => NO_SERIES_PLACEHOLDERS.contains(&first.as_str()),
    }
}

/// Classifies an accepted item. Pure: does not touch the state.
pub fn classify(policy: &FilterPolicy, state: &CrawlState, item: &Item) -> Disposition {
    if let Some(series) = &policy.required_series {
        if item.series.contains(series) {
            return Disposition::RequiredSeries(series.clone());
        }
    }

    let seen: Vec<String> = item
        .series
        .iter()
        .filter(|name| state.seen_series.contains(*name))
        .cloned()
        .collect();
    if !seen.is_empty() {
        return Disposition::SeenSeries(seen);
    }

    if is_original(item) {
        return Disposition::Original;
    }

    let unread = item
        .series
        .iter()
        .filter(|name| !state.seen_series.contains(*name))
        .cloned()
        .collect();
    Disposition::UnreadSeries(unread)
}
