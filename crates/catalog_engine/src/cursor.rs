use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::Arc;

use catalog_core::{Item, ITEM_DATE_FORMAT};
use engine_logging::{sink_log, LogSink};
use log::Level;

use crate::fetch::{fetch_listing_page, FetchSettings};
use crate::listing::{describe_pager, next_page_url, page_items};
use crate::source::PageSource;
use crate::types::CrawlError;

/// Inclusive, 1-based range of listing pages a run is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    first: usize,
    last: usize,
}

impl PageWindow {
    pub fn new(first: usize, last: usize) -> Result<Self, CrawlError> {
        let reason = if first == 0 {
            Some("pages are numbered from 1")
        } else if first > last {
            Some("first page is after the last")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(CrawlError::InvalidInterval {
                first,
                last,
                reason: reason.to_string(),
            }),
            None => Ok(Self { first, last }),
        }
    }

    pub fn first(&self) -> usize {
        self.first
    }

    pub fn last(&self) -> usize {
        self.last
    }

    fn contains(&self, page: usize) -> bool {
        (self.first..=self.last).contains(&page)
    }
}

impl FromStr for PageWindow {
    type Err = CrawlError;

    /// `3-7`, or `4` for a single page.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CrawlError::InvalidInterval {
            first: 0,
            last: 0,
            reason: format!("'{s}' is not of the form A-B"),
        };
        let (first, last) = match s.split_once('-') {
            Some((first, last)) => (first, last),
            None => (s, s),
        };
        let first = first.trim().parse().map_err(|_| invalid())?;
        let last = last.trim().parse().map_err(|_| invalid())?;
        Self::new(first, last)
    }
}

/// Pull-style walk over a listing, one item at a time.
///
/// Pages are loaded lazily on demand. The cursor is not restartable: once it
/// reports the end (or is dropped) a new cursor has to be built from a url.
pub struct ListingCursor {
    start_url: String,
    next_url: Option<String>,
    buffered: VecDeque<Item>,
    page: usize,
    window: Option<PageWindow>,
    settings: FetchSettings,
    sink: Arc<dyn LogSink>,
}

impl ListingCursor {
    pub fn new(
        start_url: impl Into<String>,
        settings: FetchSettings,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        let start_url = start_url.into();
        Self {
            next_url: Some(start_url.clone()),
            start_url,
            buffered: VecDeque::new(),
            page: 0,
            window: None,
            settings,
            sink,
        }
    }

    pub fn with_window(mut self, window: Option<PageWindow>) -> Self {
        self.window = window;
        self
    }

    /// Number of pages loaded so far.
    pub fn pages_loaded(&self) -> usize {
        self.page
    }

    /// The next item, or `None` once the listing (or window) is exhausted.
    pub async fn next<S>(&mut self, source: &mut S) -> Result<Option<Item>, CrawlError>
    where
        S: PageSource + ?Sized,
    {
        loop {
            if let Some(item) = self.buffered.pop_front() {
                return Ok(Some(item));
            }
            if !self.load_next_page(source).await? {
                return Ok(None);
            }
        }
    }

    async fn load_next_page<S>(&mut self, source: &mut S) -> Result<bool, CrawlError>
    where
        S: PageSource + ?Sized,
    {
        let Some(url) = self.next_url.take() else {
            self.check_window_reached()?;
            return Ok(false);
        };
        if let Some(window) = self.window {
            if self.page >= window.last {
                return Ok(false);
            }
        }

        let page = fetch_listing_page(source, &url, &self.settings, self.sink.as_ref()).await?;
        self.page += 1;
        let items = page_items(&page, &url)?;
        self.next_url = next_page_url(&page.page_links);
        if let Some(first) = items.first() {
            sink_log!(
                self.sink,
                Level::Info,
                "Page {}: {}",
                self.page,
                first.published_at.format(ITEM_DATE_FORMAT)
            );
        }
        if self.next_url.is_some() {
            sink_log!(self.sink, Level::Debug, "{}", describe_pager(&page.page_links));
        }

        if self.window.map_or(true, |window| window.contains(self.page)) {
            self.buffered.extend(items);
        }
        Ok(true)
    }

    fn check_window_reached(&self) -> Result<(), CrawlError> {
        match self.window {
            Some(window) if self.page < window.first => Err(CrawlError::InvalidInterval {
                first: window.first,
                last: window.last,
                reason: format!("{} has only {} pages", self.start_url, self.page),
            }),
            _ => Ok(()),
        }
    }
}
