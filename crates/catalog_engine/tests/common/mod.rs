#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use catalog_core::ItemDetail;
use catalog_engine::{
    DetailSource, FailureKind, FetchError, PageLink, PageSource, RawPage, Session, SessionProvider,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

pub const BASE: &str = "https://example.org";

pub fn item_url(id: u32) -> String {
    format!("{BASE}/galleries/{id}.html")
}

/// One listing row.
#[derive(Clone)]
pub struct Row {
    pub id: u32,
    pub title: String,
    pub kind: String,
    pub artists: Vec<String>,
    pub series: Vec<String>,
    pub tags: Vec<String>,
    pub day: u32,
}

pub fn row(id: u32, title: &str, artists: &[&str], day: u32) -> Row {
    Row {
        id,
        title: title.to_string(),
        kind: "manga".to_string(),
        artists: artists.iter().map(|a| a.to_string()).collect(),
        series: Vec::new(),
        tags: Vec::new(),
        day,
    }
}

impl Row {
    pub fn series(mut self, series: &[&str]) -> Self {
        self.series = series.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }
}

/// A listing page; `next` becomes the pager link after the current page.
pub fn page(rows: &[Row], next: Option<&str>) -> RawPage {
    let mut page = RawPage::default();
    for row in rows {
        page.titles.push(row.title.clone());
        page.urls.push(item_url(row.id));
        page.types.push(row.kind.clone());
        page.series.push(row.series.clone());
        page.artists.push(row.artists.clone());
        page.tags.push(row.tags.clone());
        page.dates.push(format!("2024-01-{:02} 12:00:00-06", row.day));
    }
    page.page_links.push(PageLink::current("1"));
    if let Some(next) = next {
        page.page_links.push(PageLink::to("2", next));
    }
    page
}

/// Canned origin shared by every session it hands out.
#[derive(Default)]
pub struct Script {
    pages: HashMap<String, RawPage>,
    details: HashMap<String, ItemDetail>,
    failing_details: HashSet<String>,
    hanging: HashSet<String>,
    transient_failures: Mutex<HashMap<String, usize>>,
    flaky_details: Mutex<HashMap<String, usize>>,
    fetched: Mutex<Vec<String>>,
    reloads: AtomicUsize,
    open_sessions: AtomicUsize,
    max_open_sessions: AtomicUsize,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, page: RawPage) -> Self {
        self.pages.insert(url.into(), page);
        self
    }

    pub fn with_detail(mut self, item_url: impl Into<String>, detail: ItemDetail) -> Self {
        self.details.insert(item_url.into(), detail);
        self
    }

    pub fn with_failing_detail(mut self, item_url: impl Into<String>) -> Self {
        self.failing_details.insert(item_url.into());
        self
    }

    /// The detail page times out `times` times before loading.
    pub fn with_flaky_detail(self, item_url: impl Into<String>, times: usize) -> Self {
        if let Ok(mut failures) = self.flaky_details.lock() {
            failures.insert(item_url.into(), times);
        }
        self
    }

    /// The page never answers.
    pub fn with_hanging_page(mut self, url: impl Into<String>) -> Self {
        self.hanging.insert(url.into());
        self
    }

    /// The page fails with a network error `times` times before loading.
    pub fn with_flaky_page(self, url: impl Into<String>, times: usize) -> Self {
        if let Ok(mut failures) = self.transient_failures.lock() {
            failures.insert(url.into(), times);
        }
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.fetched().iter().filter(|u| *u == url).count()
    }

    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }

    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    pub fn max_open_sessions(&self) -> usize {
        self.max_open_sessions.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
pub struct ScriptedProvider {
    pub script: Arc<Script>,
}

impl ScriptedProvider {
    pub fn new(script: Script) -> Self {
        Self {
            script: Arc::new(script),
        }
    }
}

impl SessionProvider for ScriptedProvider {
    fn acquire(&self) -> Result<Box<dyn Session>, FetchError> {
        let open = self.script.open_sessions.fetch_add(1, Ordering::SeqCst) + 1;
        self.script.max_open_sessions.fetch_max(open, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            script: self.script.clone(),
        }))
    }
}

struct ScriptedSession {
    script: Arc<Script>,
}

impl Drop for ScriptedSession {
    fn drop(&mut self) {
        self.script.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl PageSource for ScriptedSession {
    async fn fetch_page(&mut self, url: &str) -> Result<RawPage, FetchError> {
        self.script.fetched.lock().unwrap().push(url.to_string());
        if self.script.hanging.contains(url) {
            std::future::pending::<()>().await;
        }
        {
            let mut failures = self.script.transient_failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(url) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(FetchError::new(FailureKind::Network, "connection reset"));
                }
            }
        }
        self.script
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::new(FailureKind::HttpStatus(404), url.to_string()))
    }

    async fn reload(&mut self) -> Result<(), FetchError> {
        self.script.reloads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn resolves(&mut self, url: &str) -> Result<bool, FetchError> {
        Ok(self
            .script
            .pages
            .get(url)
            .is_some_and(|page| !page.titles.is_empty()))
    }
}

#[async_trait::async_trait]
impl DetailSource for ScriptedSession {
    async fn fetch_detail(&mut self, item_url: &str) -> Result<ItemDetail, FetchError> {
        if self.script.failing_details.contains(item_url) {
            return Err(FetchError::new(FailureKind::Navigation, "detail page broke"));
        }
        {
            let mut failures = self.script.flaky_details.lock().unwrap();
            if let Some(remaining) = failures.get_mut(item_url) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(FetchError::new(FailureKind::Timeout, "detail page timed out"));
                }
            }
        }
        Ok(self.script.details.get(item_url).cloned().unwrap_or_default())
    }
}
