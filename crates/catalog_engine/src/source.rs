use catalog_core::ItemDetail;

use crate::types::{FetchError, RawPage};

/// Supplies listing pages, in the origin's order.
#[async_trait::async_trait]
pub trait PageSource: Send {
    async fn fetch_page(&mut self, url: &str) -> Result<RawPage, FetchError>;

    /// Reloads whatever the session last navigated to. Called before each
    /// retry of a failed page.
    async fn reload(&mut self) -> Result<(), FetchError>;

    /// True when `url` renders as a listing with at least one item.
    async fn resolves(&mut self, url: &str) -> Result<bool, FetchError>;
}

/// Best-effort enrichment from an item's own page.
#[async_trait::async_trait]
pub trait DetailSource: Send {
    async fn fetch_detail(&mut self, item_url: &str) -> Result<ItemDetail, FetchError>;
}

/// One navigation handle: a browser tab, an HTTP client, a test script.
pub trait Session: PageSource + DetailSource {}

impl<T: PageSource + DetailSource + ?Sized> Session for T {}

/// Hands out sessions. A session is released when its box is dropped, so
/// nested acquisitions unwind most recent first.
pub trait SessionProvider: Send + Sync {
    fn acquire(&self) -> Result<Box<dyn Session>, FetchError>;
}
