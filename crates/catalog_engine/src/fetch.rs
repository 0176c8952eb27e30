use std::time::Duration;

use catalog_core::{Item, ItemDetail};
use engine_logging::{sink_log, LogSink};
use log::Level;

use crate::source::{DetailSource, PageSource};
use crate::types::{CrawlError, FailureKind, FetchError, RawPage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub page_timeout: Duration,
    pub max_attempts: usize,
    pub detail_timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            page_timeout: Duration::from_secs(30),
            max_attempts: 3,
            detail_timeout: Duration::from_secs(30),
        }
    }
}

/// Loads a listing page, bounding every attempt with the page timeout.
/// Transient failures are retried after a reload; anything else, or running
/// out of attempts, is fatal for the run.
pub async fn fetch_listing_page<S>(
    source: &mut S,
    url: &str,
    settings: &FetchSettings,
    sink: &dyn LogSink,
) -> Result<RawPage, CrawlError>
where
    S: PageSource + ?Sized,
{
    let attempts = settings.max_attempts.max(1);
    let mut last_error = FetchError::new(FailureKind::Timeout, "no attempt made");

    for attempt in 1..=attempts {
        if attempt > 1 {
            sink_log!(
                sink,
                Level::Warn,
                "{last_error}, trying again ({attempt}/{attempts})"
            );
            if let Err(err) = source.reload().await {
                sink_log!(sink, Level::Warn, "reload failed: {err}");
            }
        }

        match tokio::time::timeout(settings.page_timeout, source.fetch_page(url)).await {
            Ok(Ok(page)) => return Ok(page),
            Ok(Err(err)) if err.is_transient() => last_error = err,
            Ok(Err(err)) => {
                return Err(CrawlError::FatalPage {
                    url: url.to_string(),
                    attempts: attempt,
                    source: err,
                })
            }
            Err(_) => {
                last_error = FetchError::new(
                    FailureKind::Timeout,
                    format!("no page within {:?}", settings.page_timeout),
                )
            }
        }
    }

    Err(CrawlError::FatalPage {
        url: url.to_string(),
        attempts,
        source: last_error,
    })
}

/// Enriches `item` from its detail page, retrying transient failures
/// after a reload like listing pages. A detail page that stays unavailable
/// leaves the item as it was and is only logged.
pub async fn enrich_from_detail<S>(
    source: &mut S,
    item: &mut Item,
    settings: &FetchSettings,
    sink: &dyn LogSink,
) -> bool
where
    S: PageSource + DetailSource + ?Sized,
{
    let attempts = settings.max_attempts.max(1);
    let mut last_error = FetchError::new(FailureKind::Timeout, "no attempt made");

    for attempt in 1..=attempts {
        if attempt > 1 {
            sink_log!(
                sink,
                Level::Warn,
                "{last_error}, trying again ({attempt}/{attempts})"
            );
            if let Err(err) = source.reload().await {
                sink_log!(sink, Level::Warn, "reload failed: {err}");
            }
        }

        let fetch = tokio::time::timeout(settings.detail_timeout, source.fetch_detail(&item.url));
        let detail: Result<ItemDetail, FetchError> = match fetch.await {
            Ok(result) => result,
            Err(_) => Err(FetchError::new(
                FailureKind::Timeout,
                format!("no detail within {:?}", settings.detail_timeout),
            )),
        };

        match detail {
            Ok(detail) => {
                item.enrich(detail);
                return true;
            }
            Err(err) if err.is_transient() => last_error = err,
            Err(err) => {
                last_error = err;
                break;
            }
        }
    }

    sink_log!(
        sink,
        Level::Warn,
        "item detail of {} unavailable: {last_error}",
        item.url
    );
    false
}
