use std::collections::BTreeSet;

use catalog_core::Site;
use engine_logging::{sink_log, LogSink};
use log::Level;

use crate::fetch::FetchSettings;
use crate::source::SessionProvider;
use crate::types::{CrawlError, FailureKind};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesVerification {
    pub kept: BTreeSet<String>,
    pub dropped: Vec<String>,
}

/// Re-visits every seen series and keeps those whose listing still
/// resolves. A page that times out counts as not resolving.
pub async fn verify_seen_series(
    provider: &dyn SessionProvider,
    site: &Site,
    series: &BTreeSet<String>,
    settings: &FetchSettings,
    sink: &dyn LogSink,
) -> Result<SeriesVerification, CrawlError> {
    let mut session = provider.acquire().map_err(CrawlError::Session)?;
    let mut result = SeriesVerification::default();

    for (index, name) in series.iter().enumerate() {
        sink_log!(sink, Level::Info, "{}/{}", index + 1, series.len());
        let url = site.series_url(name);
        let probe = tokio::time::timeout(settings.page_timeout, session.resolves(&url));
        let resolves = match probe.await {
            Ok(Ok(resolves)) => resolves,
            Ok(Err(err)) if err.kind == FailureKind::Timeout => false,
            Ok(Err(err)) => {
                return Err(CrawlError::FatalPage {
                    url,
                    attempts: 1,
                    source: err,
                })
            }
            Err(_) => false,
        };
        if resolves {
            result.kept.insert(name.clone());
        } else {
            sink_log!(sink, Level::Debug, "\t{name} does not resolve");
            result.dropped.push(name.clone());
        }
    }

    sink_log!(sink, Level::Info, "Invalid series names: {:?}", result.dropped);
    Ok(result)
}
