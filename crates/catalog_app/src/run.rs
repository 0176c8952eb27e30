//! The three commands of the binary, wired to the engine and the store.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use catalog_core::RunMode;
use catalog_engine::{
    bookmarked_creators, verify_seen_series, BookmarkExporter, ChromiumBookmarks, CrawlEngine,
    CrawlOutput, RunOptions, RunSummary, SeriesVerification, SessionProvider, SnapshotStore,
    StoredState,
};
use engine_logging::{sink_log, LogSink};
use log::Level;

use crate::settings::Settings;

/// How a crawl ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    Completed(RunSummary),
    Interrupted,
}

pub fn snapshot_store(settings: &Settings, sink: Arc<dyn LogSink>) -> SnapshotStore {
    SnapshotStore::new(
        settings.output_dir.clone(),
        settings.state_file.clone(),
        sink,
    )
}

/// A required series stored with the filters turns every run into a
/// single-series run.
pub fn resolve_mode(options: RunOptions, stored: &StoredState) -> RunOptions {
    match (&options.mode, &stored.policy.required_series) {
        (RunMode::SingleSeries(_), _) | (_, None) => options,
        (_, Some(series)) => RunOptions {
            mode: RunMode::SingleSeries(series.clone()),
            ..options
        },
    }
}

/// Backs up, loads, runs the engine until it finishes or `interrupt`
/// resolves, and flushes lists and state on every path.
pub async fn crawl<I>(
    settings: &Settings,
    provider: Arc<dyn SessionProvider>,
    options: RunOptions,
    interrupt: I,
    sink: Arc<dyn LogSink>,
) -> anyhow::Result<CrawlOutcome>
where
    I: Future<Output = ()>,
{
    let started = Instant::now();
    let store = snapshot_store(settings, sink.clone());

    store
        .backup(&settings.backup_dir)
        .context("backing up previous output")?;
    let mut stored = store.load_state().context("loading state")?;
    stored.state.prepare_for_run();
    seed_known_creators(settings, &mut stored, sink.as_ref());

    let mut output = if stored.state.is_resuming() {
        store.load_output().context("loading lists of the interrupted run")?
    } else {
        CrawlOutput::new()
    };
    let options = resolve_mode(options, &stored);

    let engine = CrawlEngine::new(
        provider,
        stored.policy.clone(),
        settings.site(),
        settings.fetch.to_fetch_settings(),
        sink.clone(),
    )
    .with_creator_checks(stored.check_creators);

    // An interrupt wins over a run that happens to be ready in the same poll.
    let result = tokio::select! {
        biased;
        _ = interrupt => None,
        result = engine.run(&mut stored.state, &mut output, &options) => Some(result),
    };

    let outcome = match result {
        None => {
            sink_log!(sink, Level::Warn, "interrupted, dumping lists...");
            store.flush(&stored, &mut output)?;
            CrawlOutcome::Interrupted
        }
        Some(Err(err)) => {
            sink_log!(sink, Level::Error, "{err}, dumping lists...");
            if let Err(flush_err) = store.flush(&stored, &mut output) {
                sink_log!(sink, Level::Error, "could not save progress: {flush_err}");
            }
            return Err(err.into());
        }
        Some(Ok(summary)) => {
            let finished = finish(
                settings,
                &store,
                &mut stored,
                &mut output,
                &options,
                sink.clone(),
            );
            if let Err(err) = finished {
                if let Err(flush_err) = store.flush(&stored, &mut output) {
                    sink_log!(sink, Level::Error, "could not save progress: {flush_err}");
                }
                return Err(err);
            }
            CrawlOutcome::Completed(summary)
        }
    };

    sink_log!(sink, Level::Info, "Total time: {:?}", started.elapsed());
    Ok(outcome)
}

/// Lists, export and unread report, then the run is marked complete.
fn finish(
    settings: &Settings,
    store: &SnapshotStore,
    stored: &mut StoredState,
    output: &mut CrawlOutput,
    options: &RunOptions,
    sink: Arc<dyn LogSink>,
) -> anyhow::Result<()> {
    store.save_output(output)?;
    let series = match &options.mode {
        RunMode::SingleSeries(series) => Some(series.as_str()),
        RunMode::Full | RunMode::SearchAll => None,
    };
    BookmarkExporter::new(settings.output_dir.clone(), sink.clone()).export(
        &output.accepted,
        &output.accepted_creators,
        series,
    )?;

    if !stored.state.unread_series.is_empty() {
        let later = settings.later_series()?;
        sink_log!(
            sink,
            Level::Info,
            "Unread Series: {:?}",
            stored.state.unread_not_planned(&later)
        );
    }

    stored.state.finish_run();
    store.save_state(stored)?;
    Ok(())
}

/// Adds the creators bookmarked in the configured folders to the known
/// set. An unreadable bookmarks file is reported and skipped.
fn seed_known_creators(settings: &Settings, stored: &mut StoredState, sink: &dyn LogSink) {
    let Some(path) = &settings.bookmarks_file else {
        return;
    };
    match ChromiumBookmarks::load(path) {
        Ok(bookmarks) => {
            let names = bookmarked_creators(&bookmarks, &settings.creator_folders, sink);
            let added = stored.state.seed_creators(names);
            sink_log!(sink, Level::Info, "{added} creators added from bookmarks");
        }
        Err(err) => sink_log!(sink, Level::Warn, "{err}"),
    }
}

/// Re-checks every seen series and keeps only those that still resolve.
/// The state is saved whether or not the check finished.
pub async fn verify_series(
    settings: &Settings,
    provider: Arc<dyn SessionProvider>,
    sink: Arc<dyn LogSink>,
) -> anyhow::Result<SeriesVerification> {
    let store = snapshot_store(settings, sink.clone());
    let mut stored = store.load_state().context("loading state")?;

    let result = verify_seen_series(
        provider.as_ref(),
        &settings.site(),
        &stored.state.seen_series,
        &settings.fetch.to_fetch_settings(),
        sink.as_ref(),
    )
    .await;

    match result {
        Ok(verification) => {
            stored.state.seen_series = verification.kept.clone();
            store.save_state(&stored)?;
            Ok(verification)
        }
        Err(err) => {
            sink_log!(sink, Level::Error, "{err}, dumping state...");
            store.save_state(&stored)?;
            Err(err.into())
        }
    }
}

/// Writes the bookmark file again from the saved lists.
pub fn export(settings: &Settings, sink: Arc<dyn LogSink>) -> anyhow::Result<()> {
    let store = snapshot_store(settings, sink.clone());
    let stored = store.load_state().context("loading state")?;
    let output = store.load_output().context("loading lists")?;
    BookmarkExporter::new(settings.output_dir.clone(), sink).export(
        &output.accepted,
        &output.accepted_creators,
        stored.policy.required_series.as_deref(),
    )?;
    Ok(())
}
