use std::collections::HashSet;
use std::sync::Arc;

use catalog_core::{
    classify, Checkpoint, CheckpointGate, CrawlState, Creator, CreatorRole, Disposition,
    FilterPolicy, GateDecision, Item, RunMode, Site, ITEM_DATE_FORMAT,
};
use engine_logging::{sink_log, LogSink};
use log::Level;

use crate::cursor::{ListingCursor, PageWindow};
use crate::fetch::{enrich_from_detail, FetchSettings};
use crate::output::CrawlOutput;
use crate::source::{Session, SessionProvider};
use crate::types::CrawlError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub mode: RunMode,
    pub window: Option<PageWindow>,
}

impl RunOptions {
    /// Only an unrestricted full run is bounded by, and advances, the
    /// checkpoint.
    pub fn uses_checkpoint(&self) -> bool {
        self.mode.uses_checkpoint() && self.window.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    /// Reached an item covered by an earlier run.
    Stopped,
    /// Ran out of listing pages.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub end: RunEnd,
    pub visited: usize,
    pub skipped: usize,
    pub checkpoint: Option<Checkpoint>,
}

/// Walks the listing, deciding every item against the filter policy and
/// probing newly credited creators.
pub struct CrawlEngine {
    provider: Arc<dyn SessionProvider>,
    policy: FilterPolicy,
    site: Site,
    settings: FetchSettings,
    check_creators: bool,
    sink: Arc<dyn LogSink>,
}

impl CrawlEngine {
    pub fn new(
        provider: Arc<dyn SessionProvider>,
        policy: FilterPolicy,
        site: Site,
        settings: FetchSettings,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            provider,
            policy,
            site,
            settings,
            check_creators: true,
            sink,
        }
    }

    pub fn with_creator_checks(mut self, enabled: bool) -> Self {
        self.check_creators = enabled;
        self
    }

    /// Runs one top-level crawl.
    ///
    /// The state is marked as in progress on entry and left that way; the
    /// caller finishes the run after exporting. Decided item ids survive an
    /// error or a dropped future, so the next run resumes where this one
    /// stopped.
    pub async fn run(
        &self,
        state: &mut CrawlState,
        output: &mut CrawlOutput,
        options: &RunOptions,
    ) -> Result<RunSummary, CrawlError> {
        let policy = options.mode.effective_policy(&self.policy);
        let mut gate = CheckpointGate::new(options.uses_checkpoint(), state);
        if state.is_resuming() {
            sink_log!(
                self.sink,
                Level::Info,
                "Resuming, {} items already decided",
                state.decided_item_ids.len()
            );
        }
        state.begin_run();

        let url = self.site.search_url(&policy);
        sink_log!(self.sink, Level::Info, "Searching page: {url}");
        let mut session = self.provider.acquire().map_err(CrawlError::Session)?;
        let mut cursor = ListingCursor::new(url, self.settings.clone(), self.sink.clone())
            .with_window(options.window);

        let mut visited = 0;
        let mut skipped = 0;
        let end = loop {
            let Some(mut item) = cursor.next(session.as_mut()).await? else {
                break RunEnd::Exhausted;
            };
            visited += 1;
            sink_log!(self.sink, Level::Info, "{visited}: {}", item.name);

            if gate.observe(&item, state) == GateDecision::Stop {
                sink_log!(
                    self.sink,
                    Level::Info,
                    "\tStop at {} {}",
                    item.published_at.format(ITEM_DATE_FORMAT),
                    item.name
                );
                break RunEnd::Stopped;
            }
            if state.is_decided(&item.url) {
                sink_log!(self.sink, Level::Debug, "\tskipped");
                skipped += 1;
                continue;
            }

            if self.decide(&policy, session.as_mut(), &mut item).await {
                let disposition = classify(&policy, state, &item);
                let included = disposition.is_included();
                let credited = item.credited_creators().map(|(role, names)| (role, names.to_vec()));
                self.record(disposition, item.clone(), state, output);
                if included && self.check_creators {
                    if let Some((role, names)) = credited {
                        self.discover_creators(&policy, role, &names, state, output)
                            .await?;
                    }
                }
            } else {
                sink_log!(self.sink, Level::Info, "\t- {:?}", item.exclude_reasons);
                output.exclude(item.clone());
            }
            state.mark_decided(&item.url);
        };

        let checkpoint = gate.commit(state);
        if let Some(checkpoint) = &checkpoint {
            sink_log!(
                self.sink,
                Level::Info,
                "New checkpoint: {} {}",
                checkpoint.time.format(ITEM_DATE_FORMAT),
                checkpoint.title
            );
        }
        Ok(RunSummary {
            end,
            visited,
            skipped,
            checkpoint,
        })
    }

    /// Two-pass filter: listing fields first, then the detail page when the
    /// listing alone cannot be trusted. The second pass decides.
    async fn decide(
        &self,
        policy: &FilterPolicy,
        session: &mut dyn Session,
        item: &mut Item,
    ) -> bool {
        let first = policy.evaluate_listing(item);
        if first.accepted && policy.needs_detail(item) {
            enrich_from_detail(session, item, &self.settings, self.sink.as_ref()).await;
            return policy.apply(item);
        }
        item.exclude_reasons.extend(first.reasons);
        first.accepted
    }

    fn record(
        &self,
        disposition: Disposition,
        mut item: Item,
        state: &mut CrawlState,
        output: &mut CrawlOutput,
    ) {
        let description = disposition.describe();
        match disposition {
            Disposition::UnreadSeries(series) => {
                state.unread_series.extend(series);
                sink_log!(self.sink, Level::Info, "\t- {description}");
                item.exclude_reasons.push(description);
                output.exclude(item);
            }
            Disposition::Original
            | Disposition::RequiredSeries(_)
            | Disposition::SeenSeries(_) => {
                sink_log!(self.sink, Level::Info, "\t+ {description}");
                output.accept(item);
            }
        }
    }

    async fn discover_creators(
        &self,
        policy: &FilterPolicy,
        role: CreatorRole,
        names: &[String],
        state: &mut CrawlState,
        output: &mut CrawlOutput,
    ) -> Result<(), CrawlError> {
        for name in names {
            if state.knows_creator(name) {
                sink_log!(self.sink, Level::Debug, "\tCreator seen already: {name}");
                continue;
            }
            let creator = self.site.creator(role, name);
            let admitted = self.probe_creator(policy, &creator, output).await?;
            state.remember_creator(name);

            let label = role_label(role);
            if admitted {
                sink_log!(self.sink, Level::Info, "\t\t+ {label} {name}");
                output.accept_creator(creator);
            } else {
                sink_log!(self.sink, Level::Info, "\t\t- {label} {name}");
                output.reject_creator(creator);
            }
        }
        Ok(())
    }

    /// Scans a creator's own listing from the top until enough distinct,
    /// non-anthology titles pass the policy. Runs on its own session; the
    /// parent's session and cursor wait until it returns.
    pub async fn probe_creator(
        &self,
        policy: &FilterPolicy,
        creator: &Creator,
        output: &mut CrawlOutput,
    ) -> Result<bool, CrawlError> {
        let minimum = policy.creator_minimum_accepted_count;
        if minimum == 0 {
            return Ok(true);
        }

        sink_log!(self.sink, Level::Info, "\tSearching creator page: {}", creator.url);
        let mut session = self.provider.acquire().map_err(CrawlError::Session)?;
        let mut cursor =
            ListingCursor::new(creator.url.clone(), self.settings.clone(), self.sink.clone());

        let mut titles: HashSet<String> = HashSet::new();
        while let Some(mut item) = cursor.next(session.as_mut()).await? {
            if item.could_be_anthology() {
                sink_log!(self.sink, Level::Debug, "\t\tskipping anthology {}", item.name);
                continue;
            }
            if self.decide(policy, session.as_mut(), &mut item).await {
                if titles.insert(item.name.clone()) {
                    sink_log!(self.sink, Level::Debug, "\t\tNew created title");
                }
                output.accept(item);
                if titles.len() >= minimum {
                    return Ok(true);
                }
            } else {
                output.exclude(item);
            }
        }
        Ok(false)
    }
}

fn role_label(role: CreatorRole) -> &'static str {
    match role {
        CreatorRole::Artist => "artist",
        CreatorRole::Group => "group",
    }
}
