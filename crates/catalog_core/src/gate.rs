use chrono::NaiveDateTime;

use crate::item::Item;
use crate::policy::FilterPolicy;
use crate::state::{Checkpoint, CrawlState};

/// Scope of a top-level run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Normal run: bounded by, and advancing, the checkpoint.
    #[default]
    Full,
    /// Walk the whole listing, ignoring the checkpoint.
    SearchAll,
    /// Only items of one series; never touches the checkpoint.
    SingleSeries(String),
}

impl RunMode {
    pub fn uses_checkpoint(&self) -> bool {
        matches!(self, RunMode::Full)
    }

    /// Policy in effect for this run.
    pub fn effective_policy(&self, policy: &FilterPolicy) -> FilterPolicy {
        match self {
            RunMode::SingleSeries(series) => policy.for_series(series.clone()),
            RunMode::Full | RunMode::SearchAll => policy.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Continue,
    /// Everything from here on was covered by a previous run.
    Stop,
}

/// Stop rule and checkpoint candidate tracking for the top-level listing.
///
/// Relies on the listing being ordered newest first.
#[derive(Debug, Clone)]
pub struct CheckpointGate {
    enabled: bool,
    boundary: NaiveDateTime,
    capture: bool,
}

impl CheckpointGate {
    /// Must be built before the run is marked as started, so a fresh run
    /// can be told apart from a resumed one.
    pub fn new(enabled: bool, state: &CrawlState) -> Self {
        Self {
            enabled,
            boundary: state.checkpoint.time,
            capture: enabled && !state.is_resuming(),
        }
    }

    /// Looks at the next listing item, in order. The first item of a fresh
    /// run is stored on the state as the pending checkpoint.
    pub fn observe(&mut self, item: &Item, state: &mut CrawlState) -> GateDecision {
        if !self.enabled {
            return GateDecision::Continue;
        }
        if self.capture {
            self.capture = false;
            state.pending_checkpoint = Some(Checkpoint {
                time: item.published_at,
                title: item.name.clone(),
            });
        }
        if item.published_at <= self.boundary {
            GateDecision::Stop
        } else {
            GateDecision::Continue
        }
    }

    /// Advances the checkpoint after a normal completion. Never moves it
    /// backwards.
    pub fn commit(&self, state: &mut CrawlState) -> Option<Checkpoint> {
        if !self.enabled {
            return None;
        }
        let pending = state.pending_checkpoint.take()?;
        if pending.time < state.checkpoint.time {
            return None;
        }
        state.checkpoint = pending.clone();
        Some(pending)
    }
}
