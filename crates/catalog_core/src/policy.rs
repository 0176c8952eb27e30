use std::collections::BTreeSet;

use crate::item::Item;

/// User inclusion rules. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPolicy {
    pub excluded_types: BTreeSet<String>,
    pub required_tags: BTreeSet<String>,
    pub excluded_tags: BTreeSet<String>,
    pub required_characters: BTreeSet<String>,
    pub required_series: Option<String>,
    /// 0 disables the ceiling.
    pub max_creator_count: usize,
    pub creator_minimum_accepted_count: usize,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            excluded_types: BTreeSet::new(),
            required_tags: BTreeSet::new(),
            excluded_tags: BTreeSet::new(),
            required_characters: BTreeSet::new(),
            required_series: None,
            max_creator_count: 2,
            creator_minimum_accepted_count: 2,
        }
    }
}

/// Outcome of evaluating every rule against one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub accepted: bool,
    pub reasons: Vec<String>,
}

impl FilterPolicy {
    /// Same rules, restricted to a single series.
    pub fn for_series(&self, series: impl Into<String>) -> Self {
        Self {
            required_series: Some(series.into()),
            ..self.clone()
        }
    }

    /// Listing data alone cannot be trusted when characters are filtered
    /// on (the listing never carries them) or no artist is listed.
    pub fn needs_detail(&self, item: &Item) -> bool {
        !self.required_characters.is_empty() || item.credits.artists.is_empty()
    }

    /// Runs all six rules without short-circuiting and returns every
    /// failing reason.
    pub fn evaluate(&self, item: &Item) -> Evaluation {
        self.evaluate_rules(item, true)
    }

    /// First pass on listing data. Listings never carry characters, so the
    /// character rule waits for the detail page.
    pub fn evaluate_listing(&self, item: &Item) -> Evaluation {
        self.evaluate_rules(item, false)
    }

    fn evaluate_rules(&self, item: &Item, check_characters: bool) -> Evaluation {
        let mut reasons = Vec::new();

        if self.excluded_types.contains(&item.kind) {
            reasons.push(format!("Is of type {}", item.kind));
        }

        let forbidden: Vec<&str> = self
            .excluded_tags
            .iter()
            .filter(|tag| item.tags.contains(tag))
            .map(String::as_str)
            .collect();
        if !forbidden.is_empty() {
            reasons.push(format!("Contains tags {forbidden:?}"));
        }

        let missing_tags = missing_from(&self.required_tags, &item.tags);
        if !missing_tags.is_empty() {
            reasons.push(format!("Doesn't contain tags {missing_tags:?}"));
        }

        if let Some(series) = &self.required_series {
            if !item.series.contains(series) {
                reasons.push(format!("Doesn't contain series {series}"));
            }
        }

        if check_characters {
            let missing_characters = missing_from(&self.required_characters, &item.characters);
            if !missing_characters.is_empty() {
                reasons.push(format!("Doesn't contain characters {missing_characters:?}"));
            }
        }

        let artists = item.artist_count();
        if self.max_creator_count > 0 && artists > self.max_creator_count {
            reasons.push(format!(
                "More than {} artists ({artists} > {})",
                self.max_creator_count, self.max_creator_count
            ));
        }

        Evaluation {
            accepted: reasons.is_empty(),
            reasons,
        }
    }

    /// Evaluates and records the reasons on the item itself.
    pub fn apply(&self, item: &mut Item) -> bool {
        let evaluation = self.evaluate(item);
        item.exclude_reasons.extend(evaluation.reasons);
        evaluation.accepted
    }
}

fn missing_from<'a>(required: &'a BTreeSet<String>, present: &[String]) -> Vec<&'a str> {
    required
        .iter()
        .filter(|name| !present.contains(name))
        .map(String::as_str)
        .collect()
}
