// ABOUTME: Feed generation orchestrator for the watchfeed ranking engine.
// ABOUTME: Composes rule filtering, disqualification, ratio mixing, resurfacing, diversity, and enrichment.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::chooser::{Chooser, RandomChooser};
use crate::config::FeedConfig;
use crate::diversity::enforce_source_diversity;
use crate::error::RankerError;
use crate::mixing::{backlog_quota, categorize_by_recency, interleave_evenly};
use crate::models::{
    ContentInteraction, ContentItem, ContentSource, FeedItem, FeedPreferences, InteractionKind,
    SourceType,
};
use crate::rules::{FilterRule, RuleSet};

/// Display name used when an item's source has no entry in the user's sources.
pub const UNKNOWN_SOURCE_NAME: &str = "Unknown";

/// Builds one bounded, fully ordered feed per invocation.
///
/// Pure computation over the argument collections: no I/O, no shared state
/// between calls, safe to run concurrently for different users. All
/// randomness goes through the injected [`Chooser`].
#[derive(Debug, Clone)]
pub struct FeedGenerator {
    config: FeedConfig,
}

impl Default for FeedGenerator {
    fn default() -> Self {
        Self::new(FeedConfig::default())
    }
}

impl FeedGenerator {
    pub fn new(config: FeedConfig) -> Self {
        Self {
            config: config.clamped(),
        }
    }

    /// Generates a feed at the current time with OS-seeded randomness.
    pub fn generate(
        &self,
        sources: &[ContentSource],
        content_pool: Vec<ContentItem>,
        rules: &[FilterRule],
        preferences: &FeedPreferences,
        interactions: &[ContentInteraction],
    ) -> Result<Vec<FeedItem>, RankerError> {
        let mut chooser = RandomChooser::from_entropy();
        self.generate_at(
            sources,
            content_pool,
            rules,
            preferences,
            interactions,
            Utc::now(),
            &mut chooser,
        )
    }

    /// Generates a feed with an explicit generation time and chooser.
    ///
    /// Stages, each operating on the output of the previous:
    /// 1. Drop items from muted sources.
    /// 2. Apply filter rules (keyword/duration policy).
    /// 3. Drop items with a terminal interaction; set NotNow items aside as
    ///    the deferred pool.
    /// 4. Categorize survivors by recency and admit backlog per the ratio
    ///    quota, most-recent-first within each class.
    /// 5. Resurface a chooser-picked slice of deferred items, capped at
    ///    `resurface_fraction` of the pre-resurfacing feed size.
    /// 6. Enforce source diversity.
    /// 7. Enrich with display names and interaction state, assign positions,
    ///    truncate to the feed size cap.
    #[allow(clippy::too_many_arguments)]
    pub fn generate_at(
        &self,
        sources: &[ContentSource],
        content_pool: Vec<ContentItem>,
        rules: &[FilterRule],
        preferences: &FeedPreferences,
        interactions: &[ContentInteraction],
        now: DateTime<Utc>,
        chooser: &mut dyn Chooser,
    ) -> Result<Vec<FeedItem>, RankerError> {
        let prefs = preferences.clamped();
        let rule_set = RuleSet::new(rules)?;

        if content_pool.is_empty() {
            return Ok(Vec::new());
        }

        // Muted sources are excluded here, once, for every generation.
        let mut muted: HashMap<SourceType, HashSet<&str>> = HashMap::new();
        for s in sources.iter().filter(|s| s.muted) {
            muted
                .entry(s.source_type)
                .or_default()
                .insert(s.source_id.as_str());
        }
        let pool: Vec<ContentItem> = if muted.is_empty() {
            content_pool
        } else {
            content_pool
                .into_iter()
                .filter(|it| {
                    !muted
                        .get(&it.source_type)
                        .is_some_and(|ids| ids.contains(it.source_id.as_str()))
                })
                .collect()
        };

        let pool = rule_set.filter(pool);
        debug!(candidates = pool.len(), "applied content-policy rules");

        let (candidates, deferred_items) = partition_by_interactions(pool, interactions);
        debug!(
            candidates = candidates.len(),
            deferred = deferred_items.len(),
            "applied interaction history"
        );

        let (new_items, backlog_items) =
            categorize_by_recency(candidates, now, self.config.recency_window);
        let (take_new, take_backlog) = backlog_quota(
            new_items.len(),
            backlog_items.len(),
            prefs.backlog_ratio,
            self.config.max_feed_size,
        );
        debug!(
            new = new_items.len(),
            backlog = backlog_items.len(),
            take_new,
            take_backlog,
            "computed backlog quota"
        );
        let new_selected: Vec<ContentItem> = new_items.into_iter().take(take_new).collect();
        let backlog_selected: Vec<ContentItem> =
            backlog_items.into_iter().take(take_backlog).collect();
        let assembled = interleave_evenly(new_selected, backlog_selected);

        // Resurfacing budget is measured against the pre-resurfacing size,
        // so the bound is stable rather than self-referential.
        let budget = (self.config.resurface_fraction * assembled.len() as f64).floor() as usize;
        let (assembled, resurfaced_ids) =
            resurface_deferred(assembled, deferred_items, budget, chooser);
        debug!(resurfaced = resurfaced_ids.len(), "resurfaced deferred items");

        let ordered = enforce_source_diversity(assembled, prefs.max_consecutive_from_source);

        let mut display_names: HashMap<SourceType, HashMap<&str, &str>> = HashMap::new();
        for s in sources {
            display_names
                .entry(s.source_type)
                .or_default()
                .insert(s.source_id.as_str(), s.display_name.as_str());
        }
        let recency_cutoff = now - self.config.recency_window;

        let feed: Vec<FeedItem> = ordered
            .into_iter()
            .take(self.config.max_feed_size)
            .enumerate()
            .map(|(position, item)| {
                let source_display_name = display_names
                    .get(&item.source_type)
                    .and_then(|names| names.get(item.source_id.as_str()))
                    .map(|name| (*name).to_string())
                    .unwrap_or_else(|| UNKNOWN_SOURCE_NAME.to_string());
                let interaction_state = resurfaced_ids
                    .contains(item.id.as_str())
                    .then_some(InteractionKind::NotNow);
                let is_new = item.published_at >= recency_cutoff;
                FeedItem {
                    item,
                    position,
                    is_new,
                    source_display_name,
                    interaction_state,
                }
            })
            .collect();
        debug!(len = feed.len(), "generated feed");
        Ok(feed)
    }
}

/// Splits the pool by interaction history.
///
/// Items with any terminal interaction (Watched/Saved/Dismissed/Blocked) are
/// dropped. Items whose only record is NotNow go to the deferred pool; they
/// re-enter solely through the bounded resurfacing stage. A NotNow followed
/// by a terminal interaction is terminal.
fn partition_by_interactions(
    pool: Vec<ContentItem>,
    interactions: &[ContentInteraction],
) -> (Vec<ContentItem>, Vec<ContentItem>) {
    let mut disqualified: HashSet<&str> = HashSet::new();
    let mut deferred_ids: HashSet<&str> = HashSet::new();
    for interaction in interactions {
        if interaction.kind.is_disqualifying() {
            disqualified.insert(interaction.content_id.as_str());
        } else {
            deferred_ids.insert(interaction.content_id.as_str());
        }
    }

    let mut candidates = Vec::with_capacity(pool.len());
    let mut deferred = Vec::new();
    for item in pool {
        if disqualified.contains(item.id.as_str()) {
            continue;
        }
        if deferred_ids.contains(item.id.as_str()) {
            deferred.push(item);
        } else {
            candidates.push(item);
        }
    }
    (candidates, deferred)
}

/// Picks up to `budget` deferred items without replacement and interleaves
/// them into the assembled feed, returning the ids that were resurfaced.
fn resurface_deferred(
    assembled: Vec<ContentItem>,
    deferred: Vec<ContentItem>,
    budget: usize,
    chooser: &mut dyn Chooser,
) -> (Vec<ContentItem>, HashSet<String>) {
    let k = budget.min(deferred.len());
    if k == 0 {
        return (assembled, HashSet::new());
    }

    let picked_indices: HashSet<usize> = chooser.pick(deferred.len(), k).into_iter().collect();
    let mut picked: Vec<ContentItem> = deferred
        .into_iter()
        .enumerate()
        .filter(|(i, _)| picked_indices.contains(i))
        .map(|(_, item)| item)
        .collect();
    picked.sort_by(|a, b| b.published_at.cmp(&a.published_at));

    let resurfaced_ids: HashSet<String> = picked.iter().map(|it| it.id.clone()).collect();
    (interleave_evenly(assembled, picked), resurfaced_ids)
}
