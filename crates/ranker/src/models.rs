// ABOUTME: Core data models for the watchfeed ranking engine.
// ABOUTME: Content items, sources, interactions, preferences, and the FeedItem output type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The platform a content item or source belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Youtube,
    Vimeo,
    Peertube,
    Rss,
}

/// A single fetched piece of content (a video).
///
/// Immutable once fetched except for the `last_seen_at` refresh performed by
/// the fetch layer. Upstream identity is (source_type, original_id); within
/// the engine items are keyed by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub source_type: SourceType,
    /// The owning channel/feed within the platform.
    pub source_id: String,
    /// Platform-native identifier for the video.
    pub original_id: String,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub url: String,
    pub duration_seconds: Option<u32>,
    pub published_at: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl ContentItem {
    /// Key used for source-diversity runs and display-name resolution.
    pub fn source_key(&self) -> (SourceType, &str) {
        (self.source_type, self.source_id.as_str())
    }
}

/// A user's subscription to a channel/feed on some platform.
///
/// Read-only input to the engine; the fetch and persistence layers own its
/// bookkeeping fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSource {
    pub id: String,
    pub user_id: String,
    pub source_type: SourceType,
    pub source_id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    /// Muted sources are excluded from the feed entirely.
    pub muted: bool,
    /// Reserved flag, not enforced by the ranking engine.
    pub always_safe: bool,
    pub created_at: DateTime<Utc>,
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub last_fetch_ok: bool,
}

impl ContentSource {
    pub fn source_key(&self) -> (SourceType, &str) {
        (self.source_type, self.source_id.as_str())
    }
}

/// What a user did with a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionKind {
    Watched,
    Saved,
    Dismissed,
    NotNow,
    Blocked,
}

impl InteractionKind {
    /// Whether this interaction permanently removes the item from candidacy.
    ///
    /// NotNow marks an item as deferred rather than finished, so it is the
    /// one kind that keeps the item eligible (for resurfacing).
    pub fn is_disqualifying(self) -> bool {
        !matches!(self, InteractionKind::NotNow)
    }
}

/// One event in the append-only interaction log.
///
/// The optional fields are kind-dependent (watch progress for Watched,
/// a reason for Dismissed, a collection for Saved) and are ignored by the
/// ranking engine, which only reads `content_id` and `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentInteraction {
    pub id: String,
    pub user_id: String,
    pub content_id: String,
    pub kind: InteractionKind,
    pub created_at: DateTime<Utc>,
    pub watch_seconds: Option<u32>,
    pub completion_rate: Option<f32>,
    pub dismiss_reason: Option<String>,
    pub collection_id: Option<String>,
}

/// Display theme, carried for the presentation layer; not consulted by ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

/// Feed density, carried for the presentation layer; not consulted by ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    #[default]
    Comfortable,
    Compact,
}

/// Per-user feed tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPreferences {
    /// Target fraction of the feed that may be backlog (archival) content.
    /// Must be within [0, 1].
    pub backlog_ratio: f64,
    /// Maximum run of consecutive items from one source. Must be >= 1.
    pub max_consecutive_from_source: usize,
    pub theme: Theme,
    pub density: Density,
    pub autoplay: bool,
}

impl Default for FeedPreferences {
    fn default() -> Self {
        Self {
            backlog_ratio: 0.3,
            max_consecutive_from_source: 3,
            theme: Theme::default(),
            density: Density::default(),
            autoplay: false,
        }
    }
}

impl FeedPreferences {
    /// Checks the caller contract: ratio within [0, 1], max-consecutive >= 1.
    pub fn validate(&self) -> Result<(), crate::error::RankerError> {
        use crate::error::RankerError;
        if !(0.0..=1.0).contains(&self.backlog_ratio) || self.backlog_ratio.is_nan() {
            return Err(RankerError::backlog_ratio(self.backlog_ratio));
        }
        if self.max_consecutive_from_source == 0 {
            return Err(RankerError::MaxConsecutiveZero);
        }
        Ok(())
    }

    /// Returns a copy with out-of-range values coerced into range.
    ///
    /// The generator clamps rather than erroring mid-pipeline; callers that
    /// want to surface bad input should use [`FeedPreferences::validate`]
    /// at the boundary instead.
    pub fn clamped(&self) -> Self {
        let mut prefs = self.clone();
        if prefs.backlog_ratio.is_nan() {
            prefs.backlog_ratio = 0.0;
        }
        prefs.backlog_ratio = prefs.backlog_ratio.clamp(0.0, 1.0);
        prefs.max_consecutive_from_source = prefs.max_consecutive_from_source.max(1);
        prefs
    }
}

/// One entry of a generated feed.
///
/// Constructed fresh per generation and never persisted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub item: ContentItem,
    /// Zero-based index in the final ordering; positional metadata only.
    pub position: usize,
    /// Recency categorization (published within the recency window), not
    /// literal freshness.
    pub is_new: bool,
    /// Resolved from the user's sources; `"Unknown"` when no source matches.
    pub source_display_name: String,
    /// Present only for states the UI must show; `Some(NotNow)` marks a
    /// resurfaced item.
    pub interaction_state: Option<InteractionKind>,
}
