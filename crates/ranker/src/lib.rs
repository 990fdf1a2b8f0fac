// ABOUTME: Feed-ranking engine for watchfeed.
// ABOUTME: Turns a user's sources, content pool, preferences, and interaction history into one ordered feed.

pub mod chooser;
pub mod config;
pub mod diversity;
pub mod error;
pub mod generator;
pub mod mixing;
pub mod models;
pub mod rules;

pub use chooser::{Chooser, RandomChooser, TakeFirst};
pub use config::FeedConfig;
pub use diversity::enforce_source_diversity;
pub use error::RankerError;
pub use generator::{FeedGenerator, UNKNOWN_SOURCE_NAME};
pub use mixing::{backlog_quota, categorize_by_recency, interleave_evenly};
pub use models::{
    ContentInteraction, ContentItem, ContentSource, Density, FeedItem, FeedPreferences,
    InteractionKind, SourceType, Theme,
};
pub use rules::{FilterRule, MatchMode, RuleSet};
