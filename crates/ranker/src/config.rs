// ABOUTME: Engine-level configuration for feed generation.
// ABOUTME: Recency window, feed size cap, and resurfacing fraction, threaded explicitly.

use chrono::Duration;

/// Engine constants for a single feed generation.
///
/// These are threaded through as an argument rather than read from ambient
/// globals so the generator stays a pure function of its inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    /// Items published within this window of generation time count as "new".
    pub recency_window: Duration,
    /// Hard cap on the length of a generated feed.
    pub max_feed_size: usize,
    /// Fraction of the assembled feed's size that deferred (NotNow) items may
    /// occupy when resurfaced. Measured against the pre-resurfacing size.
    pub resurface_fraction: f64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            recency_window: Duration::days(7),
            max_feed_size: 200,
            resurface_fraction: 0.2,
        }
    }
}

impl FeedConfig {
    /// Returns a copy with out-of-range values coerced into range.
    pub fn clamped(&self) -> Self {
        let mut config = self.clone();
        if config.recency_window < Duration::zero() {
            config.recency_window = Duration::zero();
        }
        if config.resurface_fraction.is_nan() {
            config.resurface_fraction = 0.0;
        }
        config.resurface_fraction = config.resurface_fraction.clamp(0.0, 1.0);
        config
    }
}
