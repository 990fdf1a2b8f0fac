// ABOUTME: Backlog-ratio mixing policy for feed assembly.
// ABOUTME: Recency split, the two-pass backlog quota, and even interleaving of item streams.

use chrono::{DateTime, Utc};

use crate::models::ContentItem;

/// Splits items into (new, backlog) by publication recency, each half sorted
/// most-recent-first.
///
/// An item is "new" when its publication timestamp falls within `window` of
/// `now`. Future-dated publications count as new.
pub fn categorize_by_recency(
    items: Vec<ContentItem>,
    now: DateTime<Utc>,
    window: chrono::Duration,
) -> (Vec<ContentItem>, Vec<ContentItem>) {
    let cutoff = now - window;
    let (mut new_items, mut backlog): (Vec<_>, Vec<_>) =
        items.into_iter().partition(|it| it.published_at >= cutoff);
    new_items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    backlog.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    (new_items, backlog)
}

/// Computes how many new and backlog items to admit.
///
/// Two passes: a primary backlog quota biased toward `ratio`, then the
/// remaining capacity is filled from whichever pool still has items, so the
/// feed reaches capacity whenever enough content of either kind exists. The
/// ratio is a target, not an exact quota.
///
/// Returns `(take_new, take_backlog)`.
pub fn backlog_quota(n_new: usize, n_backlog: usize, ratio: f64, cap: usize) -> (usize, usize) {
    if cap == 0 {
        return (0, 0);
    }
    let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };

    let pool = cap.min(n_new + n_backlog);
    let desired_backlog = n_backlog.min((ratio * pool as f64).round() as usize);
    let take_new = n_new.min(cap - desired_backlog);
    // Top up backlog with capacity the new side could not use.
    let take_backlog = n_backlog.min(cap - take_new);
    (take_new, take_backlog)
}

/// Interleaves `extra` into `base` at evenly spaced positions, preserving the
/// relative order of each stream.
pub fn interleave_evenly(base: Vec<ContentItem>, extra: Vec<ContentItem>) -> Vec<ContentItem> {
    if extra.is_empty() {
        return base;
    }
    if base.is_empty() {
        return extra;
    }

    let total = base.len() + extra.len();
    let stride = total as f64 / extra.len() as f64;
    let mut is_extra_slot = vec![false; total];
    for j in 0..extra.len() {
        // Center each extra item within its stride, probing forward on
        // collision (only possible when strides round to the same slot).
        let mut pos = (((j as f64) + 0.5) * stride) as usize;
        pos = pos.min(total - 1);
        while is_extra_slot[pos] {
            pos = (pos + 1) % total;
        }
        is_extra_slot[pos] = true;
    }

    let mut base_iter = base.into_iter();
    let mut extra_iter = extra.into_iter();
    let mut out = Vec::with_capacity(total);
    for slot_is_extra in is_extra_slot {
        let next = if slot_is_extra {
            extra_iter.next().or_else(|| base_iter.next())
        } else {
            base_iter.next().or_else(|| extra_iter.next())
        };
        if let Some(item) = next {
            out.push(item);
        }
    }
    out
}
