// ABOUTME: Source-diversity reordering pass for assembled feeds.
// ABOUTME: Limits consecutive same-source runs, deferring items until a different source breaks the run.

use std::collections::VecDeque;

use crate::models::{ContentItem, SourceType};

/// Reorders `items` so that no more than `max_consecutive` consecutive items
/// share the same (source_id, source_type) pair.
///
/// Walks the input in order. An item that would extend a run past the limit
/// is deferred and re-attempted once a different source has broken the run.
/// Already-diverse input comes back unchanged. When every remaining item
/// shares the running source the constraint is relaxed and the items are
/// emitted in their original relative order; diversity cannot be manufactured
/// from homogeneous input.
pub fn enforce_source_diversity(
    items: Vec<ContentItem>,
    max_consecutive: usize,
) -> Vec<ContentItem> {
    let max_consecutive = max_consecutive.max(1);
    let mut pending: VecDeque<ContentItem> = items.into();
    let mut deferred: VecDeque<ContentItem> = VecDeque::new();
    let mut out: Vec<ContentItem> = Vec::with_capacity(pending.len());

    let mut run_key: Option<(SourceType, String)> = None;
    let mut run_len = 0usize;

    while !pending.is_empty() || !deferred.is_empty() {
        let blocked = |it: &ContentItem| -> bool {
            run_len >= max_consecutive
                && run_key
                    .as_ref()
                    .map(|(st, sid)| *st == it.source_type && *sid == it.source_id)
                    .unwrap_or(false)
        };

        // Deferred items were skipped earlier in the walk, so they get first
        // chance once they are placeable again.
        let next = if let Some(pos) = deferred.iter().position(|it| !blocked(it)) {
            deferred.remove(pos)
        } else if let Some(pos) = pending.iter().position(|it| !blocked(it)) {
            for _ in 0..pos {
                if let Some(skipped) = pending.pop_front() {
                    deferred.push_back(skipped);
                }
            }
            pending.pop_front()
        } else {
            // Everything left shares the running source: relax the constraint
            // and keep original relative order (deferred items preceded the
            // still-pending ones in the input).
            out.extend(deferred.drain(..));
            out.extend(pending.drain(..));
            break;
        };

        if let Some(item) = next {
            let key = (item.source_type, item.source_id.clone());
            if run_key.as_ref() == Some(&key) {
                run_len += 1;
            } else {
                run_key = Some(key);
                run_len = 1;
            }
            out.push(item);
        }
    }

    out
}
