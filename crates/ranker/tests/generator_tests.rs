// ABOUTME: Integration tests for feed generation.
// ABOUTME: Covers exclusion/resurfacing invariants, backlog ratio targets, diversity, capacity, and positions.

use chrono::{DateTime, Duration, Utc};
use pretty_assertions::assert_eq;

use watchfeed_ranker::{
    ContentInteraction, ContentItem, ContentSource, FeedConfig, FeedGenerator, FeedItem,
    FeedPreferences, InteractionKind, RandomChooser, SourceType, TakeFirst,
};

fn item(id: &str, source_id: &str, published_at: DateTime<Utc>) -> ContentItem {
    ContentItem {
        id: id.into(),
        source_type: SourceType::Youtube,
        source_id: source_id.into(),
        original_id: id.into(),
        title: format!("Video {id}"),
        description: Some("desc".into()),
        thumbnail_url: None,
        url: format!("https://example.com/watch/{id}"),
        duration_seconds: Some(600),
        published_at,
        fetched_at: published_at,
        last_seen_at: published_at,
    }
}

fn source(source_id: &str, display_name: &str) -> ContentSource {
    let now = Utc::now();
    ContentSource {
        id: format!("src-{source_id}"),
        user_id: "u1".into(),
        source_type: SourceType::Youtube,
        source_id: source_id.into(),
        display_name: display_name.into(),
        avatar_url: None,
        muted: false,
        always_safe: false,
        created_at: now,
        last_fetched_at: Some(now),
        last_fetch_ok: true,
    }
}

fn interaction(content_id: &str, kind: InteractionKind) -> ContentInteraction {
    ContentInteraction {
        id: format!("i-{content_id}-{kind:?}"),
        user_id: "u1".into(),
        content_id: content_id.into(),
        kind,
        created_at: Utc::now(),
        watch_seconds: None,
        completion_rate: None,
        dismiss_reason: None,
        collection_id: None,
    }
}

fn assert_positions(feed: &[FeedItem]) {
    for (i, entry) in feed.iter().enumerate() {
        assert_eq!(entry.position, i, "position must equal index");
    }
}

mod invariant_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Items with any terminal interaction never appear, regardless of kind.
    #[test]
    fn terminal_interactions_exclude_items() {
        let now = Utc::now();
        let pool = vec![
            item("watched", "a", now - Duration::hours(1)),
            item("saved", "a", now - Duration::hours(2)),
            item("dismissed", "a", now - Duration::hours(3)),
            item("blocked", "a", now - Duration::hours(4)),
            item("clean", "a", now - Duration::hours(5)),
        ];
        let interactions = vec![
            interaction("watched", InteractionKind::Watched),
            interaction("saved", InteractionKind::Saved),
            interaction("dismissed", InteractionKind::Dismissed),
            interaction("blocked", InteractionKind::Blocked),
        ];
        let feed = FeedGenerator::default()
            .generate_at(
                &[source("a", "Channel A")],
                pool,
                &[],
                &FeedPreferences::default(),
                &interactions,
                now,
                &mut TakeFirst,
            )
            .unwrap();
        let ids: Vec<&str> = feed.iter().map(|f| f.item.id.as_str()).collect();
        assert_eq!(ids, vec!["clean"]);
    }

    /// A NotNow interaction alone must not keep an item out of the feed: it
    /// may come back via resurfacing, carrying the NotNow state marker.
    #[test]
    fn not_now_items_can_resurface() {
        let now = Utc::now();
        let mut pool: Vec<ContentItem> = (0..10)
            .map(|i| item(&format!("v{i}"), "a", now - Duration::hours(i)))
            .collect();
        pool.push(item("deferred", "a", now - Duration::hours(20)));

        let feed = FeedGenerator::default()
            .generate_at(
                &[source("a", "Channel A")],
                pool,
                &[],
                &FeedPreferences::default(),
                &[interaction("deferred", InteractionKind::NotNow)],
                now,
                &mut TakeFirst,
            )
            .unwrap();

        let resurfaced: Vec<&FeedItem> = feed
            .iter()
            .filter(|f| f.item.id == "deferred")
            .collect();
        assert_eq!(resurfaced.len(), 1, "deferred item should be resurfaced");
        assert_eq!(
            resurfaced[0].interaction_state,
            Some(InteractionKind::NotNow),
            "resurfaced items carry the NotNow marker for the UI"
        );
        assert_positions(&feed);
    }

    /// Resurfacing is bounded: at most 20% of the pre-resurfacing feed size,
    /// even when many more deferred items exist.
    #[test]
    fn resurfacing_cannot_crowd_out_fresh_content() {
        let now = Utc::now();
        let mut pool: Vec<ContentItem> = (0..20)
            .map(|i| item(&format!("v{i}"), "a", now - Duration::hours(i)))
            .collect();
        let mut interactions = Vec::new();
        for i in 0..15 {
            let id = format!("d{i}");
            pool.push(item(&id, "a", now - Duration::hours(30 + i)));
            interactions.push(interaction(&id, InteractionKind::NotNow));
        }

        let mut chooser = RandomChooser::seeded(1);
        let feed = FeedGenerator::default()
            .generate_at(
                &[source("a", "Channel A")],
                pool,
                &[],
                &FeedPreferences::default(),
                &interactions,
                now,
                &mut chooser,
            )
            .unwrap();

        let resurfaced = feed
            .iter()
            .filter(|f| f.interaction_state == Some(InteractionKind::NotNow))
            .count();
        // 20 fresh items assembled, so the budget is floor(0.2 * 20) = 4.
        assert_eq!(resurfaced, 4);
        assert_eq!(feed.len(), 24);
        for entry in feed.iter().filter(|f| f.interaction_state.is_some()) {
            assert!(
                entry.item.id.starts_with('d'),
                "only deferred items may carry the marker"
            );
        }
        assert_positions(&feed);
    }

    /// Output length respects the cap and fills to it when material exists.
    #[test]
    fn capacity_is_bounded_and_filled() {
        let now = Utc::now();
        let pool: Vec<ContentItem> = (0..300)
            .map(|i| item(&format!("v{i}"), "a", now - Duration::minutes(i)))
            .collect();
        let feed = FeedGenerator::default()
            .generate_at(
                &[source("a", "Channel A")],
                pool,
                &[],
                &FeedPreferences::default(),
                &[],
                now,
                &mut TakeFirst,
            )
            .unwrap();
        assert_eq!(feed.len(), 200);
        assert_positions(&feed);
    }

    /// With abundant content on both sides, the share of backlog items lands
    /// within tolerance of the configured ratio.
    #[test]
    fn backlog_share_tracks_the_ratio() {
        let now = Utc::now();
        let mut pool = Vec::new();
        for i in 0..250 {
            pool.push(item(&format!("n{i}"), "a", now - Duration::hours(i % 100)));
        }
        for i in 0..250 {
            pool.push(item(
                &format!("b{i}"),
                "a",
                now - Duration::days(30) - Duration::hours(i),
            ));
        }
        let feed = FeedGenerator::default()
            .generate_at(
                &[source("a", "Channel A")],
                pool,
                &[],
                &FeedPreferences::default(),
                &[],
                now,
                &mut TakeFirst,
            )
            .unwrap();
        assert_eq!(feed.len(), 200);
        let backlog_share =
            feed.iter().filter(|f| !f.is_new).count() as f64 / feed.len() as f64;
        assert!(
            (backlog_share - 0.3).abs() <= 0.1,
            "backlog share {backlog_share} should be near 0.3"
        );
        assert_positions(&feed);
    }

    /// Malformed preferences are clamped rather than panicking.
    #[test]
    fn out_of_range_preferences_are_tolerated() {
        let now = Utc::now();
        let pool: Vec<ContentItem> = (0..5)
            .map(|i| item(&format!("v{i}"), "a", now - Duration::hours(i)))
            .collect();
        let prefs = FeedPreferences {
            backlog_ratio: 7.5,
            max_consecutive_from_source: 0,
            ..Default::default()
        };
        let feed = FeedGenerator::default()
            .generate_at(
                &[source("a", "Channel A")],
                pool,
                &[],
                &prefs,
                &[],
                now,
                &mut TakeFirst,
            )
            .unwrap();
        assert_eq!(feed.len(), 5);
    }
}

mod scenario_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// One source, three items, max-consecutive 3, no interactions: all three
    /// come back in their original relative order.
    #[test]
    fn single_source_boundary_case() {
        let now = Utc::now();
        let pool = vec![
            item("v1", "only", now - Duration::hours(1)),
            item("v2", "only", now - Duration::hours(2)),
            item("v3", "only", now - Duration::hours(3)),
        ];
        let feed = FeedGenerator::default()
            .generate_at(
                &[source("only", "Only Channel")],
                pool,
                &[],
                &FeedPreferences::default(),
                &[],
                now,
                &mut TakeFirst,
            )
            .unwrap();
        let ids: Vec<&str> = feed.iter().map(|f| f.item.id.as_str()).collect();
        assert_eq!(ids, vec!["v1", "v2", "v3"]);
        assert_positions(&feed);
    }

    /// 70 new + 30 backlog at ratio 0.3 with a generous cap: everything
    /// eligible is admitted and the backlog count reflects availability.
    #[test]
    fn seventy_thirty_mix_admits_all_eligible() {
        let now = Utc::now();
        let mut pool = Vec::new();
        for i in 0..70 {
            pool.push(item(
                &format!("n{i}"),
                "a",
                now - Duration::days(1) - Duration::minutes(i),
            ));
        }
        for i in 0..30 {
            pool.push(item(
                &format!("b{i}"),
                "a",
                now - Duration::days(30) - Duration::minutes(i),
            ));
        }
        let feed = FeedGenerator::default()
            .generate_at(
                &[source("a", "Channel A")],
                pool,
                &[],
                &FeedPreferences::default(),
                &[],
                now,
                &mut TakeFirst,
            )
            .unwrap();
        assert_eq!(feed.len(), 100);
        assert_eq!(feed.iter().filter(|f| !f.is_new).count(), 30);
        assert_eq!(feed.iter().filter(|f| f.is_new).count(), 70);
        assert_positions(&feed);
    }

    /// Two sources, ten items each, max-consecutive 3: no run of four or
    /// more consecutive same-source items anywhere in the 20-item output.
    #[test]
    fn two_source_feed_never_runs_past_the_window() {
        let now = Utc::now();
        let mut pool = Vec::new();
        for i in 0..10 {
            pool.push(item(&format!("a{i}"), "a", now - Duration::hours(2 * i)));
            pool.push(item(&format!("b{i}"), "b", now - Duration::hours(2 * i + 1)));
        }
        let prefs = FeedPreferences {
            backlog_ratio: 0.0,
            ..Default::default()
        };
        let feed = FeedGenerator::default()
            .generate_at(
                &[source("a", "Channel A"), source("b", "Channel B")],
                pool,
                &[],
                &prefs,
                &[],
                now,
                &mut TakeFirst,
            )
            .unwrap();
        assert_eq!(feed.len(), 20);
        for window in feed.windows(4) {
            let first = (window[0].item.source_type, window[0].item.source_id.clone());
            assert!(
                window
                    .iter()
                    .any(|f| (f.item.source_type, f.item.source_id.clone()) != first),
                "found 4 consecutive items from one source"
            );
        }
        assert_positions(&feed);
    }

    /// A saved item disappears; its untouched sibling stays.
    #[test]
    fn saved_item_is_absent_and_sibling_present() {
        let now = Utc::now();
        let pool = vec![
            item("saved", "a", now - Duration::hours(1)),
            item("sibling", "a", now - Duration::hours(2)),
        ];
        let feed = FeedGenerator::default()
            .generate_at(
                &[source("a", "Channel A")],
                pool,
                &[],
                &FeedPreferences::default(),
                &[interaction("saved", InteractionKind::Saved)],
                now,
                &mut TakeFirst,
            )
            .unwrap();
        let ids: Vec<&str> = feed.iter().map(|f| f.item.id.as_str()).collect();
        assert_eq!(ids, vec!["sibling"]);
    }

    /// A zero-size cap yields an empty feed without error.
    #[test]
    fn zero_cap_yields_empty_feed() {
        let now = Utc::now();
        let generator = FeedGenerator::new(FeedConfig {
            max_feed_size: 0,
            ..Default::default()
        });
        let feed = generator
            .generate_at(
                &[source("a", "Channel A")],
                vec![item("v1", "a", now)],
                &[],
                &FeedPreferences::default(),
                &[],
                now,
                &mut TakeFirst,
            )
            .unwrap();
        assert!(feed.is_empty());
    }
}
