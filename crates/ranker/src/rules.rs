// ABOUTME: Filter rule evaluation for content items.
// ABOUTME: Keyword (exact/wildcard) and duration rules, combined conjunctively via RuleSet.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::RankerError;
use crate::models::ContentItem;

/// How a keyword rule matches against an item title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Case-insensitive whole-word match (boundaries at non-alphanumeric
    /// characters).
    Exact,
    /// Case-insensitive glob where `*` matches any run of characters,
    /// applied as an unanchored substring match.
    Wildcard,
}

/// A single content-policy rule. An item passes a rule when the rule does
/// not reject it; rules in a set combine with logical AND.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterRule {
    /// Rejects items whose title matches the keyword.
    Keyword { keyword: String, mode: MatchMode },
    /// Rejects items whose known duration falls outside [min, max].
    /// A missing bound is unbounded on that side; items with an unknown
    /// duration always pass.
    Duration {
        min_seconds: Option<u32>,
        max_seconds: Option<u32>,
    },
}

/// A compiled set of filter rules.
///
/// Wildcard patterns are compiled to regexes once at construction so that
/// evaluating a batch of items does not re-parse them per item.
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

#[derive(Debug)]
enum CompiledRule {
    KeywordExact { keyword: String },
    KeywordWildcard { pattern: Regex },
    Duration { min: Option<u32>, max: Option<u32> },
}

impl RuleSet {
    /// Compiles a rule list. Fails only if a wildcard keyword produces an
    /// invalid regex (pathologically long patterns).
    pub fn new(rules: &[FilterRule]) -> Result<Self, RankerError> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            compiled.push(match rule {
                FilterRule::Keyword {
                    keyword,
                    mode: MatchMode::Exact,
                } => CompiledRule::KeywordExact {
                    keyword: keyword.to_lowercase(),
                },
                FilterRule::Keyword {
                    keyword,
                    mode: MatchMode::Wildcard,
                } => CompiledRule::KeywordWildcard {
                    pattern: compile_wildcard(keyword)?,
                },
                FilterRule::Duration {
                    min_seconds,
                    max_seconds,
                } => CompiledRule::Duration {
                    min: *min_seconds,
                    max: *max_seconds,
                },
            });
        }
        Ok(Self { rules: compiled })
    }

    /// Whether the item passes every rule. An empty set passes everything.
    pub fn matches(&self, item: &ContentItem) -> bool {
        self.rules.iter().all(|rule| rule.passes(item))
    }

    /// Applies the rule set to every item independently, returning the
    /// surviving subsequence in original order.
    pub fn filter(&self, items: Vec<ContentItem>) -> Vec<ContentItem> {
        if self.rules.is_empty() {
            return items;
        }
        items.into_iter().filter(|it| self.matches(it)).collect()
    }
}

impl CompiledRule {
    fn passes(&self, item: &ContentItem) -> bool {
        match self {
            CompiledRule::KeywordExact { keyword } => {
                !contains_whole_word(&item.title, keyword)
            }
            CompiledRule::KeywordWildcard { pattern } => !pattern.is_match(&item.title),
            CompiledRule::Duration { min, max } => match item.duration_seconds {
                // Unknown duration is not excludable on duration grounds.
                None => true,
                Some(secs) => {
                    min.map(|lo| secs >= lo).unwrap_or(true)
                        && max.map(|hi| secs <= hi).unwrap_or(true)
                }
            },
        }
    }
}

/// Builds a case-insensitive unanchored regex from a `*`-glob keyword.
fn compile_wildcard(keyword: &str) -> Result<Regex, RankerError> {
    let body = keyword
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    RegexBuilder::new(&body)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| RankerError::invalid_pattern(keyword, e))
}

/// Case-insensitive whole-word search with boundaries at non-alphanumeric
/// characters. `needle` must already be lowercased.
fn contains_whole_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let haystack = haystack.to_lowercase();
    for (start, matched) in haystack.match_indices(needle) {
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map(|c| !c.is_alphanumeric())
            .unwrap_or(true);
        let after_ok = haystack[start + matched.len()..]
            .chars()
            .next()
            .map(|c| !c.is_alphanumeric())
            .unwrap_or(true);
        if before_ok && after_ok {
            return true;
        }
    }
    false
}
