//! Content Scoring: pluggable, trait-based importance score for achievement bullets.
//!
//! Default: `ImpactScorer` (keyword and metric heuristics, deterministic, no I/O).
//! The score only ranks bullets against each other when a job has more than the
//! template allows; it says nothing about meaning.
//!
//! `AppState` holds an `Arc<dyn ContentScorer>` so a different backend can be
//! swapped in without touching the layout engine.

use std::cmp::Ordering;
use std::collections::HashSet;

use regex::Regex;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

pub trait ContentScorer: Send + Sync {
    /// Non-negative importance of one bullet. Must be deterministic.
    fn score(&self, text: &str) -> f64;

    /// The `n` highest-scoring items, best first. Equal scores keep input order.
    fn select_top(&self, items: &[String], n: usize) -> Vec<String> {
        let mut scored: Vec<(f64, &String)> =
            items.iter().map(|item| (self.score(item), item)).collect();
        // `sort_by` is stable, which is what breaks ties by input position.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored
            .into_iter()
            .take(n)
            .map(|(_, item)| item.clone())
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ImpactScorer: default implementation
// ────────────────────────────────────────────────────────────────────────────

/// Technology names and everyday action verbs. Each distinct match scores `KEYWORD_POINTS`.
const KEYWORDS: &[&str] = &[
    "led", "built", "improved", "designed", "developed", "launched", "implemented",
    "created", "managed", "architected", "automated", "migrated", "scaled", "mentored",
    "rust", "python", "java", "javascript", "typescript", "go", "react", "node",
    "sql", "postgresql", "kubernetes", "docker", "terraform", "aws", "gcp", "azure",
    "api", "cloud", "ml", "data", "security", "pipeline", "platform",
];

/// Verbs that usually introduce an outcome. Each distinct match scores `STRONG_VERB_POINTS`.
const STRONG_VERBS: &[&str] = &[
    "achieved", "delivered", "optimized", "increased", "reduced", "accelerated",
    "spearheaded", "generated", "saved", "grew", "exceeded", "transformed",
];

const KEYWORD_POINTS: f64 = 2.0;
const STRONG_VERB_POINTS: f64 = 5.0;
const PERCENT_POINTS: f64 = 10.0;
const CURRENCY_POINTS: f64 = 10.0;
const LARGE_NUMBER_POINTS: f64 = 8.0;

/// Heuristic scorer: keywords < strong verbs < quantitative signals.
///
/// Algorithm:
/// 1. Tokenize lower-cased text on anything but letters, digits, `+` and `#`
/// 2. +2 per distinct keyword, +5 per distinct strong verb
/// 3. +10 for a percentage, +10 for a currency amount, +8 for a large bare
///    number (3+ digits, thousands separators, or a k/m/b/x suffix). A bare
///    19xx/20xx year is a date, not a metric, and does not count.
pub struct ImpactScorer {
    percent: Regex,
    currency: Regex,
    large_number: Regex,
    year: Regex,
}

impl ImpactScorer {
    pub fn new() -> Self {
        Self {
            percent: Regex::new(r"\d+(?:\.\d+)?\s?%").expect("Invalid percent regex"),
            currency: Regex::new(r"[$€£]\s?\d").expect("Invalid currency regex"),
            large_number: Regex::new(
                r"(?i)\b(?:\d{1,3}(?:,\d{3})+|\d{3,}|\d+(?:\.\d+)?\s?[kmbx])\b",
            )
            .expect("Invalid large-number regex"),
            year: Regex::new(r"^(?:19|20)\d{2}$").expect("Invalid year regex"),
        }
    }
}

impl Default for ImpactScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentScorer for ImpactScorer {
    fn score(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let tokens: HashSet<&str> = lower
            .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
            .filter(|t| !t.is_empty())
            .collect();

        let keyword_hits = KEYWORDS.iter().filter(|k| tokens.contains(*k)).count();
        let verb_hits = STRONG_VERBS.iter().filter(|v| tokens.contains(*v)).count();

        let mut score =
            keyword_hits as f64 * KEYWORD_POINTS + verb_hits as f64 * STRONG_VERB_POINTS;
        if self.percent.is_match(text) {
            score += PERCENT_POINTS;
        }
        if self.currency.is_match(text) {
            score += CURRENCY_POINTS;
        }
        if self
            .large_number
            .find_iter(text)
            .any(|m| !self.year.is_match(m.as_str()))
        {
            score += LARGE_NUMBER_POINTS;
        }
        score
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> ImpactScorer {
        ImpactScorer::new()
    }

    #[test]
    fn test_plain_text_scores_zero() {
        assert_eq!(scorer().score("Attended weekly meetings"), 0.0);
        assert_eq!(scorer().score(""), 0.0);
    }

    #[test]
    fn test_keywords_count_once_each() {
        let s = scorer().score("Built and built and built the Rust service");
        assert_eq!(s, 2.0 * KEYWORD_POINTS);
    }

    #[test]
    fn test_metric_outweighs_keyword() {
        let metric = scorer().score("Cut churn by 12%");
        let keyword = scorer().score("Built a dashboard");
        assert!(metric > keyword, "{metric} <= {keyword}");
    }

    #[test]
    fn test_currency_and_large_numbers() {
        assert_eq!(scorer().score("Closed $2M in deals"), CURRENCY_POINTS + LARGE_NUMBER_POINTS);
        assert_eq!(scorer().score("Served 1,200 customers"), LARGE_NUMBER_POINTS);
        assert_eq!(scorer().score("Handled 40k requests"), LARGE_NUMBER_POINTS);
        assert_eq!(scorer().score("Team of 12 people"), 0.0);
    }

    #[test]
    fn test_years_are_not_large_numbers() {
        assert_eq!(scorer().score("Joined Acme in 2019"), 0.0);
        assert_eq!(scorer().score("Promoted twice between 1998 and 2004"), 0.0);
        assert_eq!(scorer().score("Processed 2500 orders"), LARGE_NUMBER_POINTS);
        assert_eq!(scorer().score("Since 2019 handled 3000 tickets"), LARGE_NUMBER_POINTS);
    }

    #[test]
    fn test_strong_verbs() {
        assert_eq!(scorer().score("Delivered the launch"), STRONG_VERB_POINTS);
    }

    #[test]
    fn test_score_is_deterministic() {
        let text = "Optimized Kubernetes scheduling, reducing cloud spend by 35% ($400k/yr)";
        assert_eq!(scorer().score(text), scorer().score(text));
        assert!(scorer().score(text) > 0.0);
    }

    #[test]
    fn test_select_top_orders_by_score_then_position() {
        let items: Vec<String> = [
            "Answered emails",
            "Reduced latency by 40%",
            "Organized offsite",
            "Built CI pipeline",
            "Grew revenue $3M",
        ]
        .map(str::to_string)
        .to_vec();

        let top = scorer().select_top(&items, 3);
        assert_eq!(top, vec!["Grew revenue $3M", "Reduced latency by 40%", "Built CI pipeline"]);
    }

    #[test]
    fn test_select_top_ties_keep_input_order() {
        let items: Vec<String> = ["first", "second", "third"].map(str::to_string).to_vec();
        assert_eq!(scorer().select_top(&items, 2), vec!["first", "second"]);
    }

    #[test]
    fn test_select_top_with_large_n_returns_everything() {
        let items: Vec<String> = ["a", "b"].map(str::to_string).to_vec();
        assert_eq!(scorer().select_top(&items, 10).len(), 2);
        assert!(scorer().select_top(&items, 0).is_empty());
    }
}
