//! Memory Utilities (C1)
//!
//! Tokenization, Jaccard similarity, temporal decay, validation, keyword
//! extraction, tag merging, and date-range parsing. Ported from the
//! reference `MemoryUtils` static-method class into small free functions.

use chrono::{Datelike, Duration, NaiveDateTime, Timelike};
use std::collections::HashSet;

/// Split `text` into lowercase alphanumeric/underscore word tokens.
/// Equivalent to `\w+` applied after lower-casing; no stemming.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in lower.chars() {
        if c.is_alphanumeric() || c == '_' {
            current.push(c);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Jaccard similarity between the token sets of `a` and `b`, in `[0, 1]`.
/// Either side empty (or producing no tokens) returns `0.0`.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let tokens_a: HashSet<String> = tokenize(a).into_iter().collect();
    let tokens_b: HashSet<String> = tokenize(b).into_iter().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Apply exponential temporal decay to a stored importance score.
///
/// `d = max(0, floor_days(now - timestamp))`; returns `importance *
/// exp(-decay_rate * d / half_life_days)`. An unparseable `timestamp`
/// returns `importance` unchanged rather than failing.
pub fn apply_temporal_decay(
    importance: f64,
    timestamp: &str,
    decay_rate: f64,
    half_life_days: i64,
) -> f64 {
    let Some(memory_time) = parse_local_datetime(timestamp) else {
        return importance;
    };
    let now = now_local();
    let days_ago = (now - memory_time).num_days();

    if days_ago < 0 {
        return importance;
    }

    let decay_factor = (-decay_rate * days_ago as f64 / half_life_days as f64).exp();
    (importance * decay_factor).max(0.0)
}

/// Bounded additive importance boost proportional to retrieval frequency.
pub fn calculate_retrieval_boost(retrieval_count: i64, boost_factor: f64) -> f64 {
    (retrieval_count as f64 * boost_factor).min(20.0)
}

/// Required-field, range, and shape validation for an episodic record's
/// draft fields. Returns `Ok(())` or an explanatory message.
pub fn validate_episodic(
    event_description: &str,
    timestamp: &str,
    importance_score: Option<f64>,
    emotional_valence: Option<f64>,
) -> Result<(), String> {
    if event_description.trim().is_empty() {
        return Err("missing required field: event_description".to_string());
    }
    if timestamp.trim().is_empty() {
        return Err("missing required field: timestamp".to_string());
    }
    if parse_local_datetime(timestamp).is_none() {
        return Err(
            "invalid timestamp format. use ISO format (YYYY-MM-DDTHH:MM:SS)".to_string(),
        );
    }
    if let Some(score) = importance_score {
        if !(0.0..=100.0).contains(&score) {
            return Err("importance score must be between 0 and 100".to_string());
        }
    }
    if let Some(valence) = emotional_valence {
        if !(-1.0..=1.0).contains(&valence) {
            return Err("emotional valence must be between -1 and 1".to_string());
        }
    }
    Ok(())
}

/// Required-field and range validation for a semantic record's draft fields.
pub fn validate_semantic(
    concept_name: &str,
    definition: &str,
    confidence_score: Option<f64>,
) -> Result<(), String> {
    if concept_name.trim().is_empty() {
        return Err("missing required field: concept_name".to_string());
    }
    if definition.trim().is_empty() {
        return Err("missing required field: definition".to_string());
    }
    if let Some(score) = confidence_score {
        if !(0.0..=1.0).contains(&score) {
            return Err("confidence score must be between 0 and 1".to_string());
        }
    }
    Ok(())
}

/// Required-field and range validation for a procedural record's draft fields.
pub fn validate_procedural(
    procedure_name: &str,
    description: &str,
    steps: &[String],
    success_rate: Option<f64>,
) -> Result<(), String> {
    if procedure_name.trim().is_empty() {
        return Err("missing required field: procedure_name".to_string());
    }
    if description.trim().is_empty() {
        return Err("missing required field: description".to_string());
    }
    if steps.is_empty() {
        return Err("steps must be a non-empty list".to_string());
    }
    if let Some(rate) = success_rate {
        if !(0.0..=100.0).contains(&rate) {
            return Err("success rate must be between 0 and 100".to_string());
        }
    }
    Ok(())
}

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "be", "been",
    "being", "have", "has", "had", "do", "does", "did", "will", "would", "should", "could",
    "may", "might", "must", "i", "you", "he", "she", "it", "we", "they", "them", "their",
    "this", "that", "these", "those", "and", "or", "but", "if", "then", "in", "of", "to",
    "for", "with", "from", "by",
];

/// Tokenize `text`, drop stop words and tokens of length <= 2, and return the
/// top `max_keywords` tokens by descending frequency (ties broken by first
/// occurrence).
pub fn extract_keywords(text: &str, max_keywords: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();
    let tokens: Vec<String> = tokenize(text)
        .into_iter()
        .filter(|t| !stop_words.contains(t.as_str()) && t.chars().count() > 2)
        .collect();

    let mut order: Vec<&str> = Vec::new();
    let mut freq: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for t in &tokens {
        if !freq.contains_key(t.as_str()) {
            order.push(t.as_str());
        }
        *freq.entry(t.as_str()).or_insert(0) += 1;
    }

    order.sort_by(|a, b| freq[b].cmp(&freq[a]));
    order
        .into_iter()
        .take(max_keywords)
        .map(|s| s.to_string())
        .collect()
}

/// Union of all input tag lists, deduplicated and sorted ascending.
pub fn merge_tags(tag_lists: &[Vec<String>]) -> Vec<String> {
    let mut all: HashSet<String> = HashSet::new();
    for tags in tag_lists {
        all.extend(tags.iter().cloned());
    }
    let mut merged: Vec<String> = all.into_iter().collect();
    merged.sort();
    merged
}

/// Parse a date-range phrase (`today`, `yesterday`, `this_week`, `this_month`,
/// `last_<N>_days`) into an ISO-8601 `[start, end]` pair. Unrecognized
/// phrases return `(None, None)`.
pub fn parse_date_range(range_str: &str) -> (Option<String>, Option<String>) {
    let now = now_local();

    let (start, end) = match range_str {
        "today" => (now.date().and_hms_opt(0, 0, 0).unwrap(), now),
        "yesterday" => {
            let yesterday = (now - Duration::days(1)).date();
            (
                yesterday.and_hms_opt(0, 0, 0).unwrap(),
                yesterday.and_hms_opt(23, 59, 59).unwrap(),
            )
        }
        "this_week" => {
            let days_since_monday = now.weekday().num_days_from_monday() as i64;
            let monday = (now - Duration::days(days_since_monday)).date();
            (monday.and_hms_opt(0, 0, 0).unwrap(), now)
        }
        "this_month" => {
            let start_of_month = now
                .date()
                .with_day(1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            (start_of_month, now)
        }
        other if other.starts_with("last_") && other.ends_with("_days") => {
            let Some(n) = other
                .strip_prefix("last_")
                .and_then(|s| s.strip_suffix("_days"))
                .and_then(|s| s.parse::<i64>().ok())
            else {
                return (None, None);
            };
            (now - Duration::days(n), now)
        }
        _ => return (None, None),
    };

    (Some(format_local(start)), Some(format_local(end)))
}

/// `now()` in naive local civil time, second precision — mirrors the
/// original system's `datetime.now()`.
pub(crate) fn now_local() -> NaiveDateTime {
    chrono::Local::now().naive_local().with_nanosecond(0).unwrap()
}

/// Parse an ISO-8601 local timestamp (`YYYY-MM-DDTHH:MM:SS`, optionally with
/// fractional seconds), returning `None` on any malformed input.
pub fn parse_local_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Render a naive local datetime as an ISO-8601 string, second precision.
pub fn format_local(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_splits_on_non_word_chars() {
        assert_eq!(
            tokenize("User Clicked Login-Button!"),
            vec!["user", "clicked", "login", "button"]
        );
    }

    #[test]
    fn jaccard_is_symmetric_and_self_similar() {
        let a = "the quick brown fox";
        let b = "the slow brown dog";
        assert_eq!(jaccard_similarity(a, b), jaccard_similarity(b, a));
        assert_eq!(jaccard_similarity(a, a), 1.0);
    }

    #[test]
    fn jaccard_empty_side_is_zero() {
        assert_eq!(jaccard_similarity("", "anything"), 0.0);
        assert_eq!(jaccard_similarity("anything", ""), 0.0);
    }

    #[test]
    fn decay_unparseable_timestamp_returns_input_unchanged() {
        assert_eq!(apply_temporal_decay(50.0, "not-a-date", 0.1, 30), 50.0);
    }

    #[test]
    fn decay_future_timestamp_returns_input_unchanged() {
        let future = now_local() + Duration::days(5);
        assert_eq!(
            apply_temporal_decay(50.0, &format_local(future), 0.1, 30),
            50.0
        );
    }

    #[test]
    fn decay_is_non_increasing_in_age() {
        let d1 = apply_temporal_decay(100.0, &format_local(now_local() - Duration::days(5)), 0.1, 30);
        let d2 = apply_temporal_decay(100.0, &format_local(now_local() - Duration::days(30)), 0.1, 30);
        assert!(d1 >= d2);
    }

    #[test]
    fn retrieval_boost_is_capped_at_20() {
        assert_eq!(calculate_retrieval_boost(1000, 0.05), 20.0);
        assert_eq!(calculate_retrieval_boost(10, 0.05), 0.5);
    }

    #[test]
    fn validate_episodic_boundary_scores() {
        assert!(validate_episodic("e", "2025-01-01T00:00:00", Some(0.0), None).is_ok());
        assert!(validate_episodic("e", "2025-01-01T00:00:00", Some(100.0), None).is_ok());
        assert!(validate_episodic("e", "2025-01-01T00:00:00", Some(-0.01), None).is_err());
        assert!(validate_episodic("e", "2025-01-01T00:00:00", Some(100.01), None).is_err());
    }

    #[test]
    fn validate_procedural_rejects_empty_steps() {
        assert!(validate_procedural("p", "d", &[], None).is_err());
        assert!(validate_procedural("p", "d", &["x".to_string()], None).is_ok());
    }

    #[test]
    fn extract_keywords_drops_stopwords_and_short_tokens() {
        let kws = extract_keywords("the cat sat on the mat and the dog ran", 10);
        assert!(!kws.contains(&"the".to_string()));
        assert!(!kws.contains(&"on".to_string()));
        assert!(kws.contains(&"cat".to_string()));
    }

    #[test]
    fn merge_tags_dedups_and_sorts() {
        let merged = merge_tags(&[
            vec!["b".to_string(), "a".to_string()],
            vec!["a".to_string(), "c".to_string()],
        ]);
        assert_eq!(merged, vec!["a", "b", "c"]);
    }

    #[test]
    fn parse_date_range_unrecognized_phrase() {
        assert_eq!(parse_date_range("not_a_phrase"), (None, None));
    }

    #[test]
    fn parse_date_range_last_n_days() {
        let (start, end) = parse_date_range("last_7_days");
        assert!(start.is_some());
        assert!(end.is_some());
    }
}
