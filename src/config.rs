//! Configuration
//!
//! A plain, `Default`-able configuration object. The crate never reads a
//! config file itself (that stays an external collaborator); callers that
//! do have a parsed JSON document can build a [`Config`] leniently via
//! [`Config::from_json`], which substitutes a default for each individually
//! malformed key instead of aborting the whole parse.

use crate::error::ConfigParseError;

/// Top-level configuration for a [`crate::memory::Memory`] instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Filesystem path to the embedded database file.
    pub database_path: String,
    /// Retrieval-engine tuning.
    pub retrieval: RetrievalConfig,
    /// Consolidation pass tuning.
    pub consolidation: ConsolidationConfig,
    /// Temporal decay tuning.
    pub decay: DecayConfig,
    /// Retrieval-boost tuning.
    pub importance_calculation: ImportanceCalculationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "memory_database.db".to_string(),
            retrieval: RetrievalConfig::default(),
            consolidation: ConsolidationConfig::default(),
            decay: DecayConfig::default(),
            importance_calculation: ImportanceCalculationConfig::default(),
        }
    }
}

/// Tuning for [`crate::retrieval::Retrieval`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalConfig {
    /// Default `limit` if a caller omits one.
    pub default_limit: usize,
    /// Minimum Jaccard similarity for `retrieve_similar` to keep a candidate.
    pub similarity_threshold: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_limit: 50,
            similarity_threshold: 0.3,
        }
    }
}

/// Tuning for the consolidation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsolidationConfig {
    /// If `false`, `consolidate_memories` is a no-op.
    pub enabled: bool,
    /// Minimum Jaccard similarity between two descriptions to merge them.
    pub merge_similarity_threshold: f64,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            merge_similarity_threshold: 0.85,
        }
    }
}

/// Tuning for temporal decay of episodic importance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayConfig {
    /// Whether decay is applied at ranking time.
    pub enabled: bool,
    /// `r` in `I * exp(-r * d / h)`.
    pub decay_rate: f64,
    /// `h` in `I * exp(-r * d / h)`.
    pub half_life_days: i64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            decay_rate: 0.1,
            half_life_days: 30,
        }
    }
}

/// Tuning for the retrieval-frequency importance boost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportanceCalculationConfig {
    /// Multiplier applied per retrieval when computing the boost.
    pub retrieval_boost_factor: f64,
}

impl Default for ImportanceCalculationConfig {
    fn default() -> Self {
        Self {
            retrieval_boost_factor: 0.05,
        }
    }
}

impl Config {
    /// Build a [`Config`] from a parsed JSON document, falling back to
    /// defaults for any key that is missing, unrecognized, or the wrong
    /// shape. Unknown keys are silently ignored. Every malformed recognized
    /// key is recorded in the returned error list; the key's default is
    /// substituted rather than aborting the parse.
    pub fn from_json(value: &serde_json::Value) -> (Config, Vec<ConfigParseError>) {
        let mut config = Config::default();
        let mut errors = Vec::new();

        let Some(obj) = value.as_object() else {
            errors.push(ConfigParseError {
                key: "$".to_string(),
                message: "expected a JSON object".to_string(),
            });
            return (config, errors);
        };

        if let Some(v) = obj.get("database_path") {
            match v.as_str() {
                Some(s) => config.database_path = s.to_string(),
                None => errors.push(bad_key("database_path", "expected a string")),
            }
        }

        read_nested(
            obj,
            "retrieval",
            &mut errors,
            |sub, errors| {
                read_field(sub, "retrieval.default_limit", errors, |v| {
                    v.as_u64().map(|n| n as usize)
                })
                .inspect(|v| config.retrieval.default_limit = *v);
                read_field(sub, "retrieval.similarity_threshold", errors, |v| v.as_f64())
                    .inspect(|v| config.retrieval.similarity_threshold = *v);
            },
        );

        read_nested(obj, "consolidation", &mut errors, |sub, errors| {
            read_field(sub, "consolidation.enabled", errors, |v| v.as_bool())
                .inspect(|v| config.consolidation.enabled = *v);
            read_field(
                sub,
                "consolidation.merge_similarity_threshold",
                errors,
                |v| v.as_f64(),
            )
            .inspect(|v| config.consolidation.merge_similarity_threshold = *v);
        });

        read_nested(obj, "decay", &mut errors, |sub, errors| {
            read_field(sub, "decay.enabled", errors, |v| v.as_bool())
                .inspect(|v| config.decay.enabled = *v);
            read_field(sub, "decay.decay_rate", errors, |v| v.as_f64())
                .inspect(|v| config.decay.decay_rate = *v);
            read_field(sub, "decay.half_life_days", errors, |v| v.as_i64())
                .inspect(|v| config.decay.half_life_days = *v);
        });

        read_nested(obj, "importance_calculation", &mut errors, |sub, errors| {
            read_field(
                sub,
                "importance_calculation.retrieval_boost_factor",
                errors,
                |v| v.as_f64(),
            )
            .inspect(|v| config.importance_calculation.retrieval_boost_factor = *v);
        });

        (config, errors)
    }
}

fn bad_key(key: &str, message: &str) -> ConfigParseError {
    ConfigParseError {
        key: key.to_string(),
        message: message.to_string(),
    }
}

fn read_nested(
    obj: &serde_json::Map<String, serde_json::Value>,
    key: &str,
    errors: &mut Vec<ConfigParseError>,
    apply: impl FnOnce(&serde_json::Map<String, serde_json::Value>, &mut Vec<ConfigParseError>),
) {
    let Some(v) = obj.get(key) else { return };
    match v.as_object() {
        Some(sub) => apply(sub, errors),
        None => errors.push(bad_key(key, "expected a JSON object")),
    }
}

fn read_field<T>(
    obj: &serde_json::Map<String, serde_json::Value>,
    full_key: &str,
    errors: &mut Vec<ConfigParseError>,
    extract: impl FnOnce(&serde_json::Value) -> Option<T>,
) -> Option<T> {
    let leaf = full_key.rsplit('.').next().unwrap_or(full_key);
    let v = obj.get(leaf)?;
    match extract(v) {
        Some(parsed) => Some(parsed),
        None => {
            errors.push(bad_key(full_key, "could not parse value"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_defaults() {
        let c = Config::default();
        assert_eq!(c.database_path, "memory_database.db");
        assert_eq!(c.retrieval.default_limit, 50);
        assert_eq!(c.retrieval.similarity_threshold, 0.3);
        assert!(c.consolidation.enabled);
        assert_eq!(c.consolidation.merge_similarity_threshold, 0.85);
        assert!(c.decay.enabled);
        assert_eq!(c.decay.decay_rate, 0.1);
        assert_eq!(c.decay.half_life_days, 30);
        assert_eq!(c.importance_calculation.retrieval_boost_factor, 0.05);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let (config, errors) = Config::from_json(&serde_json::json!({}));
        assert!(errors.is_empty());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let (config, errors) = Config::from_json(&serde_json::json!({
            "database_path": "custom.db",
            "unknown_top_level": 42,
            "retrieval": { "default_limit": 10, "unknown_nested": true }
        }));
        assert!(errors.is_empty());
        assert_eq!(config.database_path, "custom.db");
        assert_eq!(config.retrieval.default_limit, 10);
    }

    #[test]
    fn malformed_key_substitutes_default_and_records_error() {
        let (config, errors) = Config::from_json(&serde_json::json!({
            "decay": { "decay_rate": "not a number" }
        }));
        assert_eq!(config.decay.decay_rate, Config::default().decay.decay_rate);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].key, "decay.decay_rate");
    }
}
