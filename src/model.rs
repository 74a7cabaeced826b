//! Data Model
//!
//! The three disjoint memory kinds — episodic, semantic, procedural — plus
//! their validated insert-input counterparts and the shared result/stats
//! types used by the store, retrieval engine, and façade.

use serde::{Deserialize, Serialize};

/// Which of the three disjoint memory kinds a record belongs to.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    /// A time-stamped event record.
    Episodic,
    /// A named concept with a definition and confidence.
    Semantic,
    /// A named workflow of ordered steps with execution statistics.
    Procedural,
}

impl std::fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MemoryKind::Episodic => "episodic",
            MemoryKind::Semantic => "semantic",
            MemoryKind::Procedural => "procedural",
        };
        write!(f, "{s}")
    }
}

// ============================================================================
// EPISODIC
// ============================================================================

/// A time-stamped event record.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodicMemory {
    /// Monotonically-increasing identity, unique within the episodic kind.
    pub id: i64,
    /// ISO-8601 local timestamp of the event.
    pub timestamp: String,
    /// How long the event lasted, in seconds.
    pub duration_seconds: Option<f64>,
    /// Free-text description of what happened.
    pub event_description: String,
    /// Surrounding context.
    pub context: Option<String>,
    /// Who or what was involved.
    pub participants: Vec<String>,
    /// Where the event took place.
    pub location: Option<String>,
    /// Arbitrary structured sensory detail, preserved but not interpreted.
    pub sensory_data: Option<serde_json::Value>,
    /// Free-text observations.
    pub observations: Option<String>,
    /// Importance in `[0, 100]`, default `50`.
    pub importance_score: f64,
    /// Emotional valence in `[-1, 1]`, default `0`.
    pub emotional_valence: f64,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Free-form categories.
    pub categories: Vec<String>,
    /// Names of semantic concepts this episode is associated with.
    pub associated_concepts: Vec<String>,
    /// Number of times this record has been recalled by id.
    pub retrieval_count: i64,
    /// When this record was last recalled by id, if ever.
    pub last_accessed: Option<String>,
    /// When this record was created.
    pub created_at: String,
    /// When this record was last mutated.
    pub updated_at: String,
}

/// Validated input to insert a new episodic record.
///
/// Unknown fields are rejected at deserialization so malformed or injected
/// keys never silently reach the store.
#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct NewEpisodicMemory {
    /// ISO-8601 local timestamp; defaults to "now" if omitted.
    pub timestamp: Option<String>,
    /// How long the event lasted, in seconds.
    pub duration_seconds: Option<f64>,
    /// Free-text description of what happened. Required.
    pub event_description: String,
    /// Surrounding context.
    pub context: Option<String>,
    /// Who or what was involved.
    pub participants: Option<Vec<String>>,
    /// Where the event took place.
    pub location: Option<String>,
    /// Arbitrary structured sensory detail.
    pub sensory_data: Option<serde_json::Value>,
    /// Free-text observations.
    pub observations: Option<String>,
    /// Importance in `[0, 100]`; defaults to `50`.
    pub importance_score: Option<f64>,
    /// Emotional valence in `[-1, 1]`; defaults to `0`.
    pub emotional_valence: Option<f64>,
    /// Free-form tags; auto-populated from keywords if omitted or empty.
    pub tags: Option<Vec<String>>,
    /// Free-form categories.
    pub categories: Option<Vec<String>>,
    /// Names of associated semantic concepts.
    pub associated_concepts: Option<Vec<String>>,
}

// ============================================================================
// SEMANTIC
// ============================================================================

/// A named concept with a definition and confidence.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticMemory {
    /// Monotonically-increasing identity, unique within the semantic kind.
    pub id: i64,
    /// Unique natural key across all semantic records.
    pub concept_name: String,
    /// The concept's definition.
    pub definition: String,
    /// Arbitrary structured properties, preserved but not interpreted.
    pub properties: Option<serde_json::Value>,
    /// Arbitrary structured relationships, preserved but not interpreted.
    pub relationships: Option<serde_json::Value>,
    /// Confidence in `[0, 1]`, default `0.5`.
    pub confidence_score: f64,
    /// Where this concept came from.
    pub source: Option<String>,
    /// Supporting evidence.
    pub evidence: Option<String>,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Free-form categories.
    pub categories: Vec<String>,
    /// Ids of episodic records this concept was derived from. Stored as a
    /// weak reference by identity; dangling ids are tolerated.
    pub linked_episodes: Vec<i64>,
    /// When this record was created.
    pub created_at: String,
    /// When this record was last mutated.
    pub updated_at: String,
}

/// Validated input to insert a new semantic record.
#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct NewSemanticMemory {
    /// Unique natural key across all semantic records. Required.
    pub concept_name: String,
    /// The concept's definition. Required.
    pub definition: String,
    /// Arbitrary structured properties.
    pub properties: Option<serde_json::Value>,
    /// Arbitrary structured relationships.
    pub relationships: Option<serde_json::Value>,
    /// Confidence in `[0, 1]`; defaults to `0.5`.
    pub confidence_score: Option<f64>,
    /// Where this concept came from.
    pub source: Option<String>,
    /// Supporting evidence.
    pub evidence: Option<String>,
    /// Free-form tags; auto-populated from keywords if omitted or empty.
    pub tags: Option<Vec<String>>,
    /// Free-form categories.
    pub categories: Option<Vec<String>>,
    /// Ids of episodic records this concept was derived from.
    pub linked_episodes: Option<Vec<i64>>,
}

// ============================================================================
// PROCEDURAL
// ============================================================================

/// A named workflow of ordered steps with execution statistics.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProceduralMemory {
    /// Monotonically-increasing identity, unique within the procedural kind.
    pub id: i64,
    /// Unique natural key across all procedural records.
    pub procedure_name: String,
    /// What this procedure does.
    pub description: String,
    /// Why this procedure exists.
    pub purpose: Option<String>,
    /// Ordered, non-empty sequence of step descriptions.
    pub steps: Vec<String>,
    /// Arbitrary structured parameters, preserved but not interpreted.
    pub parameters: Option<serde_json::Value>,
    /// Success rate in `[0, 100]`, default `0`.
    pub success_rate: f64,
    /// Number of recorded executions.
    pub execution_count: i64,
    /// Running-mean execution duration in seconds, if any executions have
    /// supplied one.
    pub average_duration_seconds: Option<f64>,
    /// Names or free-text descriptions of prerequisite procedures/conditions.
    pub prerequisites: Vec<String>,
    /// Names or free-text descriptions of dependencies.
    pub dependencies: Vec<String>,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Free-form categories.
    pub categories: Vec<String>,
    /// When this procedure was last executed, if ever.
    pub last_executed: Option<String>,
    /// When this record was created.
    pub created_at: String,
    /// When this record was last mutated.
    pub updated_at: String,
}

/// Validated input to insert a new procedural record.
#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct NewProceduralMemory {
    /// Unique natural key across all procedural records. Required.
    pub procedure_name: String,
    /// What this procedure does. Required.
    pub description: String,
    /// Why this procedure exists.
    pub purpose: Option<String>,
    /// Ordered, non-empty sequence of step descriptions. Required.
    pub steps: Vec<String>,
    /// Arbitrary structured parameters.
    pub parameters: Option<serde_json::Value>,
    /// Success rate in `[0, 100]`; defaults to `0`.
    pub success_rate: Option<f64>,
    /// Names or free-text descriptions of prerequisite procedures/conditions.
    pub prerequisites: Option<Vec<String>>,
    /// Names or free-text descriptions of dependencies.
    pub dependencies: Option<Vec<String>>,
    /// Free-form tags; auto-populated from keywords if omitted or empty.
    pub tags: Option<Vec<String>>,
    /// Free-form categories.
    pub categories: Option<Vec<String>>,
}

// ============================================================================
// STATISTICS & RESULTS
// ============================================================================

/// A single most-retrieved-episode descriptor, part of [`MemoryStats`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MostRetrieved {
    /// The episode's id.
    pub id: i64,
    /// The episode's description.
    pub description: String,
    /// Its retrieval count.
    pub count: i64,
}

/// Aggregate statistics over the whole store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    /// Number of episodic records.
    pub episodic_count: i64,
    /// Number of semantic records.
    pub semantic_count: i64,
    /// Number of procedural records.
    pub procedural_count: i64,
    /// Sum of the three counts above.
    pub total_memories: i64,
    /// On-disk size of the database file, in bytes.
    pub database_size_bytes: u64,
    /// On-disk size of the database file, in megabytes (rounded to 2 places).
    pub database_size_mb: f64,
    /// Earliest episodic `timestamp`, if any episodes exist.
    pub oldest_episodic: Option<String>,
    /// Latest episodic `timestamp`, if any episodes exist.
    pub newest_episodic: Option<String>,
    /// Mean episodic `importance_score`, rounded to 2 places (`0` if none).
    pub avg_importance: f64,
    /// The single episode with the highest `retrieval_count`, if any.
    pub most_retrieved: Option<MostRetrieved>,
}

/// A candidate pair identified during consolidation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeCandidate {
    /// Id of the surviving record (lower index).
    pub id1: i64,
    /// Id of the record that would be (or was) merged away.
    pub id2: i64,
    /// Jaccard similarity between the two descriptions.
    pub similarity: f64,
    /// First 50 characters of `id1`'s description.
    pub desc1: String,
    /// First 50 characters of `id2`'s description.
    pub desc2: String,
}

/// Outcome of a consolidation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationResult {
    /// Number of records actually merged away (`0` for a dry run).
    pub merged_count: i64,
    /// Number of records archived (currently always `0`; no separate
    /// archival tier is implemented — see the consolidation design notes).
    pub archived_count: i64,
    /// Every pair that met the merge threshold, whether or not a merge was
    /// actually applied.
    pub candidates: Vec<MergeCandidate>,
}

/// Memories grouped by kind, as returned by tag fan-out search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaggedMemories {
    /// Matching episodic records.
    pub episodic: Vec<EpisodicMemory>,
    /// Matching semantic records.
    pub semantic: Vec<SemanticMemory>,
    /// Matching procedural records.
    pub procedural: Vec<ProceduralMemory>,
}

/// A single-document export of the whole store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    /// All episodic records, with their ids.
    pub episodic: Vec<EpisodicMemory>,
    /// All semantic records, with their ids.
    pub semantic: Vec<SemanticMemory>,
    /// All procedural records, with their ids.
    pub procedural: Vec<ProceduralMemory>,
    /// Statistics at the moment of export.
    pub statistics: MemoryStats,
    /// When the export was produced, ISO-8601 local time.
    pub export_timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_kind_display() {
        assert_eq!(MemoryKind::Episodic.to_string(), "episodic");
        assert_eq!(MemoryKind::Semantic.to_string(), "semantic");
        assert_eq!(MemoryKind::Procedural.to_string(), "procedural");
    }

    #[test]
    fn new_episodic_memory_deny_unknown_fields() {
        let json = serde_json::json!({
            "event_description": "alpha",
            "bogus_field": true
        });
        let result: Result<NewEpisodicMemory, _> = serde_json::from_value(json);
        assert!(result.is_err());
    }

    #[test]
    fn new_semantic_memory_required_fields_round_trip() {
        let json = serde_json::json!({
            "concept_name": "AI",
            "definition": "d1"
        });
        let input: NewSemanticMemory = serde_json::from_value(json).unwrap();
        assert_eq!(input.concept_name, "AI");
        assert_eq!(input.definition, "d1");
    }
}
