//! Memory Façade (C4)
//!
//! The public entry point. Owns one [`Store`] and one [`Config`], validates
//! through [`crate::util`] before any mutation, delegates ranked reads to
//! [`Retrieval`], and implements consolidation and import/export.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{MemoryError, Result};
use crate::model::{
    EpisodicMemory, ExportDocument, MemoryKind, MemoryStats, MergeCandidate, NewEpisodicMemory,
    NewProceduralMemory, NewSemanticMemory, ProceduralMemory, SemanticMemory, TaggedMemories,
};
use crate::retrieval::{AnyMemory, Retrieval};
use crate::storage::Store;
use crate::util;

/// Outcome of a [`Memory::consolidate_memories`] pass.
pub type ConsolidationResult = crate::model::ConsolidationResult;

/// The top-level handle applications hold. Cheap to construct once at
/// startup; internally synchronized, so a single instance may be shared
/// across threads behind an `Arc`.
pub struct Memory {
    store: Store,
    config: Config,
}

impl Memory {
    /// Open (creating if necessary) the database named by
    /// `config.database_path`.
    pub fn open(config: Config) -> Result<Self> {
        let store = Store::new(&config.database_path)?;
        Ok(Self { store, config })
    }

    /// Borrow this instance's effective configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn retrieval(&self) -> Retrieval<'_> {
        Retrieval::new(&self.store, &self.config)
    }

    // ==================== EPISODIC ====================

    /// Validate, auto-tag if needed, and persist a new episodic record.
    /// Returns the new id.
    pub fn store_episode(&self, mut input: NewEpisodicMemory) -> Result<i64> {
        let timestamp = input
            .timestamp
            .clone()
            .unwrap_or_else(|| util::format_local(util::now_local()));
        input.timestamp = Some(timestamp.clone());

        util::validate_episodic(
            &input.event_description,
            &timestamp,
            input.importance_score,
            input.emotional_valence,
        )
        .map_err(MemoryError::Validation)?;

        if input.tags.as_ref().map(|t| t.is_empty()).unwrap_or(true) {
            input.tags = Some(util::extract_keywords(&input.event_description, 5));
        }

        self.store.insert_episodic(&input)
    }

    /// Recall an episodic record by id. Updates its retrieval count and
    /// `last_accessed` as a side effect.
    pub fn recall_episode(&self, id: i64) -> Result<Option<EpisodicMemory>> {
        self.store.get_episodic_by_id(id)
    }

    /// Case-insensitive substring search over episodic records.
    pub fn search_episodes(&self, query: &str, limit: usize) -> Result<Vec<EpisodicMemory>> {
        self.store.search_episodic(query, limit)
    }

    /// Episodic records created within the last `days` days.
    pub fn get_recent_episodes(&self, days: i64, limit: usize) -> Result<Vec<EpisodicMemory>> {
        let results = self
            .retrieval()
            .retrieve_recent(MemoryKind::Episodic, days, limit)?;
        Ok(as_episodic(results))
    }

    /// Episodes whose decay+boost adjusted importance is at or above
    /// `min_importance`, paired with that adjusted score.
    pub fn get_important_episodes(
        &self,
        min_importance: f64,
        limit: usize,
    ) -> Result<Vec<(EpisodicMemory, f64)>> {
        self.retrieval().retrieve_by_importance(min_importance, limit)
    }

    // ==================== SEMANTIC ====================

    /// Validate, auto-tag if needed, and persist a new semantic record.
    /// Returns the new id, or [`MemoryError::UniquenessViolation`] if
    /// `concept_name` already exists.
    pub fn store_concept(&self, mut input: NewSemanticMemory) -> Result<i64> {
        util::validate_semantic(&input.concept_name, &input.definition, input.confidence_score)
            .map_err(MemoryError::Validation)?;

        if input.tags.as_ref().map(|t| t.is_empty()).unwrap_or(true) {
            input.tags = Some(util::extract_keywords(&input.definition, 5));
        }

        self.store.insert_semantic(&input)
    }

    /// Recall a semantic record by its natural key.
    pub fn recall_concept(&self, concept_name: &str) -> Result<Option<SemanticMemory>> {
        self.store.get_semantic_by_name(concept_name)
    }

    /// Case-insensitive substring search over semantic records.
    pub fn search_concepts(&self, query: &str, limit: usize) -> Result<Vec<SemanticMemory>> {
        self.store.search_semantic(query, limit)
    }

    /// Overwrite a concept's confidence score. No-op (returns `false`) if the
    /// concept does not exist.
    pub fn update_concept_confidence(&self, concept_name: &str, new_confidence: f64) -> Result<bool> {
        let Some(mut concept) = self.store.get_semantic_by_name(concept_name)? else {
            return Ok(false);
        };
        concept.confidence_score = new_confidence;
        self.store.update_semantic(&concept)
    }

    // ==================== PROCEDURAL ====================

    /// Validate, auto-tag if needed, and persist a new procedural record.
    /// Returns the new id, or [`MemoryError::UniquenessViolation`] if
    /// `procedure_name` already exists.
    pub fn store_procedure(&self, mut input: NewProceduralMemory) -> Result<i64> {
        util::validate_procedural(
            &input.procedure_name,
            &input.description,
            &input.steps,
            input.success_rate,
        )
        .map_err(MemoryError::Validation)?;

        if input.tags.as_ref().map(|t| t.is_empty()).unwrap_or(true) {
            input.tags = Some(util::extract_keywords(&input.description, 5));
        }

        self.store.insert_procedural(&input)
    }

    /// Recall a procedural record by its natural key.
    pub fn recall_procedure(&self, procedure_name: &str) -> Result<Option<ProceduralMemory>> {
        self.store.get_procedural_by_name(procedure_name)
    }

    /// Record one execution outcome, updating `execution_count`,
    /// `success_rate`, `average_duration_seconds`, and `last_executed` via a
    /// running-mean update. No raw execution history is retained. No-op
    /// (returns `false`) if the procedure does not exist.
    pub fn record_execution(
        &self,
        procedure_name: &str,
        success: bool,
        duration: Option<f64>,
    ) -> Result<bool> {
        let Some(mut procedure) = self.store.get_procedural_by_name(procedure_name)? else {
            return Ok(false);
        };

        let n_old = procedure.execution_count;
        let n_new = n_old + 1;
        let s_old = procedure.success_rate;
        let outcome = if success { 100.0 } else { 0.0 };
        let s_new = (s_old * n_old as f64 + outcome) / n_new as f64;

        let d_new = match duration {
            Some(duration) => {
                let d_old = procedure.average_duration_seconds.unwrap_or(0.0);
                Some((d_old * n_old as f64 + duration) / n_new as f64)
            }
            None => procedure.average_duration_seconds,
        };

        procedure.execution_count = n_new;
        procedure.success_rate = s_new;
        procedure.average_duration_seconds = d_new;
        procedure.last_executed = Some(util::format_local(util::now_local()));

        self.store.update_procedural(&procedure)
    }

    /// Case-insensitive substring search over procedural records.
    pub fn search_procedures(&self, query: &str, limit: usize) -> Result<Vec<ProceduralMemory>> {
        self.store.search_procedural(query, limit)
    }

    // ==================== ADVANCED RETRIEVAL ====================

    /// Find records of `kind` similar to `reference_id`, sorted by
    /// descending Jaccard similarity.
    pub fn find_similar_memories(
        &self,
        reference_id: i64,
        kind: MemoryKind,
        limit: usize,
    ) -> Result<Vec<(AnyMemory, f64)>> {
        self.retrieval().retrieve_similar(reference_id, kind, limit)
    }

    /// Score records of `kind` against `keywords`, dropping zero scores.
    pub fn retrieve_by_context(
        &self,
        keywords: &[String],
        kind: MemoryKind,
        limit: usize,
    ) -> Result<Vec<(AnyMemory, f64)>> {
        self.retrieval().retrieve_by_context(keywords, kind, limit)
    }

    /// Build an associative chain starting from `start_memory_id`. Returns
    /// an empty chain if the seed does not exist.
    pub fn get_memory_chain(&self, start_memory_id: i64, max_depth: usize) -> Result<Vec<EpisodicMemory>> {
        let Some(seed) = self.store.get_episodic_by_id(start_memory_id)? else {
            return Ok(Vec::new());
        };
        self.retrieval().retrieve_associative_chain(seed, max_depth)
    }

    /// Search all three kinds for an exact (case-insensitive) tag match.
    pub fn search_by_tag(&self, tag: &str, limit: usize) -> Result<TaggedMemories> {
        self.retrieval().retrieve_by_tag(tag, limit)
    }

    // ==================== CONSOLIDATION ====================

    /// Merge near-duplicate episodes (Jaccard similarity of
    /// `event_description` at or above `merge_similarity_threshold`). A
    /// no-op, returning an empty result, if consolidation is disabled in
    /// config. On a dry run, candidates are reported but nothing is mutated.
    pub fn consolidate_memories(&self, dry_run: bool) -> Result<ConsolidationResult> {
        if !self.config.consolidation.enabled {
            return Ok(ConsolidationResult::default());
        }

        let threshold = self.config.consolidation.merge_similarity_threshold;
        // A plain snapshot, not a side-effecting `get_episodic_by_id` lookup:
        // merging must never perturb the very `retrieval_count`s it sums.
        let mut episodes = self.store.list_episodic(None)?;

        let mut merged_ids = std::collections::HashSet::new();
        let mut candidates = Vec::new();
        let mut merged_count = 0i64;

        for i in 0..episodes.len() {
            if merged_ids.contains(&episodes[i].id) {
                continue;
            }
            for j in (i + 1)..episodes.len() {
                if merged_ids.contains(&episodes[j].id) {
                    continue;
                }
                let similarity = util::jaccard_similarity(
                    &episodes[i].event_description,
                    &episodes[j].event_description,
                );
                if similarity < threshold {
                    continue;
                }

                candidates.push(MergeCandidate {
                    id1: episodes[i].id,
                    id2: episodes[j].id,
                    similarity,
                    desc1: truncate_chars(&episodes[i].event_description, 50),
                    desc2: truncate_chars(&episodes[j].event_description, 50),
                });

                if dry_run {
                    continue;
                }

                let merge_id = episodes[j].id;
                let merged_retrieval_count = episodes[j].retrieval_count;
                let merged_importance = episodes[j].importance_score;
                let merged_tags = episodes[j].tags.clone();

                let keep = &mut episodes[i];
                keep.retrieval_count += merged_retrieval_count;
                keep.importance_score = keep.importance_score.max(merged_importance);
                keep.tags = util::merge_tags(&[keep.tags.clone(), merged_tags]);
                self.store.update_episodic(keep)?;
                self.store.delete_episodic(merge_id)?;

                merged_ids.insert(merge_id);
                merged_count += 1;
            }
        }

        Ok(ConsolidationResult {
            merged_count,
            archived_count: 0,
            candidates,
        })
    }

    // ==================== STATISTICS & MANAGEMENT ====================

    /// Aggregate statistics across all three kinds.
    pub fn get_statistics(&self) -> Result<MemoryStats> {
        self.store.get_statistics()
    }

    /// Copy the database file to `backup_path`, or to a timestamped default
    /// name alongside it if omitted. Returns the path written to.
    pub fn backup(&self, backup_path: Option<&Path>) -> Result<PathBuf> {
        let path = match backup_path {
            Some(p) => p.to_path_buf(),
            None => {
                let stamp = util::now_local().format("%Y%m%d_%H%M%S").to_string();
                let mut default = self.store.path().to_path_buf();
                let stem = default
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("memory_database")
                    .to_string();
                default.set_file_name(format!("{stem}_backup_{stamp}.db"));
                default
            }
        };
        self.store.backup_to(&path)?;
        Ok(path)
    }

    /// Export every record of every kind, plus current statistics, to a
    /// single JSON document at `output_path`.
    pub fn export_all(&self, output_path: &Path) -> Result<()> {
        let document = ExportDocument {
            episodic: self.store.list_episodic(None)?,
            semantic: self.store.list_semantic(None)?,
            procedural: self.store.list_procedural(None)?,
            statistics: self.store.get_statistics()?,
            export_timestamp: util::format_local(util::now_local()),
        };
        let file = std::fs::File::create(output_path)?;
        serde_json::to_writer_pretty(file, &document)?;
        Ok(())
    }

    /// Import records from a JSON document previously produced by
    /// [`Memory::export_all`]. Each record's `id` is discarded and a fresh
    /// one assigned on insert. A record that fails to import (validation or
    /// uniqueness) is logged and skipped; the batch continues. Returns the
    /// number of records successfully imported.
    pub fn import_memories(&self, input_path: &Path) -> Result<usize> {
        let file = std::fs::File::open(input_path)?;
        let document: ExportDocument = serde_json::from_reader(file)?;
        let mut imported = 0usize;

        for episode in document.episodic {
            let input = NewEpisodicMemory {
                timestamp: Some(episode.timestamp),
                duration_seconds: episode.duration_seconds,
                event_description: episode.event_description,
                context: episode.context,
                participants: Some(episode.participants),
                location: episode.location,
                sensory_data: episode.sensory_data,
                observations: episode.observations,
                importance_score: Some(episode.importance_score),
                emotional_valence: Some(episode.emotional_valence),
                tags: Some(episode.tags),
                categories: Some(episode.categories),
                associated_concepts: Some(episode.associated_concepts),
            };
            match self.store.insert_episodic(&input) {
                Ok(_) => imported += 1,
                Err(e) => tracing::warn!("error importing episodic memory: {e}"),
            }
        }

        for concept in document.semantic {
            let input = NewSemanticMemory {
                concept_name: concept.concept_name,
                definition: concept.definition,
                properties: concept.properties,
                relationships: concept.relationships,
                confidence_score: Some(concept.confidence_score),
                source: concept.source,
                evidence: concept.evidence,
                tags: Some(concept.tags),
                categories: Some(concept.categories),
                linked_episodes: Some(concept.linked_episodes),
            };
            match self.store.insert_semantic(&input) {
                Ok(_) => imported += 1,
                Err(e) => tracing::warn!("error importing semantic memory: {e}"),
            }
        }

        for procedure in document.procedural {
            let input = NewProceduralMemory {
                procedure_name: procedure.procedure_name,
                description: procedure.description,
                purpose: procedure.purpose,
                steps: procedure.steps,
                parameters: procedure.parameters,
                success_rate: Some(procedure.success_rate),
                prerequisites: Some(procedure.prerequisites),
                dependencies: Some(procedure.dependencies),
                tags: Some(procedure.tags),
                categories: Some(procedure.categories),
            };
            match self.store.insert_procedural(&input) {
                Ok(_) => imported += 1,
                Err(e) => tracing::warn!("error importing procedural memory: {e}"),
            }
        }

        Ok(imported)
    }

    /// Delete a single record by id and kind. Returns `false` if it did not
    /// exist.
    pub fn delete_memory(&self, id: i64, kind: MemoryKind) -> Result<bool> {
        match kind {
            MemoryKind::Episodic => self.store.delete_episodic(id),
            MemoryKind::Semantic => self.store.delete_semantic(id),
            MemoryKind::Procedural => self.store.delete_procedural(id),
        }
    }
}

fn as_episodic(records: Vec<AnyMemory>) -> Vec<EpisodicMemory> {
    records
        .into_iter()
        .filter_map(|m| match m {
            AnyMemory::Episodic(e) => Some(e),
            _ => None,
        })
        .collect()
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_memory() -> (TempDir, Memory) {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.database_path = dir.path().join("test.db").to_string_lossy().to_string();
        let memory = Memory::open(config).unwrap();
        (dir, memory)
    }

    #[test]
    fn recall_episode_increments_retrieval_count_three_times() {
        let (_dir, memory) = temp_memory();
        let id = memory
            .store_episode(NewEpisodicMemory {
                event_description: "met with the design team".to_string(),
                ..Default::default()
            })
            .unwrap();

        for expected in 1..=3 {
            let episode = memory.recall_episode(id).unwrap().unwrap();
            assert_eq!(episode.retrieval_count, expected);
        }
    }

    #[test]
    fn store_concept_rejects_duplicate_name() {
        let (_dir, memory) = temp_memory();
        memory
            .store_concept(NewSemanticMemory {
                concept_name: "AI Agent".to_string(),
                definition: "d1".to_string(),
                ..Default::default()
            })
            .unwrap();

        let result = memory.store_concept(NewSemanticMemory {
            concept_name: "AI Agent".to_string(),
            definition: "d2".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(MemoryError::UniquenessViolation { .. })));
    }

    #[test]
    fn record_execution_computes_running_mean_over_three_calls() {
        let (_dir, memory) = temp_memory();
        memory
            .store_procedure(NewProceduralMemory {
                procedure_name: "Deploy".to_string(),
                description: "deploy the service".to_string(),
                steps: vec!["build".to_string(), "ship".to_string()],
                ..Default::default()
            })
            .unwrap();

        memory.record_execution("Deploy", true, Some(10.0)).unwrap();
        memory.record_execution("Deploy", false, Some(20.0)).unwrap();
        memory.record_execution("Deploy", true, Some(30.0)).unwrap();

        let procedure = memory.recall_procedure("Deploy").unwrap().unwrap();
        assert_eq!(procedure.execution_count, 3);
        assert!((procedure.success_rate - (200.0 / 3.0)).abs() < 1e-9);
        assert!((procedure.average_duration_seconds.unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn consolidate_dry_run_reports_without_mutating() {
        let (_dir, memory) = temp_memory();
        memory
            .store_episode(NewEpisodicMemory {
                event_description: "alpha beta gamma delta epsilon".to_string(),
                ..Default::default()
            })
            .unwrap();
        memory
            .store_episode(NewEpisodicMemory {
                event_description: "alpha beta gamma delta zeta".to_string(),
                ..Default::default()
            })
            .unwrap();

        let dry = memory.consolidate_memories(true).unwrap();
        assert_eq!(dry.merged_count, 0);
        assert_eq!(dry.candidates.len(), 1);
        assert_eq!(memory.get_statistics().unwrap().episodic_count, 2);

        let applied = memory.consolidate_memories(false).unwrap();
        assert_eq!(applied.merged_count, 1);
        assert_eq!(memory.get_statistics().unwrap().episodic_count, 1);
    }
}
