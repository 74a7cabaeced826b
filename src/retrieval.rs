//! Ranked Retrieval (C3)
//!
//! Context scoring, temporal windows, similarity search, importance with
//! decay + retrieval boost, associative chains, and tag fan-out. Every
//! operation here reads through [`Store`] and scores with [`crate::util`];
//! none of them mutate state, with the one documented exception of the
//! episodic read side effect that `Store::get_episodic_by_id` itself
//! performs when an associative chain step loads a record by id.

use crate::config::Config;
use crate::error::Result;
use crate::model::{EpisodicMemory, MemoryKind, ProceduralMemory, SemanticMemory, TaggedMemories};
use crate::storage::Store;
use crate::util;

/// A record of unknown kind, as returned by the kind-parametric retrieval
/// operations.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyMemory {
    /// An episodic record.
    Episodic(EpisodicMemory),
    /// A semantic record.
    Semantic(SemanticMemory),
    /// A procedural record.
    Procedural(ProceduralMemory),
}

impl AnyMemory {
    /// This record's id, regardless of kind.
    pub fn id(&self) -> i64 {
        match self {
            AnyMemory::Episodic(m) => m.id,
            AnyMemory::Semantic(m) => m.id,
            AnyMemory::Procedural(m) => m.id,
        }
    }

    fn created_at(&self) -> &str {
        match self {
            AnyMemory::Episodic(m) => &m.created_at,
            AnyMemory::Semantic(m) => &m.created_at,
            AnyMemory::Procedural(m) => &m.created_at,
        }
    }

    fn searchable_text(&self) -> String {
        match self {
            AnyMemory::Episodic(m) => format!(
                "{} {} {}",
                m.event_description,
                m.context.as_deref().unwrap_or(""),
                m.observations.as_deref().unwrap_or("")
            ),
            AnyMemory::Semantic(m) => format!("{} {}", m.concept_name, m.definition),
            AnyMemory::Procedural(m) => format!("{} {}", m.procedure_name, m.description),
        }
    }

    fn weight(&self) -> f64 {
        match self {
            AnyMemory::Episodic(m) => m.importance_score / 100.0,
            AnyMemory::Semantic(m) => m.confidence_score,
            AnyMemory::Procedural(m) => m.success_rate / 100.0,
        }
    }

    fn reference_text(&self) -> &str {
        match self {
            AnyMemory::Episodic(m) => &m.event_description,
            AnyMemory::Semantic(m) => &m.definition,
            AnyMemory::Procedural(m) => &m.description,
        }
    }
}

/// Ranked retrieval over a [`Store`], tuned by a [`Config`].
pub struct Retrieval<'a> {
    store: &'a Store,
    config: &'a Config,
}

impl<'a> Retrieval<'a> {
    /// Borrow a store and config for the lifetime of the returned value.
    pub fn new(store: &'a Store, config: &'a Config) -> Self {
        Self { store, config }
    }

    fn all_of_kind(&self, kind: MemoryKind) -> Result<Vec<AnyMemory>> {
        Ok(match kind {
            MemoryKind::Episodic => self
                .store
                .list_episodic(None)?
                .into_iter()
                .map(AnyMemory::Episodic)
                .collect(),
            MemoryKind::Semantic => self
                .store
                .list_semantic(None)?
                .into_iter()
                .map(AnyMemory::Semantic)
                .collect(),
            MemoryKind::Procedural => self
                .store
                .list_procedural(None)?
                .into_iter()
                .map(AnyMemory::Procedural)
                .collect(),
        })
    }

    /// Score every record of `kind` against `context_keywords` and return the
    /// top `limit` by descending score. Zero-score candidates are dropped.
    pub fn retrieve_by_context(
        &self,
        context_keywords: &[String],
        kind: MemoryKind,
        limit: usize,
    ) -> Result<Vec<(AnyMemory, f64)>> {
        if context_keywords.is_empty() {
            return Ok(Vec::new());
        }
        let mut scored: Vec<(AnyMemory, f64)> = self
            .all_of_kind(kind)?
            .into_iter()
            .filter_map(|m| {
                let score = context_score(&m, context_keywords);
                (score > 0.0).then_some((m, score))
            })
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    /// Retrieve records of `kind` falling within the date range named by
    /// `period` (`today`, `yesterday`, `this_week`, `this_month`,
    /// `last_<N>_days`). Episodic uses the Store's structured filter;
    /// semantic/procedural filter by `created_at` after a full read.
    pub fn retrieve_by_time_period(&self, period: &str, kind: MemoryKind) -> Result<Vec<AnyMemory>> {
        let (start, end) = util::parse_date_range(period);
        let (Some(start), Some(end)) = (start, end) else {
            return Ok(Vec::new());
        };

        match kind {
            MemoryKind::Episodic => Ok(self
                .store
                .filter_episodic(Some(&start), Some(&end), None, &[])?
                .into_iter()
                .map(AnyMemory::Episodic)
                .collect()),
            other => Ok(self
                .all_of_kind(other)?
                .into_iter()
                .filter(|m| m.created_at() >= start.as_str() && m.created_at() <= end.as_str())
                .collect()),
        }
    }

    /// Find records of `kind` similar to `reference_id`'s text (by
    /// `similarity_threshold`, default `0.3`), excluding the reference
    /// itself, sorted by descending similarity.
    pub fn retrieve_similar(
        &self,
        reference_id: i64,
        kind: MemoryKind,
        limit: usize,
    ) -> Result<Vec<(AnyMemory, f64)>> {
        let candidates = self.all_of_kind(kind)?;
        let Some(reference) = candidates.iter().find(|m| m.id() == reference_id) else {
            return Ok(Vec::new());
        };
        let ref_text = reference.reference_text().to_string();
        let threshold = self.config.retrieval.similarity_threshold;

        let mut scored: Vec<(AnyMemory, f64)> = candidates
            .into_iter()
            .filter(|m| m.id() != reference_id)
            .filter_map(|m| {
                let similarity = util::jaccard_similarity(&ref_text, m.reference_text());
                (similarity >= threshold).then_some((m, similarity))
            })
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    /// Episodes with decay + retrieval-boost adjusted importance at or above
    /// `min_importance`, sorted descending. If decay is disabled in config,
    /// stored importance is used directly without a boost.
    pub fn retrieve_by_importance(
        &self,
        min_importance: f64,
        limit: usize,
    ) -> Result<Vec<(EpisodicMemory, f64)>> {
        let episodes = self.store.list_episodic(None)?;
        let mut scored: Vec<(EpisodicMemory, f64)> = episodes
            .into_iter()
            .map(|m| {
                let adjusted = if self.config.decay.enabled {
                    let decayed = util::apply_temporal_decay(
                        m.importance_score,
                        &m.timestamp,
                        self.config.decay.decay_rate,
                        self.config.decay.half_life_days,
                    );
                    let boost = util::calculate_retrieval_boost(
                        m.retrieval_count,
                        self.config.importance_calculation.retrieval_boost_factor,
                    );
                    decayed + boost
                } else {
                    m.importance_score
                };
                (m, adjusted)
            })
            .filter(|(_, adjusted)| *adjusted >= min_importance)
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    /// Follow associative links (tags and associated concepts) from `seed`
    /// up to `max_depth` hops, returning the chain in traversal order,
    /// starting with the seed itself.
    pub fn retrieve_associative_chain(
        &self,
        seed: EpisodicMemory,
        max_depth: usize,
    ) -> Result<Vec<EpisodicMemory>> {
        let mut visited = std::collections::HashSet::new();
        visited.insert(seed.id);
        let mut chain = vec![seed];

        for _ in 0..max_depth {
            let current = chain.last().expect("chain always has a seed");
            let mut search_terms: Vec<String> = current.associated_concepts.clone();
            search_terms.extend(current.tags.clone());
            if search_terms.is_empty() {
                break;
            }

            let mut next: Option<EpisodicMemory> = None;
            for term in search_terms.iter().take(3) {
                let results = self.store.search_episodic(term, 5)?;
                if let Some(found) = results.into_iter().find(|r| !visited.contains(&r.id)) {
                    next = Some(found);
                    break;
                }
            }

            let Some(next) = next else { break };
            visited.insert(next.id);
            chain.push(next);
        }

        Ok(chain)
    }

    /// Group records carrying `tag` (case-insensitive exact match) by kind,
    /// each group bounded by `limit`.
    pub fn retrieve_by_tag(&self, tag: &str, limit: usize) -> Result<TaggedMemories> {
        let tag_lower = tag.to_lowercase();
        let has_tag = |tags: &[String]| tags.iter().any(|t| t.to_lowercase() == tag_lower);

        let episodic = self
            .store
            .list_episodic(None)?
            .into_iter()
            .filter(|m| has_tag(&m.tags))
            .take(limit)
            .collect();
        let semantic = self
            .store
            .list_semantic(None)?
            .into_iter()
            .filter(|m| has_tag(&m.tags))
            .take(limit)
            .collect();
        let procedural = self
            .store
            .list_procedural(None)?
            .into_iter()
            .filter(|m| has_tag(&m.tags))
            .take(limit)
            .collect();

        Ok(TaggedMemories {
            episodic,
            semantic,
            procedural,
        })
    }

    /// Convenience over [`Retrieval::retrieve_by_time_period`] with an
    /// explicit `days`-wide trailing window.
    pub fn retrieve_recent(&self, kind: MemoryKind, days: i64, limit: usize) -> Result<Vec<AnyMemory>> {
        let now = util::now_local();
        let start = util::format_local(now - chrono::Duration::days(days));
        let end = util::format_local(now);

        match kind {
            MemoryKind::Episodic => Ok(self
                .store
                .filter_episodic(Some(&start), Some(&end), None, &[])?
                .into_iter()
                .map(AnyMemory::Episodic)
                .collect()),
            other => {
                let mut results: Vec<AnyMemory> = self
                    .all_of_kind(other)?
                    .into_iter()
                    .filter(|m| m.created_at() >= start.as_str())
                    .collect();
                results.sort_by(|a, b| b.created_at().cmp(a.created_at()));
                results.truncate(limit);
                Ok(results)
            }
        }
    }
}

fn context_score(memory: &AnyMemory, keywords: &[String]) -> f64 {
    let text = memory.searchable_text().to_lowercase();
    let matches = keywords
        .iter()
        .filter(|k| text.contains(&k.to_lowercase()))
        .count();
    let base_score = matches as f64 / keywords.len() as f64;
    base_score * memory.weight()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewEpisodicMemory;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.db");
        let store = Store::new(&path).unwrap();
        (dir, store)
    }

    #[test]
    fn retrieve_by_context_drops_zero_scores_and_ranks() {
        let (_dir, store) = temp_store();
        let config = Config::default();

        store
            .insert_episodic(&NewEpisodicMemory {
                event_description: "deployed the payments service".to_string(),
                importance_score: Some(80.0),
                ..Default::default()
            })
            .unwrap();
        store
            .insert_episodic(&NewEpisodicMemory {
                event_description: "walked the dog".to_string(),
                importance_score: Some(10.0),
                ..Default::default()
            })
            .unwrap();

        let retrieval = Retrieval::new(&store, &config);
        let results = retrieval
            .retrieve_by_context(&["payments".to_string()], MemoryKind::Episodic, 10)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].0.searchable_text().contains("payments"));
    }

    #[test]
    fn retrieve_similar_excludes_reference_by_id() {
        let (_dir, store) = temp_store();
        let config = Config::default();

        let id1 = store
            .insert_episodic(&NewEpisodicMemory {
                event_description: "the quick brown fox jumps over the lazy dog".to_string(),
                ..Default::default()
            })
            .unwrap();
        store
            .insert_episodic(&NewEpisodicMemory {
                event_description: "the quick brown fox jumps over a sleepy dog".to_string(),
                ..Default::default()
            })
            .unwrap();

        let retrieval = Retrieval::new(&store, &config);
        let results = retrieval
            .retrieve_similar(id1, MemoryKind::Episodic, 10)
            .unwrap();
        assert!(results.iter().all(|(m, _)| m.id() != id1));
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn associative_chain_terminates_with_no_matching_neighbor() {
        let (_dir, store) = temp_store();
        let config = Config::default();

        let id = store
            .insert_episodic(&NewEpisodicMemory {
                event_description: "lonely event".to_string(),
                tags: Some(vec!["orphan-tag".to_string()]),
                ..Default::default()
            })
            .unwrap();
        let seed = store.get_episodic_by_id(id).unwrap().unwrap();

        let retrieval = Retrieval::new(&store, &config);
        let chain = retrieval.retrieve_associative_chain(seed, 5).unwrap();
        assert_eq!(chain.len(), 1);
    }
}
