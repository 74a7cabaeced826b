//! End-to-end scenarios exercising the memory façade against a real,
//! temporary SQLite file.

use agent_memory_core::{
    Config, Memory, MemoryError, MemoryKind, NewEpisodicMemory, NewProceduralMemory,
    NewSemanticMemory,
};
use tempfile::TempDir;

/// Owns a [`Memory`] backed by a database file in a scratch directory;
/// deleted on drop.
struct TestMemory {
    memory: Memory,
    _dir: TempDir,
}

impl TestMemory {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp directory");
        let mut config = Config::default();
        config.database_path = dir.path().join("test.db").to_string_lossy().to_string();
        let memory = Memory::open(config).expect("failed to open memory store");
        Self { memory, _dir: dir }
    }
}

#[test]
fn scenario_1_recall_updates_counter() {
    let t = TestMemory::new();
    let id = t
        .memory
        .store_episode(NewEpisodicMemory {
            event_description: "alpha".to_string(),
            timestamp: Some("2025-01-01T00:00:00".to_string()),
            ..Default::default()
        })
        .unwrap();

    let mut last_accessed_values = Vec::new();
    let mut final_episode = None;
    for _ in 0..3 {
        let episode = t.memory.recall_episode(id).unwrap().unwrap();
        last_accessed_values.push(episode.last_accessed.clone().unwrap());
        final_episode = Some(episode);
    }

    let final_episode = final_episode.unwrap();
    assert_eq!(final_episode.retrieval_count, 3);
    assert!(final_episode.last_accessed.is_some());
    assert!(last_accessed_values.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn scenario_2_semantic_uniqueness_violation() {
    let t = TestMemory::new();
    t.memory
        .store_concept(NewSemanticMemory {
            concept_name: "AI".to_string(),
            definition: "d1".to_string(),
            ..Default::default()
        })
        .unwrap();

    let result = t.memory.store_concept(NewSemanticMemory {
        concept_name: "AI".to_string(),
        definition: "d2".to_string(),
        ..Default::default()
    });
    assert!(matches!(result, Err(MemoryError::UniquenessViolation { .. })));

    let concept = t.memory.recall_concept("AI").unwrap().unwrap();
    assert_eq!(concept.definition, "d1");
}

#[test]
fn scenario_3_consolidation_dry_run_vs_apply() {
    let t = TestMemory::new();
    let id1 = t
        .memory
        .store_episode(NewEpisodicMemory {
            event_description: "user clicked login".to_string(),
            importance_score: Some(40.0),
            ..Default::default()
        })
        .unwrap();
    t.memory
        .store_episode(NewEpisodicMemory {
            event_description: "user clicked login".to_string(),
            importance_score: Some(80.0),
            ..Default::default()
        })
        .unwrap();

    let dry = t.memory.consolidate_memories(true).unwrap();
    assert_eq!(dry.candidates.len(), 1);
    assert_eq!(dry.merged_count, 0);

    let applied = t.memory.consolidate_memories(false).unwrap();
    assert_eq!(applied.merged_count, 1);

    let survivor = t.memory.recall_episode(id1).unwrap().unwrap();
    assert_eq!(survivor.importance_score, 80.0);
    assert_eq!(survivor.retrieval_count, 1);
}

#[test]
fn scenario_4_procedure_running_mean() {
    let t = TestMemory::new();
    t.memory
        .store_procedure(NewProceduralMemory {
            procedure_name: "Deploy".to_string(),
            description: "deploy the service".to_string(),
            steps: vec!["a".to_string()],
            ..Default::default()
        })
        .unwrap();

    t.memory.record_execution("Deploy", true, Some(2.0)).unwrap();
    t.memory.record_execution("Deploy", false, Some(4.0)).unwrap();
    t.memory.record_execution("Deploy", true, Some(6.0)).unwrap();

    let procedure = t.memory.recall_procedure("Deploy").unwrap().unwrap();
    assert_eq!(procedure.execution_count, 3);
    assert!((procedure.success_rate - 66.6667).abs() < 1e-3);
    assert_eq!(procedure.average_duration_seconds, Some(4.0));
}

#[test]
fn scenario_5_decay_threshold() {
    let t = TestMemory::new();
    let timestamp = (chrono::Local::now().naive_local() - chrono::Duration::days(30))
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string();
    t.memory
        .store_episode(NewEpisodicMemory {
            event_description: "old but important".to_string(),
            timestamp: Some(timestamp),
            importance_score: Some(100.0),
            ..Default::default()
        })
        .unwrap();

    // exp(-0.1 * 30 / 30) ~= 0.9048, so importance 100 decays to ~90.48 with
    // no retrieval boost (retrieval_count is still 0): above 85, below 95.
    let excluded = t.memory.get_important_episodes(95.0, 20).unwrap();
    assert!(excluded.is_empty());

    let included = t.memory.get_important_episodes(85.0, 20).unwrap();
    assert_eq!(included.len(), 1);

    let mut no_decay_config = Config::default();
    no_decay_config.decay.enabled = false;
    no_decay_config.database_path = t.memory.config().database_path.clone();
    let no_decay_memory = Memory::open(no_decay_config).unwrap();
    let undecayed = no_decay_memory.get_important_episodes(100.0, 20).unwrap();
    assert_eq!(undecayed.len(), 1);
    assert_eq!(undecayed[0].1, 100.0);
}

#[test]
fn scenario_6_associative_chain_termination() {
    let t = TestMemory::new();
    let id = t
        .memory
        .store_episode(NewEpisodicMemory {
            event_description: "seed event".to_string(),
            tags: Some(vec!["x".to_string()]),
            ..Default::default()
        })
        .unwrap();

    let chain = t.memory.get_memory_chain(id, 5).unwrap();
    assert_eq!(chain.len(), 1);
    assert_eq!(chain[0].id, id);
}

#[test]
fn validation_rejects_without_mutating_store() {
    let t = TestMemory::new();
    let before = t.memory.get_statistics().unwrap();

    let result = t.memory.store_episode(NewEpisodicMemory {
        event_description: "bad score".to_string(),
        importance_score: Some(150.0),
        ..Default::default()
    });
    assert!(matches!(result, Err(MemoryError::Validation(_))));

    let after = t.memory.get_statistics().unwrap();
    assert_eq!(before.episodic_count, after.episodic_count);
}

#[test]
fn ids_strictly_increase_across_successive_inserts() {
    let t = TestMemory::new();
    let id1 = t
        .memory
        .store_episode(NewEpisodicMemory {
            event_description: "first".to_string(),
            ..Default::default()
        })
        .unwrap();
    let id2 = t
        .memory
        .store_episode(NewEpisodicMemory {
            event_description: "second".to_string(),
            ..Default::default()
        })
        .unwrap();
    assert!(id2 > id1);
}

#[test]
fn export_then_import_round_trips_record_count() {
    let t = TestMemory::new();
    t.memory
        .store_episode(NewEpisodicMemory {
            event_description: "export me".to_string(),
            ..Default::default()
        })
        .unwrap();
    t.memory
        .store_concept(NewSemanticMemory {
            concept_name: "Round Trip".to_string(),
            definition: "a concept that survives export/import".to_string(),
            ..Default::default()
        })
        .unwrap();

    let export_dir = TempDir::new().unwrap();
    let export_path = export_dir.path().join("export.json");
    t.memory.export_all(&export_path).unwrap();

    let import_target = TestMemory::new();
    let imported = import_target.memory.import_memories(&export_path).unwrap();
    assert_eq!(imported, 2);

    let stats = import_target.memory.get_statistics().unwrap();
    assert_eq!(stats.episodic_count, 1);
    assert_eq!(stats.semantic_count, 1);
}

#[test]
fn delete_memory_returns_false_for_missing_id() {
    let t = TestMemory::new();
    assert!(!t.memory.delete_memory(99_999, MemoryKind::Episodic).unwrap());
}

#[test]
fn backup_creates_a_readable_copy() {
    let t = TestMemory::new();
    t.memory
        .store_episode(NewEpisodicMemory {
            event_description: "back me up".to_string(),
            ..Default::default()
        })
        .unwrap();

    let backup_dir = TempDir::new().unwrap();
    let backup_path = backup_dir.path().join("backup.db");
    let written = t.memory.backup(Some(&backup_path)).unwrap();
    assert_eq!(written, backup_path);
    assert!(backup_path.exists());

    let mut restored_config = Config::default();
    restored_config.database_path = backup_path.to_string_lossy().to_string();
    let restored = Memory::open(restored_config).unwrap();
    assert_eq!(restored.get_statistics().unwrap().episodic_count, 1);
}
