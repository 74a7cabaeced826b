//! SQLite Storage Implementation (C2)
//!
//! Durable schema, CRUD per memory kind, LIKE-style search, structured
//! filtering, statistics, JSON import/export, and file-level backup.
//!
//! Two connections to the same database file, each behind its own
//! [`Mutex`]: one writer, one reader. This gives the single-writer /
//! multiple-reader concurrency model without hand-rolling a lock-free
//! design — mutations always go through `writer`, plain reads through
//! `reader`, and the one documented exception (the episodic read side
//! effect) takes the writer lock because it performs a write.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{MemoryError, Result};
use crate::model::{
    EpisodicMemory, MemoryKind, MemoryStats, MostRetrieved, NewEpisodicMemory, NewProceduralMemory,
    NewSemanticMemory, ProceduralMemory, SemanticMemory,
};
use crate::util;

/// Embedded storage layer owning the database file.
pub struct Store {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
    path: PathBuf,
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;",
    )
}

impl Store {
    /// Open (creating if necessary) the database file at `path`, applying
    /// pending migrations on the writer connection.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let writer_conn = Connection::open(&path)?;
        configure_connection(&writer_conn)?;
        super::migrations::apply_migrations(&writer_conn)?;

        let reader_conn = Connection::open(&path)?;
        configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
            path,
        })
    }

    fn writer(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.writer.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn reader(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.reader.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Path to the underlying database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // ========================================================================
    // EPISODIC
    // ========================================================================

    /// Insert a new episodic record, defaulting `timestamp`/`created_at`/
    /// `updated_at` to "now" where omitted. Returns the new id.
    pub fn insert_episodic(&self, input: &NewEpisodicMemory) -> Result<i64> {
        let now = util::format_local(util::now_local());
        let timestamp = input.timestamp.clone().unwrap_or_else(|| now.clone());
        let conn = self.writer();
        conn.execute(
            "INSERT INTO episodic_memory
             (timestamp, duration_seconds, event_description, context, participants, location,
              sensory_data, observations, importance_score, emotional_valence,
              tags, categories, associated_concepts, retrieval_count, last_accessed,
              created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 0, NULL, ?14, ?14)",
            params![
                timestamp,
                input.duration_seconds,
                input.event_description,
                input.context,
                json_opt_vec(&input.participants),
                input.location,
                json_opt_value(&input.sensory_data),
                input.observations,
                input.importance_score.unwrap_or(50.0),
                input.emotional_valence.unwrap_or(0.0),
                json_opt_vec(&input.tags),
                json_opt_vec(&input.categories),
                json_opt_vec(&input.associated_concepts),
                now,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Fetch an episodic record by id. Atomically increments
    /// `retrieval_count` and sets `last_accessed = now` as part of the same
    /// statement round-trip. Returns `None` if no such record exists.
    pub fn get_episodic_by_id(&self, id: i64) -> Result<Option<EpisodicMemory>> {
        let conn = self.writer();
        let now = util::format_local(util::now_local());
        conn.execute(
            "UPDATE episodic_memory SET retrieval_count = retrieval_count + 1, last_accessed = ?1
             WHERE id = ?2",
            params![now, id],
        )?;
        let record = conn
            .query_row(
                EPISODIC_SELECT,
                params![id],
                row_to_episodic,
            )
            .optional()?;
        Ok(record)
    }

    /// List all episodic records ordered by `timestamp DESC`, bounded by an
    /// optional `limit`. Does not touch retrieval statistics.
    pub fn list_episodic(&self, limit: Option<usize>) -> Result<Vec<EpisodicMemory>> {
        let conn = self.reader();
        let sql = format!(
            "{EPISODIC_SELECT_ALL} ORDER BY timestamp DESC{}",
            limit_clause(limit)
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], row_to_episodic)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Case-insensitive substring search over `event_description`, `context`,
    /// and `observations`, ordered by `importance_score DESC, timestamp
    /// DESC`. Does not touch retrieval statistics.
    pub fn search_episodic(&self, query: &str, limit: usize) -> Result<Vec<EpisodicMemory>> {
        let conn = self.reader();
        let pattern = like_pattern(query);
        let sql = format!(
            "{EPISODIC_SELECT_ALL}
             WHERE event_description LIKE ?1 OR context LIKE ?1 OR observations LIKE ?1
             ORDER BY importance_score DESC, timestamp DESC
             LIMIT ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![pattern, limit as i64], row_to_episodic)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Conjunctive structured filter: timestamp range, minimum importance,
    /// and tag substrings. Ordered by `timestamp DESC`.
    pub fn filter_episodic(
        &self,
        start: Option<&str>,
        end: Option<&str>,
        min_importance: Option<f64>,
        tags: &[String],
    ) -> Result<Vec<EpisodicMemory>> {
        let conn = self.reader();
        let mut sql = format!("{EPISODIC_SELECT_ALL} WHERE 1=1");
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(start) = start {
            sql.push_str(" AND timestamp >= ?");
            values.push(Box::new(start.to_string()));
        }
        if let Some(end) = end {
            sql.push_str(" AND timestamp <= ?");
            values.push(Box::new(end.to_string()));
        }
        if let Some(min_importance) = min_importance {
            sql.push_str(" AND importance_score >= ?");
            values.push(Box::new(min_importance));
        }
        for tag in tags {
            sql.push_str(" AND tags LIKE ?");
            values.push(Box::new(like_pattern(tag)));
        }
        sql.push_str(" ORDER BY timestamp DESC");

        let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params.as_slice(), row_to_episodic)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Overwrite all mutable fields of an existing episodic record, bumping
    /// `updated_at`. Returns `false` if no record with that id exists.
    pub fn update_episodic(&self, record: &EpisodicMemory) -> Result<bool> {
        let now = util::format_local(util::now_local());
        let conn = self.writer();
        let changed = conn.execute(
            "UPDATE episodic_memory SET
                timestamp = ?1, duration_seconds = ?2, event_description = ?3, context = ?4,
                participants = ?5, location = ?6, sensory_data = ?7, observations = ?8,
                importance_score = ?9, emotional_valence = ?10, tags = ?11, categories = ?12,
                associated_concepts = ?13, retrieval_count = ?14, last_accessed = ?15,
                updated_at = ?16
             WHERE id = ?17",
            params![
                record.timestamp,
                record.duration_seconds,
                record.event_description,
                record.context,
                json_vec(&record.participants),
                record.location,
                json_opt_value(&record.sensory_data),
                record.observations,
                record.importance_score,
                record.emotional_valence,
                json_vec(&record.tags),
                json_vec(&record.categories),
                json_vec(&record.associated_concepts),
                record.retrieval_count,
                record.last_accessed,
                now,
                record.id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Hard-delete an episodic record by id. Returns `false` if it did not
    /// exist.
    pub fn delete_episodic(&self, id: i64) -> Result<bool> {
        let conn = self.writer();
        let changed = conn.execute("DELETE FROM episodic_memory WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    // ========================================================================
    // SEMANTIC
    // ========================================================================

    /// Insert a new semantic record. Returns
    /// [`MemoryError::UniquenessViolation`] if `concept_name` already exists.
    pub fn insert_semantic(&self, input: &NewSemanticMemory) -> Result<i64> {
        let now = util::format_local(util::now_local());
        let conn = self.writer();
        let result = conn.execute(
            "INSERT INTO semantic_memory
             (concept_name, definition, properties, relationships, confidence_score,
              source, evidence, tags, categories, linked_episodes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
            params![
                input.concept_name,
                input.definition,
                json_opt_value(&input.properties),
                json_opt_value(&input.relationships),
                input.confidence_score.unwrap_or(0.5),
                input.source,
                input.evidence,
                json_opt_vec(&input.tags),
                json_opt_vec(&input.categories),
                json_opt_ids(&input.linked_episodes),
                now,
            ],
        );
        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => Err(MemoryError::UniquenessViolation {
                kind: MemoryKind::Semantic,
                key: input.concept_name.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch a semantic record by id.
    pub fn get_semantic_by_id(&self, id: i64) -> Result<Option<SemanticMemory>> {
        let conn = self.reader();
        let record = conn
            .query_row(
                &format!("{SEMANTIC_SELECT_ALL} WHERE id = ?1"),
                params![id],
                row_to_semantic,
            )
            .optional()?;
        Ok(record)
    }

    /// Fetch a semantic record by its natural key.
    pub fn get_semantic_by_name(&self, concept_name: &str) -> Result<Option<SemanticMemory>> {
        let conn = self.reader();
        let record = conn
            .query_row(
                &format!("{SEMANTIC_SELECT_ALL} WHERE concept_name = ?1"),
                params![concept_name],
                row_to_semantic,
            )
            .optional()?;
        Ok(record)
    }

    /// List all semantic records ordered by `concept_name ASC`.
    pub fn list_semantic(&self, limit: Option<usize>) -> Result<Vec<SemanticMemory>> {
        let conn = self.reader();
        let sql = format!(
            "{SEMANTIC_SELECT_ALL} ORDER BY concept_name ASC{}",
            limit_clause(limit)
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], row_to_semantic)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Case-insensitive substring search over `concept_name` and
    /// `definition`, ordered by `confidence_score DESC`.
    pub fn search_semantic(&self, query: &str, limit: usize) -> Result<Vec<SemanticMemory>> {
        let conn = self.reader();
        let pattern = like_pattern(query);
        let sql = format!(
            "{SEMANTIC_SELECT_ALL}
             WHERE concept_name LIKE ?1 OR definition LIKE ?1
             ORDER BY confidence_score DESC
             LIMIT ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![pattern, limit as i64], row_to_semantic)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Overwrite all mutable fields of an existing semantic record, bumping
    /// `updated_at`. Returns `false` if no record with that id exists.
    pub fn update_semantic(&self, record: &SemanticMemory) -> Result<bool> {
        let now = util::format_local(util::now_local());
        let conn = self.writer();
        let changed = conn.execute(
            "UPDATE semantic_memory SET
                concept_name = ?1, definition = ?2, properties = ?3, relationships = ?4,
                confidence_score = ?5, source = ?6, evidence = ?7, tags = ?8, categories = ?9,
                linked_episodes = ?10, updated_at = ?11
             WHERE id = ?12",
            params![
                record.concept_name,
                record.definition,
                json_opt_value(&record.properties),
                json_opt_value(&record.relationships),
                record.confidence_score,
                record.source,
                record.evidence,
                json_vec(&record.tags),
                json_vec(&record.categories),
                json_ids(&record.linked_episodes),
                now,
                record.id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Hard-delete a semantic record by id. Returns `false` if it did not
    /// exist.
    pub fn delete_semantic(&self, id: i64) -> Result<bool> {
        let conn = self.writer();
        let changed = conn.execute("DELETE FROM semantic_memory WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    // ========================================================================
    // PROCEDURAL
    // ========================================================================

    /// Insert a new procedural record. Returns
    /// [`MemoryError::UniquenessViolation`] if `procedure_name` already
    /// exists.
    pub fn insert_procedural(&self, input: &NewProceduralMemory) -> Result<i64> {
        let now = util::format_local(util::now_local());
        let conn = self.writer();
        let result = conn.execute(
            "INSERT INTO procedural_memory
             (procedure_name, description, purpose, steps, parameters, success_rate,
              execution_count, average_duration_seconds, prerequisites, dependencies,
              tags, categories, last_executed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, NULL, ?7, ?8, ?9, ?10, NULL, ?11, ?11)",
            params![
                input.procedure_name,
                input.description,
                input.purpose,
                json_vec(&input.steps),
                json_opt_value(&input.parameters),
                input.success_rate.unwrap_or(0.0),
                json_opt_vec(&input.prerequisites),
                json_opt_vec(&input.dependencies),
                json_opt_vec(&input.tags),
                json_opt_vec(&input.categories),
                now,
            ],
        );
        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => Err(MemoryError::UniquenessViolation {
                kind: MemoryKind::Procedural,
                key: input.procedure_name.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch a procedural record by id.
    pub fn get_procedural_by_id(&self, id: i64) -> Result<Option<ProceduralMemory>> {
        let conn = self.reader();
        let record = conn
            .query_row(
                &format!("{PROCEDURAL_SELECT_ALL} WHERE id = ?1"),
                params![id],
                row_to_procedural,
            )
            .optional()?;
        Ok(record)
    }

    /// Fetch a procedural record by its natural key.
    pub fn get_procedural_by_name(&self, procedure_name: &str) -> Result<Option<ProceduralMemory>> {
        let conn = self.reader();
        let record = conn
            .query_row(
                &format!("{PROCEDURAL_SELECT_ALL} WHERE procedure_name = ?1"),
                params![procedure_name],
                row_to_procedural,
            )
            .optional()?;
        Ok(record)
    }

    /// List all procedural records ordered by `procedure_name ASC`.
    pub fn list_procedural(&self, limit: Option<usize>) -> Result<Vec<ProceduralMemory>> {
        let conn = self.reader();
        let sql = format!(
            "{PROCEDURAL_SELECT_ALL} ORDER BY procedure_name ASC{}",
            limit_clause(limit)
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], row_to_procedural)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Case-insensitive substring search over `procedure_name` and
    /// `description`, ordered by `success_rate DESC`.
    pub fn search_procedural(&self, query: &str, limit: usize) -> Result<Vec<ProceduralMemory>> {
        let conn = self.reader();
        let pattern = like_pattern(query);
        let sql = format!(
            "{PROCEDURAL_SELECT_ALL}
             WHERE procedure_name LIKE ?1 OR description LIKE ?1
             ORDER BY success_rate DESC
             LIMIT ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![pattern, limit as i64], row_to_procedural)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Overwrite all mutable fields of an existing procedural record,
    /// bumping `updated_at`. Returns `false` if no record with that id
    /// exists.
    pub fn update_procedural(&self, record: &ProceduralMemory) -> Result<bool> {
        let now = util::format_local(util::now_local());
        let conn = self.writer();
        let changed = conn.execute(
            "UPDATE procedural_memory SET
                procedure_name = ?1, description = ?2, purpose = ?3, steps = ?4, parameters = ?5,
                success_rate = ?6, execution_count = ?7, average_duration_seconds = ?8,
                prerequisites = ?9, dependencies = ?10, tags = ?11, categories = ?12,
                last_executed = ?13, updated_at = ?14
             WHERE id = ?15",
            params![
                record.procedure_name,
                record.description,
                record.purpose,
                json_vec(&record.steps),
                json_opt_value(&record.parameters),
                record.success_rate,
                record.execution_count,
                record.average_duration_seconds,
                json_vec(&record.prerequisites),
                json_vec(&record.dependencies),
                json_vec(&record.tags),
                json_vec(&record.categories),
                record.last_executed,
                now,
                record.id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Hard-delete a procedural record by id. Returns `false` if it did not
    /// exist.
    pub fn delete_procedural(&self, id: i64) -> Result<bool> {
        let conn = self.writer();
        let changed = conn.execute("DELETE FROM procedural_memory WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    // ========================================================================
    // STATISTICS
    // ========================================================================

    /// Aggregate statistics across all three kinds, plus on-disk file size.
    pub fn get_statistics(&self) -> Result<MemoryStats> {
        let conn = self.reader();

        let episodic_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM episodic_memory", [], |r| r.get(0))?;
        let semantic_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM semantic_memory", [], |r| r.get(0))?;
        let procedural_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM procedural_memory", [], |r| r.get(0))?;

        let (oldest_episodic, newest_episodic): (Option<String>, Option<String>) = conn
            .query_row(
                "SELECT MIN(timestamp), MAX(timestamp) FROM episodic_memory",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )?;

        let avg_importance: Option<f64> = conn.query_row(
            "SELECT AVG(importance_score) FROM episodic_memory",
            [],
            |r| r.get(0),
        )?;

        let most_retrieved = conn
            .query_row(
                "SELECT id, event_description, retrieval_count FROM episodic_memory
                 ORDER BY retrieval_count DESC LIMIT 1",
                [],
                |r| {
                    Ok(MostRetrieved {
                        id: r.get(0)?,
                        description: r.get(1)?,
                        count: r.get(2)?,
                    })
                },
            )
            .optional()?;

        let database_size_bytes = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        let database_size_mb = ((database_size_bytes as f64 / (1024.0 * 1024.0)) * 100.0).round() / 100.0;

        Ok(MemoryStats {
            episodic_count,
            semantic_count,
            procedural_count,
            total_memories: episodic_count + semantic_count + procedural_count,
            database_size_bytes,
            database_size_mb,
            oldest_episodic,
            newest_episodic,
            avg_importance: (avg_importance.unwrap_or(0.0) * 100.0).round() / 100.0,
            most_retrieved,
        })
    }

    // ========================================================================
    // BACKUP
    // ========================================================================

    /// Copy the database file to `backup_path`, holding the writer lock for
    /// the duration of the copy so no write is in flight.
    pub fn backup_to(&self, backup_path: &Path) -> Result<()> {
        let conn = self.writer();
        conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        std::fs::copy(&self.path, backup_path)?;
        Ok(())
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn limit_clause(limit: Option<usize>) -> String {
    match limit {
        Some(n) => format!(" LIMIT {n}"),
        None => String::new(),
    }
}

fn like_pattern(query: &str) -> String {
    format!("%{query}%")
}

fn json_vec(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

fn json_opt_vec(values: &Option<Vec<String>>) -> Option<String> {
    values.as_ref().map(|v| json_vec(v))
}

fn json_ids(values: &[i64]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

fn json_opt_ids(values: &Option<Vec<i64>>) -> Option<String> {
    values.as_ref().map(|v| json_ids(v))
}

fn json_opt_value(value: &Option<serde_json::Value>) -> Option<String> {
    value.as_ref().map(|v| v.to_string())
}

fn parse_json_vec(text: Option<String>) -> Vec<String> {
    text.and_then(|t| serde_json::from_str(&t).ok()).unwrap_or_default()
}

fn parse_json_ids(text: Option<String>) -> Vec<i64> {
    text.and_then(|t| serde_json::from_str(&t).ok()).unwrap_or_default()
}

fn parse_json_value(text: Option<String>) -> Option<serde_json::Value> {
    text.and_then(|t| serde_json::from_str(&t).ok())
}

const EPISODIC_SELECT_ALL: &str = "SELECT id, timestamp, duration_seconds, event_description, \
    context, participants, location, sensory_data, observations, importance_score, \
    emotional_valence, tags, categories, associated_concepts, retrieval_count, last_accessed, \
    created_at, updated_at FROM episodic_memory";

const EPISODIC_SELECT: &str = "SELECT id, timestamp, duration_seconds, event_description, \
    context, participants, location, sensory_data, observations, importance_score, \
    emotional_valence, tags, categories, associated_concepts, retrieval_count, last_accessed, \
    created_at, updated_at FROM episodic_memory WHERE id = ?1";

const SEMANTIC_SELECT_ALL: &str = "SELECT id, concept_name, definition, properties, \
    relationships, confidence_score, source, evidence, tags, categories, linked_episodes, \
    created_at, updated_at FROM semantic_memory";

const PROCEDURAL_SELECT_ALL: &str = "SELECT id, procedure_name, description, purpose, steps, \
    parameters, success_rate, execution_count, average_duration_seconds, prerequisites, \
    dependencies, tags, categories, last_executed, created_at, updated_at FROM procedural_memory";

fn row_to_episodic(row: &rusqlite::Row) -> rusqlite::Result<EpisodicMemory> {
    Ok(EpisodicMemory {
        id: row.get("id")?,
        timestamp: row.get("timestamp")?,
        duration_seconds: row.get("duration_seconds")?,
        event_description: row.get("event_description")?,
        context: row.get("context")?,
        participants: parse_json_vec(row.get("participants")?),
        location: row.get("location")?,
        sensory_data: parse_json_value(row.get("sensory_data")?),
        observations: row.get("observations")?,
        importance_score: row.get("importance_score")?,
        emotional_valence: row.get("emotional_valence")?,
        tags: parse_json_vec(row.get("tags")?),
        categories: parse_json_vec(row.get("categories")?),
        associated_concepts: parse_json_vec(row.get("associated_concepts")?),
        retrieval_count: row.get("retrieval_count")?,
        last_accessed: row.get("last_accessed")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn row_to_semantic(row: &rusqlite::Row) -> rusqlite::Result<SemanticMemory> {
    Ok(SemanticMemory {
        id: row.get("id")?,
        concept_name: row.get("concept_name")?,
        definition: row.get("definition")?,
        properties: parse_json_value(row.get("properties")?),
        relationships: parse_json_value(row.get("relationships")?),
        confidence_score: row.get("confidence_score")?,
        source: row.get("source")?,
        evidence: row.get("evidence")?,
        tags: parse_json_vec(row.get("tags")?),
        categories: parse_json_vec(row.get("categories")?),
        linked_episodes: parse_json_ids(row.get("linked_episodes")?),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn row_to_procedural(row: &rusqlite::Row) -> rusqlite::Result<ProceduralMemory> {
    Ok(ProceduralMemory {
        id: row.get("id")?,
        procedure_name: row.get("procedure_name")?,
        description: row.get("description")?,
        purpose: row.get("purpose")?,
        steps: parse_json_vec(row.get("steps")?),
        parameters: parse_json_value(row.get("parameters")?),
        success_rate: row.get("success_rate")?,
        execution_count: row.get("execution_count")?,
        average_duration_seconds: row.get("average_duration_seconds")?,
        prerequisites: parse_json_vec(row.get("prerequisites")?),
        dependencies: parse_json_vec(row.get("dependencies")?),
        tags: parse_json_vec(row.get("tags")?),
        categories: parse_json_vec(row.get("categories")?),
        last_executed: row.get("last_executed")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
