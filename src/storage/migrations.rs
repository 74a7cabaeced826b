//! Database Migrations
//!
//! Schema migration definitions for the storage layer. Only one version
//! ships today, but migrations are structured as a table so additive
//! columns can be appended later without touching the apply logic.

/// Migration definitions.
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Initial schema: episodic, semantic, and procedural memory tables",
    up: MIGRATION_V1_UP,
}];

/// A database migration.
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number.
    pub version: u32,
    /// Description.
    pub description: &'static str,
    /// SQL to apply.
    pub up: &'static str,
}

/// V1: episodic, semantic, and procedural memory tables plus their indexes.
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS episodic_memory (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    duration_seconds REAL,
    event_description TEXT NOT NULL,
    context TEXT,
    participants TEXT,
    location TEXT,
    sensory_data TEXT,
    observations TEXT,
    importance_score REAL NOT NULL DEFAULT 50.0,
    emotional_valence REAL NOT NULL DEFAULT 0.0,
    tags TEXT,
    categories TEXT,
    associated_concepts TEXT,
    retrieval_count INTEGER NOT NULL DEFAULT 0,
    last_accessed TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_episodic_timestamp ON episodic_memory(timestamp);
CREATE INDEX IF NOT EXISTS idx_episodic_importance ON episodic_memory(importance_score);

CREATE TABLE IF NOT EXISTS semantic_memory (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    concept_name TEXT NOT NULL UNIQUE,
    definition TEXT NOT NULL,
    properties TEXT,
    relationships TEXT,
    confidence_score REAL NOT NULL DEFAULT 0.5,
    source TEXT,
    evidence TEXT,
    tags TEXT,
    categories TEXT,
    linked_episodes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_semantic_concept ON semantic_memory(concept_name);

CREATE TABLE IF NOT EXISTS procedural_memory (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    procedure_name TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL,
    purpose TEXT,
    steps TEXT NOT NULL,
    parameters TEXT,
    success_rate REAL NOT NULL DEFAULT 0.0,
    execution_count INTEGER NOT NULL DEFAULT 0,
    average_duration_seconds REAL,
    prerequisites TEXT,
    dependencies TEXT,
    tags TEXT,
    categories TEXT,
    last_executed TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_procedural_name ON procedural_memory(procedure_name);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// Get current schema version from database.
pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Apply pending migrations.
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                "Applying migration v{}: {}",
                migration.version,
                migration.description
            );
            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}
