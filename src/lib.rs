//! # Agent Memory Core
//!
//! A typed, embedded memory store for autonomous agents, split into three
//! disjoint kinds:
//!
//! - **Episodic** — time-stamped events with importance, emotional valence,
//!   and a retrieval counter that tracks which episodes actually get recalled.
//! - **Semantic** — named concepts with a definition and a confidence score.
//! - **Procedural** — named, ordered workflows with running execution
//!   statistics (success rate, average duration) rather than raw history.
//!
//! Storage is a local SQLite file (see [`storage`]); ranked retrieval —
//! context scoring, similarity search, temporal decay, associative chains —
//! lives in [`retrieval`]; both are fronted by the [`memory::Memory`] façade,
//! which is the type most callers should reach for first.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use agent_memory_core::{Config, Memory, NewEpisodicMemory};
//!
//! # fn main() -> agent_memory_core::Result<()> {
//! let memory = Memory::open(Config::default())?;
//!
//! let id = memory.store_episode(NewEpisodicMemory {
//!     event_description: "deployed the payments service".to_string(),
//!     importance_score: Some(80.0),
//!     ..Default::default()
//! })?;
//!
//! let episode = memory.recall_episode(id)?.expect("just inserted");
//! assert_eq!(episode.retrieval_count, 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod memory;
pub mod model;
pub mod retrieval;
pub mod storage;
pub mod util;

pub use config::{Config, ConsolidationConfig, DecayConfig, ImportanceCalculationConfig, RetrievalConfig};
pub use error::{ConfigParseError, MemoryError, Result};
pub use memory::{ConsolidationResult, Memory};
pub use model::{
    EpisodicMemory, ExportDocument, MemoryKind, MemoryStats, MergeCandidate, MostRetrieved,
    NewEpisodicMemory, NewProceduralMemory, NewSemanticMemory, ProceduralMemory, SemanticMemory,
    TaggedMemories,
};
pub use retrieval::{AnyMemory, Retrieval};
pub use storage::Store;

/// Crate version, as declared in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convenient imports for common usage.
pub mod prelude {
    pub use crate::{
        Config, EpisodicMemory, Memory, MemoryError, MemoryKind, MemoryStats, NewEpisodicMemory,
        NewProceduralMemory, NewSemanticMemory, ProceduralMemory, Result, SemanticMemory,
    };
}
