//! Embedded Storage (C2)
//!
//! SQLite-backed persistence: schema migrations and the [`Store`] that
//! wraps a writer/reader connection pair.

mod migrations;
mod store;

pub use migrations::{apply_migrations, get_current_version, Migration, MIGRATIONS};
pub use store::Store;
