//! Storage infrastructure - SQLite pool, schema and in-memory store

mod in_memory;
pub mod migrations;
mod sqlite;

pub use in_memory::InMemoryStore;
pub use migrations::{schema_migrations, Migration, SqliteMigrator};
pub use sqlite::{connect, connect_in_memory};
