//! Store backends
//!
//! - `memory`: process-local tables, for tests and throwaway ledgers
//! - `sqlite`: durable SQLite database through sqlx

pub mod memory;
pub mod sqlite;

pub use memory::{MemoryStore, MemoryUnit};
pub use sqlite::{SqliteStore, SqliteUnit};
