pub mod db;
pub mod memory;
pub mod migrations;
pub mod store;

pub use db::SqliteStore;
pub use memory::MemoryStore;
pub use store::{ReviewStore, StorageError, WriteOutcome};
