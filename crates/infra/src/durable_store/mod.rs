//! Durable catalog storage boundary.
//!
//! The whole catalog is read once at startup and rewritten as one unit after
//! every mutation. No partial updates, no journal.

pub mod in_memory;
pub mod json_file;
pub mod r#trait;

pub use in_memory::InMemoryDurableStore;
pub use json_file::JsonFileStore;
pub use r#trait::{DurableStore, StoreError};
