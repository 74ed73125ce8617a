//! State store implementations.
//!
//! Available backends:
//! - `JsonFileStore` - snapshot and history as JSON files in a data directory
//! - `MemoryStore` - in-memory storage for tests

pub mod json;
pub mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
