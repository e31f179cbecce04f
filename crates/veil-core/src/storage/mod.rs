//! Storage backends for encrypted containers.
//!
//! This module defines the `RandomAccess` trait and its implementations.
//! Currently supports:
//! - `MemoryStorage`: a shared in-memory buffer
//! - `FileStorage`: a single file on disk

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use traits::{RandomAccess, StorageStat};
