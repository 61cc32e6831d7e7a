//! # Adapters
//!
//! - `MemoryDriver` - process-local map; clones share state
//! - `FileDriver` - one file per key in a directory (requires "file-driver")
//! - `JsonSerializer` - `serde_json` encoding

/// In-memory driver
pub mod memory;
/// JSON serializer
pub mod json;
/// Directory-backed driver
#[cfg(feature = "file-driver")]
pub mod file;

pub use json::JsonSerializer;
pub use memory::MemoryDriver;

#[cfg(feature = "file-driver")]
pub use file::FileDriver;
