//! Cache backend implementations.
//!
//! Implements `slackmap_core::cache::Cache` for callers of external APIs. The cache
//! is an ordinary value owned by the caller; nothing is shared process-wide.

pub mod memory;

pub use memory::MemoryCache;
