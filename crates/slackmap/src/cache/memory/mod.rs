//! In-memory cache backend with a fixed TTL and LRU eviction.

mod cache;

pub use cache::MemoryCache;
