// Cache module for in-process response caching.
// Keeps GitHub lookups for a short TTL so repeated hovers don't hit the network.

pub mod store;

pub use store::{CacheEntry, CacheStats, DEFAULT_MAX_ENTRIES, DEFAULT_TTL, TtlCache};
