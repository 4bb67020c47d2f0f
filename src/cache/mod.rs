//! Path-keyed cache of pipeline stages.

mod key;
mod store;

pub use key::{CacheCategory, CacheKey, CachePaths, Stage};
pub use store::{DiskCache, MemCache, TableCache};
