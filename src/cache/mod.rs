//! Whole-page response cache for the index listing.

mod config;
mod lock;
mod middleware;
mod store;

pub use config::CacheConfig;
pub use middleware::{CacheState, page_cache_layer};
pub use store::{CachedPage, PageCache};
