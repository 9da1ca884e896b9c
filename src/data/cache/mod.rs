//! 缓存层实现
//!
//! - `lru`: 容量限制 + 过期时间的底层存储
//! - `query_cache`: 按 key 缓存的异步查询（请求去重、强制刷新、失效）

pub mod lru;
pub mod query_cache;

pub use lru::LruCache;
pub use query_cache::QueryCache;
