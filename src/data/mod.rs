//! 查询数据管理模块
//!
//! # 模块组织
//!
//! - `cache`: 缓存层实现（LRU 存储 + 异步查询缓存）
//! - `query_client`: 进程内共享的 schema / 表查询缓存

pub mod cache;
pub mod query_client;

pub use cache::{LruCache, QueryCache};
pub use query_client::{QueryClient, TableKey};
