//! 查询缓存的统一入口
//!
//! 持有 schema 列表缓存和表列表缓存，克隆后共享同一份状态。
//! `clear()` 同时清空两者。
//!
//! # 使用示例
//!
//! ```rust
//! use tablescope::data::QueryClient;
//! use tablescope::models::CacheConfig;
//!
//! let client = QueryClient::new(CacheConfig::default());
//! client.clear();
//! ```

use crate::data::cache::QueryCache;
use crate::models::{CacheConfig, DatabaseId, TableResult};

/// 表查询缓存的 key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableKey {
    pub db_id: DatabaseId,
    pub schema: String,
}

impl TableKey {
    pub fn new(db_id: DatabaseId, schema: impl Into<String>) -> Self {
        Self {
            db_id,
            schema: schema.into(),
        }
    }
}

/// 进程内共享的查询缓存
#[derive(Clone)]
pub struct QueryClient {
    schemas: QueryCache<DatabaseId, Vec<String>>,
    tables: QueryCache<TableKey, TableResult>,
    config: CacheConfig,
}

impl QueryClient {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            schemas: QueryCache::new("schemas", config.capacity, config.stale_time()),
            tables: QueryCache::new("tables", config.capacity, config.stale_time()),
            config,
        }
    }

    /// schema 列表缓存（按数据库）
    pub fn schemas(&self) -> &QueryCache<DatabaseId, Vec<String>> {
        &self.schemas
    }

    /// 表列表缓存（按数据库 + schema）
    pub fn tables(&self) -> &QueryCache<TableKey, TableResult> {
        &self.tables
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// 清空全部缓存
    pub fn clear(&self) {
        self.schemas.invalidate_all();
        self.tables.invalidate_all();
        tracing::debug!("查询缓存已全部清空");
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
