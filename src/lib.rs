// lib.rs - 暴露查询服务给 CLI 和其他调用方使用

pub mod core; // 核心基础设施层
pub mod data; // 缓存层
pub mod models;
pub mod services;
pub mod utils;

pub use models::*;
pub use services::{
    DatabaseApi, HttpDatabaseApi, SchemaFetcher, TableOptionsFetcher, TablesParams, TablesQuery,
    TablesState,
};

pub use crate::core::{build_http_client, init_logger, update_log_level, FetchError, FetchResult};
pub use data::{QueryCache, QueryClient, TableKey};

use std::sync::Arc;

/// 按配置创建表查询服务（HTTP 传输 + 新的查询缓存）
pub fn connect(config: &AppConfig) -> FetchResult<TableOptionsFetcher> {
    let api = HttpDatabaseApi::new(&config.server)?;
    tracing::info!(
        base_url = %config.server.base_url,
        capacity = config.cache.capacity,
        stale_time_secs = config.cache.stale_time_secs,
        "元数据查询服务已创建"
    );
    Ok(TableOptionsFetcher::new(
        Arc::new(api),
        QueryClient::new(config.cache),
    ))
}
