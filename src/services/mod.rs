// 服务层模块
//
// - api: 元数据 API 传输层（trait + reqwest 实现）
// - schemas: schema 列表查询
// - tables: 表选项查询（schema 过滤 + 缓存 + 强制刷新）

pub mod api;
pub mod schemas;
pub mod tables;

#[cfg(test)]
mod mock_api;

pub use api::{DatabaseApi, HttpDatabaseApi};
pub use schemas::SchemaFetcher;
pub use tables::{TableOptionsFetcher, TablesParams, TablesQuery, TablesState};
