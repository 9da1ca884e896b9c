//! 表选项查询
//!
//! 查询流程：
//! 1. 数据库标识或 schema 为空时不发起任何请求
//! 2. 读取数据库的 schema 列表（按数据库缓存）
//! 3. schema 不在列表中（已废弃或无效）时跳过，不请求表列表
//! 4. 请求表列表（按数据库 + schema 缓存），首次 `force=false`，
//!    `refetch` 时 `force=true`
//! 5. 将 `{count, result}` 转换为 `{options, hasMore}`
//!
//! schema 校验总是在读取表缓存之前，已从列表中消失的 schema 不会返回旧数据。

use crate::core::error::FetchResult;
use crate::data::{QueryClient, TableKey};
use crate::models::{DatabaseId, TableResult};
use crate::services::api::DatabaseApi;
use crate::services::schemas::SchemaFetcher;
use std::future::Future;
use std::sync::Arc;

/// 表查询参数
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TablesParams {
    pub db_id: DatabaseId,
    pub schema: String,
}

impl TablesParams {
    pub fn new(db_id: impl Into<DatabaseId>, schema: impl Into<String>) -> Self {
        Self {
            db_id: db_id.into(),
            schema: schema.into(),
        }
    }

    fn is_enabled(&self) -> bool {
        !self.db_id.is_empty() && !self.schema.is_empty()
    }
}

/// 一次表查询的结果状态
#[derive(Debug, Clone, PartialEq)]
pub enum TablesState {
    /// 参数不完整，未发起请求
    Disabled,
    /// schema 不在数据库的 schema 列表中，未请求表列表
    Skipped,
    /// 已获取表列表
    Resolved(TableResult),
}

impl TablesState {
    pub fn into_data(self) -> Option<TableResult> {
        match self {
            TablesState::Resolved(result) => Some(result),
            TablesState::Disabled | TablesState::Skipped => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchMode {
    Cached,
    Force,
}

/// 表选项查询服务
#[derive(Clone)]
pub struct TableOptionsFetcher {
    api: Arc<dyn DatabaseApi>,
    client: QueryClient,
    schemas: SchemaFetcher,
}

impl TableOptionsFetcher {
    pub fn new(api: Arc<dyn DatabaseApi>, client: QueryClient) -> Self {
        let schemas = SchemaFetcher::new(Arc::clone(&api), client.clone());
        Self {
            api,
            client,
            schemas,
        }
    }

    pub fn schemas(&self) -> &SchemaFetcher {
        &self.schemas
    }

    pub fn client(&self) -> &QueryClient {
        &self.client
    }

    /// 查询表选项，返回完整状态
    pub async fn resolve(&self, params: &TablesParams) -> FetchResult<TablesState> {
        self.resolve_with(params, FetchMode::Cached).await
    }

    /// 查询表选项（优先使用缓存）
    ///
    /// schema 无效或参数不完整时返回 `None`。
    pub async fn fetch(&self, params: &TablesParams) -> FetchResult<Option<TableResult>> {
        Ok(self.resolve(params).await?.into_data())
    }

    /// 以 `force=true` 重新请求表列表并替换缓存，返回完整状态
    ///
    /// schema 列表仍走缓存。
    pub async fn resolve_forced(&self, params: &TablesParams) -> FetchResult<TablesState> {
        self.resolve_with(params, FetchMode::Force).await
    }

    /// 以 `force=true` 重新请求表列表并替换缓存
    pub async fn refetch(&self, params: &TablesParams) -> FetchResult<Option<TableResult>> {
        Ok(self.resolve_forced(params).await?.into_data())
    }

    /// 绑定参数，得到可反复读取的查询句柄
    pub fn query(&self, params: TablesParams) -> TablesQuery {
        TablesQuery {
            fetcher: self.clone(),
            params,
        }
    }

    async fn resolve_with(
        &self,
        params: &TablesParams,
        mode: FetchMode,
    ) -> FetchResult<TablesState> {
        if !params.is_enabled() {
            return Ok(TablesState::Disabled);
        }

        let schemas = self.schemas.fetch(&params.db_id).await?.unwrap_or_default();
        if !schemas.iter().any(|name| name == &params.schema) {
            tracing::debug!(
                db_id = %params.db_id,
                schema = %params.schema,
                "schema 不在当前列表中，跳过表查询"
            );
            return Ok(TablesState::Skipped);
        }

        let key = TableKey::new(params.db_id.clone(), params.schema.clone());
        let tables = self.client.tables();
        let result = match mode {
            FetchMode::Cached => {
                tables
                    .get_or_fetch(key, || self.request(params, false))
                    .await?
            }
            FetchMode::Force => tables.refresh(key, self.request(params, true)).await?,
        };

        Ok(TablesState::Resolved(result))
    }

    fn request(
        &self,
        params: &TablesParams,
        force: bool,
    ) -> impl Future<Output = FetchResult<TableResult>> + Send + 'static {
        let api = Arc::clone(&self.api);
        let params = params.clone();
        async move {
            let response = api
                .fetch_tables(&params.db_id, &params.schema, force)
                .await?;
            let result = TableResult::from(response);
            tracing::debug!(
                db_id = %params.db_id,
                schema = %params.schema,
                force,
                count = result.options.len(),
                has_more = result.has_more,
                "表列表已获取"
            );
            Ok(result)
        }
    }
}

/// 绑定了参数的表查询句柄
///
/// 对应界面上一个表选择器：`data()` 读取（命中缓存时不请求），
/// `refetch()` 强制刷新。
#[derive(Clone)]
pub struct TablesQuery {
    fetcher: TableOptionsFetcher,
    params: TablesParams,
}

impl TablesQuery {
    pub fn params(&self) -> &TablesParams {
        &self.params
    }

    pub async fn data(&self) -> FetchResult<Option<TableResult>> {
        self.fetcher.fetch(&self.params).await
    }

    pub async fn state(&self) -> FetchResult<TablesState> {
        self.fetcher.resolve(&self.params).await
    }

    pub async fn refetch_state(&self) -> FetchResult<TablesState> {
        self.fetcher.resolve_forced(&self.params).await
    }

    pub async fn refetch(&self) -> FetchResult<Option<TableResult>> {
        self.fetcher.refetch(&self.params).await
    }
}
