// 元数据 API 传输层 - schema 列表和表列表两个端点

use crate::core::error::{FetchError, FetchResult};
use crate::core::http::build_http_client;
use crate::models::{DatabaseId, SchemaListResponse, ServerConfig, TableListResponse};
use crate::utils::rison;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

/// 元数据 API trait
///
/// 缓存与 schema 过滤逻辑只依赖这个 trait，测试中可以替换为计数的 mock。
#[async_trait]
pub trait DatabaseApi: Send + Sync {
    /// `GET /api/v1/database/{id}/schemas/`
    ///
    /// # 参数
    /// - `db_id`: 数据库标识
    /// - `force`: 要求服务端跳过自身缓存
    async fn fetch_schemas(
        &self,
        db_id: &DatabaseId,
        force: bool,
    ) -> FetchResult<SchemaListResponse>;

    /// `GET /api/v1/database/{id}/tables/`
    ///
    /// # 参数
    /// - `db_id`: 数据库标识
    /// - `schema`: schema 名称
    /// - `force`: 要求服务端跳过自身缓存
    async fn fetch_tables(
        &self,
        db_id: &DatabaseId,
        schema: &str,
        force: bool,
    ) -> FetchResult<TableListResponse>;
}

/// 构造 schema 列表请求地址
pub fn schemas_url(base_url: &str, db_id: &DatabaseId, force: bool) -> FetchResult<Url> {
    let q = rison::encode(&json!({ "force": force }));
    endpoint_url(base_url, db_id, "schemas", &q)
}

/// 构造表列表请求地址
///
/// schema 名称先做 URI 组件编码再放入 rison 参数。
pub fn tables_url(
    base_url: &str,
    db_id: &DatabaseId,
    schema: &str,
    force: bool,
) -> FetchResult<Url> {
    let q = rison::encode(&json!({
        "force": force,
        "schema_name": urlencoding::encode(schema),
    }));
    endpoint_url(base_url, db_id, "tables", &q)
}

fn endpoint_url(base_url: &str, db_id: &DatabaseId, resource: &str, q: &str) -> FetchResult<Url> {
    let url = format!(
        "{}/api/v1/database/{}/{}/?q={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(db_id.as_str()),
        resource,
        q
    );
    Ok(Url::parse(&url)?)
}

/// 服务端错误响应体
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<Value>,
}

/// 基于 reqwest 的 API 实现
#[derive(Clone)]
pub struct HttpDatabaseApi {
    client: Client,
    base_url: String,
}

impl HttpDatabaseApi {
    pub fn new(config: &ServerConfig) -> FetchResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(FetchError::Config {
                reason: "base_url 未设置".to_string(),
            });
        }
        // 提前校验地址，避免每次请求才发现配置错误
        Url::parse(&config.base_url)?;

        Ok(Self {
            client: build_http_client(config)?,
            base_url: config.base_url.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> FetchResult<T> {
        tracing::debug!(url = %url, "请求元数据 API");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .map(|m| match m {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl DatabaseApi for HttpDatabaseApi {
    async fn fetch_schemas(
        &self,
        db_id: &DatabaseId,
        force: bool,
    ) -> FetchResult<SchemaListResponse> {
        self.get_json(schemas_url(&self.base_url, db_id, force)?)
            .await
    }

    async fn fetch_tables(
        &self,
        db_id: &DatabaseId,
        schema: &str,
        force: bool,
    ) -> FetchResult<TableListResponse> {
        self.get_json(tables_url(&self.base_url, db_id, schema, force)?)
            .await
    }
}
