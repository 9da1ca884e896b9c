// 测试用的 DatabaseApi 实现：记录每次调用，返回预设响应

use crate::core::error::{FetchError, FetchResult};
use crate::models::{DatabaseId, SchemaListResponse, TableListResponse};
use crate::services::api::DatabaseApi;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;
use std::time::Duration;

/// 一次 API 调用记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Schemas { db_id: String, force: bool },
    Tables { db_id: String, schema: String, force: bool },
}

pub struct MockDatabaseApi {
    schemas: Vec<String>,
    tables: Mutex<TableListResponse>,
    fail_tables: Mutex<Option<FetchError>>,
    delay: Duration,
    calls: Mutex<Vec<ApiCall>>,
}

impl MockDatabaseApi {
    pub fn new(schemas: &[&str], tables: TableListResponse) -> Self {
        Self {
            schemas: schemas.iter().map(|s| s.to_string()).collect(),
            tables: Mutex::new(tables),
            fail_tables: Mutex::new(None),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 每次调用前等待，用于模拟进行中的请求
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_tables(&self, tables: TableListResponse) {
        *self.tables.lock().unwrap() = tables;
    }

    pub fn fail_tables_with(&self, error: Option<FetchError>) {
        *self.fail_tables.lock().unwrap() = error;
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn schema_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ApiCall::Schemas { .. }))
            .count()
    }

    pub fn table_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ApiCall::Tables { .. }))
            .count()
    }

    /// 指定 force 参数的表请求次数
    pub fn table_calls_with(&self, schema: &str, force: bool) -> usize {
        self.calls()
            .iter()
            .filter(|c| {
                matches!(c, ApiCall::Tables { schema: s, force: f, .. } if s == schema && *f == force)
            })
            .count()
    }
}

#[async_trait]
impl DatabaseApi for MockDatabaseApi {
    async fn fetch_schemas(
        &self,
        db_id: &DatabaseId,
        force: bool,
    ) -> FetchResult<SchemaListResponse> {
        self.calls.lock().unwrap().push(ApiCall::Schemas {
            db_id: db_id.to_string(),
            force,
        });
        tokio::time::sleep(self.delay).await;
        Ok(SchemaListResponse {
            result: self.schemas.clone(),
        })
    }

    async fn fetch_tables(
        &self,
        db_id: &DatabaseId,
        schema: &str,
        force: bool,
    ) -> FetchResult<TableListResponse> {
        self.calls.lock().unwrap().push(ApiCall::Tables {
            db_id: db_id.to_string(),
            schema: schema.to_string(),
            force,
        });
        tokio::time::sleep(self.delay).await;
        if let Some(error) = self.fail_tables.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.tables.lock().unwrap().clone())
    }
}

/// 两条表记录，总数为 `count`
pub fn fake_tables(count: u64) -> TableListResponse {
    serde_json::from_value(json!({
        "count": count,
        "result": [
            { "id": 1, "name": "fake api result1", "label": "fake api label1" },
            { "id": 2, "name": "fake api result2", "label": "fake api label2" }
        ]
    }))
    .unwrap()
}
