// 数据库元数据模型：schema 列表、表选项以及 API 响应结构

use serde::{Deserialize, Serialize};
use std::fmt;

/// 数据库标识
///
/// 服务端使用整数 id，也兼容字符串形式的标识。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatabaseId(String);

impl DatabaseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 空标识表示未选择数据库，不发起任何查询
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DatabaseId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DatabaseId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for DatabaseId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

/// Schema 下拉选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaOption {
    pub value: String,
    pub label: String,
    pub title: String,
}

impl SchemaOption {
    pub fn new(name: &str) -> Self {
        Self {
            value: name.to_string(),
            label: name.to_string(),
            title: name.to_string(),
        }
    }
}

/// 表选项，由服务端生成，原样透传
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableOption {
    pub id: serde_json::Value,
    /// 带 schema 前缀的表名
    pub name: String,
    /// 展示名称
    pub label: String,
    /// 服务端附带的其他字段（type、extra 等）
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// 表查询结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableResult {
    pub options: Vec<TableOption>,
    /// 服务端总数大于返回条数时为 true
    pub has_more: bool,
}

impl From<TableListResponse> for TableResult {
    fn from(response: TableListResponse) -> Self {
        let has_more = response.count > response.result.len() as u64;
        Self {
            options: response.result,
            has_more,
        }
    }
}

/// `GET /api/v1/database/{id}/schemas/` 响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaListResponse {
    pub result: Vec<String>,
}

/// `GET /api/v1/database/{id}/tables/` 响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableListResponse {
    pub count: u64,
    pub result: Vec<TableOption>,
}
