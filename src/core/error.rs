//! 统一错误类型定义
//!
//! 使用 `thiserror` 定义元数据查询的错误类型。`FetchError` 需要实现 `Clone`，
//! 同一 key 的并发请求共享一次网络调用，失败结果要分发给所有等待者。

use thiserror::Error;

/// 元数据查询的统一错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// 请求发送失败（连接、超时等）
    #[error("请求失败: {0}")]
    Request(String),

    /// 服务端返回非 2xx 状态码
    #[error("服务端返回错误状态 {status}: {message}")]
    Status { status: u16, message: String },

    /// 响应体解析失败
    #[error("响应解析失败: {0}")]
    Decode(String),

    /// URL 构造失败
    #[error("无效的 URL: {0}")]
    InvalidUrl(String),

    /// 配置错误
    #[error("配置错误: {reason}")]
    Config { reason: String },
}

/// 便于与现有代码集成的类型别名
pub type FetchResult<T> = std::result::Result<T, FetchError>;

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        Self::Request(err.to_string())
    }
}

impl From<url::ParseError> for FetchError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
