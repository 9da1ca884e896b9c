//! 核心基础设施：错误类型、日志、HTTP 客户端

pub mod error;
pub mod http;
pub mod logger;

pub use error::{FetchError, FetchResult};
pub use http::build_http_client;
pub use logger::{init_logger, update_log_level};
