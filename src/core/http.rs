use crate::core::error::{FetchError, FetchResult};
use crate::models::ServerConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;

const USER_AGENT: &str = concat!("tablescope/", env!("CARGO_PKG_VERSION"));

/// 构建访问元数据 API 的 HTTP 客户端
///
/// # 参数
/// - `config`: 服务端配置（超时、访问令牌）
///
/// # 返回
/// - 配置好的 reqwest::Client
pub fn build_http_client(config: &ServerConfig) -> FetchResult<Client> {
    let mut builder = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.timeout())
        .redirect(reqwest::redirect::Policy::limited(10))
        .default_headers(default_headers(config)?);

    match config.proxy_url.as_deref().filter(|url| !url.is_empty()) {
        Some(proxy_url) => {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| FetchError::Config {
                reason: format!("代理 URL 无效: {e}"),
            })?;
            builder = builder.proxy(proxy);
        }
        None if !config.use_system_proxy => builder = builder.no_proxy(),
        None => {}
    }

    builder.build().map_err(|e| FetchError::Config {
        reason: format!("构建 HTTP 客户端失败: {e}"),
    })
}

/// 默认请求头：JSON + 可选的 Bearer 认证
fn default_headers(config: &ServerConfig) -> FetchResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    if let Some(token) = config.access_token.as_deref().filter(|t| !t.is_empty()) {
        let mut value =
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| FetchError::Config {
                reason: format!("访问令牌包含非法字符: {e}"),
            })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}
