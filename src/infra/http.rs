//! # API Client / API 客户端
//!
//! Issues single HTTP requests against the service under test. Every request
//! carries a timeout and is attempted exactly once; repeated failures are the
//! signal this tool exists to surface.
//!
//! 对被测服务发起单次 HTTP 请求。每个请求都带有超时，且只尝试一次；
//! 重复出现的失败正是此工具要暴露的信号。

use reqwest::{Client, Method};
use std::future::Future;
use std::time::Duration;

use crate::core::config::ApiConfig;
use crate::core::error::ProbeError;
use crate::core::models::ApiResponse;

/// Request interface to the HTTP service under test.
/// 被测 HTTP 服务的请求接口。
pub trait ApiClient {
    /// Sends one request. `path` is resolved against the configured base URL
    /// unless it is already absolute. With `auth`, the configured bearer token
    /// is attached; `timeout` overrides the configured default.
    ///
    /// 发送一次请求。除非 `path` 已是绝对地址，否则相对于配置的基础 URL 解析。
    /// 设置 `auth` 时附加配置的 Bearer 令牌；`timeout` 会覆盖默认超时。
    fn request(
        &self,
        method: &str,
        path: &str,
        auth: bool,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<ApiResponse, ProbeError>>;
}

/// `reqwest`-backed API client. / 基于 `reqwest` 的 API 客户端。
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    config: ApiConfig,
}

impl HttpApi {
    pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("share-consistency/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    /// Joins `path` onto the base URL.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.config.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }
}

impl ApiClient for HttpApi {
    async fn request(
        &self,
        method: &str,
        path: &str,
        auth: bool,
        timeout: Option<Duration>,
    ) -> Result<ApiResponse, ProbeError> {
        let method = Method::from_bytes(method.to_uppercase().as_bytes())
            .map_err(|_| ProbeError::Structural(format!("unsupported HTTP method `{}`", method)))?;
        let url = self.url_for(path);
        let timeout = timeout.unwrap_or_else(|| self.config.timeout());

        let mut builder = self.client.request(method.clone(), &url).timeout(timeout);
        if auth {
            let token = self.config.token.as_deref().ok_or_else(|| {
                ProbeError::Structural("api.token is not configured".to_string())
            })?;
            builder = builder.bearer_auth(token);
        }

        tracing::debug!(%method, %url, auth, "sending request");
        let response = builder.send().await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.text().await?;

        tracing::debug!(status, bytes = body.len(), "response received");
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
