//! HTTP 执行器 - 基础设施层
//!
//! 持有唯一的 HTTP 客户端和鉴权信息，只暴露"发送 JSON 请求"的能力

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{ApiError, ApiResult, AppError, ConfigError};

/// HTTP 执行器
///
/// 职责：
/// - 持有唯一的 reqwest Client（连接池、默认请求头、超时）
/// - 把非 2xx 响应转换为 `ApiError`
/// - 不认识 Block / Page
/// - 不做重试
pub struct NotionHttp {
    client: Client,
    base_url: String,
}

impl NotionHttp {
    /// 创建新的 HTTP 执行器
    ///
    /// 缺少 NOTION_KEY 时直接失败
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let token = config.require_notion_key()?;

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: "NOTION_KEY".to_string(),
                value: "<redacted>".to_string(),
                expected_type: "HTTP header value".to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, auth);

        let version = HeaderValue::from_str(&config.notion_version).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: "NOTION_VERSION".to_string(),
                value: config.notion_version.clone(),
                expected_type: "HTTP header value".to_string(),
            }
        })?;
        headers.insert("Notion-Version", version);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::request_failed("client", e))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn get_json(&self, path: &str) -> ApiResult<JsonValue> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post_json(&self, path: &str, body: &JsonValue) -> ApiResult<JsonValue> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn patch_json(&self, path: &str, body: &JsonValue) -> ApiResult<JsonValue> {
        self.send(Method::PATCH, path, Some(body)).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&JsonValue>,
    ) -> ApiResult<JsonValue> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::request_failed(path, e))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::request_failed(path, e))?;

        if !status.is_success() {
            return Err(error_from_response(path, status, retry_after, &text));
        }

        serde_json::from_str(&text).map_err(|source| ApiError::JsonParseFailed {
            endpoint: path.to_string(),
            source,
        })
    }
}

/// 把失败响应转换为错误
///
/// 服务端的错误体形如 `{"object":"error","status":400,"code":"...","message":"..."}`
pub(crate) fn error_from_response(
    endpoint: &str,
    status: StatusCode,
    retry_after: Option<u64>,
    body: &str,
) -> ApiError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return ApiError::RateLimited {
            endpoint: endpoint.to_string(),
            retry_after,
        };
    }

    let parsed: Option<JsonValue> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(JsonValue::as_str)
            .map(str::to_string)
    };

    ApiError::BadResponse {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        code: field("code"),
        message: field("message"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_key() {
        let config = Config::default();
        assert!(matches!(
            NotionHttp::new(&config),
            Err(AppError::Config(ConfigError::EnvVarNotFound { .. }))
        ));
    }

    #[test]
    fn test_new_trims_base_url() {
        let config = Config {
            notion_key: Some("secret_test".to_string()),
            api_base_url: "http://localhost:9999/v1/".to_string(),
            ..Config::default()
        };
        let http = NotionHttp::new(&config).unwrap();
        assert_eq!(http.base_url, "http://localhost:9999/v1");
    }

    #[test]
    fn test_error_body_is_parsed() {
        let body = r#"{"object":"error","status":404,"code":"object_not_found","message":"Could not find block"}"#;
        match error_from_response("blocks/x/children", StatusCode::NOT_FOUND, None, body) {
            ApiError::BadResponse {
                status,
                code,
                message,
                ..
            } => {
                assert_eq!(status, 404);
                assert_eq!(code.as_deref(), Some("object_not_found"));
                assert_eq!(message.as_deref(), Some("Could not find block"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rate_limit_is_distinguished() {
        let err = error_from_response("pages", StatusCode::TOO_MANY_REQUESTS, Some(3), "");
        assert!(matches!(
            err,
            ApiError::RateLimited {
                retry_after: Some(3),
                ..
            }
        ));

        // 非 JSON 错误体也不会丢失状态码
        let err = error_from_response("pages", StatusCode::BAD_GATEWAY, None, "<html>");
        assert!(matches!(err, ApiError::BadResponse { status: 502, code: None, .. }));
    }
}
