use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 远程文档服务调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 页面层级描述错误
    #[error("层级描述错误: {0}")]
    Spec(#[from] SpecError),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// API 返回错误响应
    #[error("API返回错误响应 ({endpoint}): status={status}, code={code:?}, message={message:?}")]
    BadResponse {
        endpoint: String,
        status: u16,
        code: Option<String>,
        message: Option<String>,
    },
    /// 请求频率限制
    #[error("API请求频率限制 ({endpoint}), 建议等待: {retry_after:?}秒")]
    RateLimited {
        endpoint: String,
        retry_after: Option<u64>,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// 响应结构不符合预期
    #[error("响应结构异常 ({endpoint}): {reason}")]
    MalformedResponse { endpoint: String, reason: String },
    /// 模拟服务中注入的失败
    #[error("模拟失败 ({operation} {id})")]
    Simulated { operation: String, id: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 无法识别的页面/数据库 ID
    #[error("无法识别的 ID: '{value}'")]
    InvalidId { value: String },
}

/// 页面层级描述错误
#[derive(Debug, Error)]
pub enum SpecError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 页面标题为空
    #[error("页面标题不能为空 (位置: {location})")]
    EmptyTitle { location: String },
    /// 该类型的块不能携带子块
    #[error("{kind} 类型的块不能包含子块 (位置: {location})")]
    ChildrenNotAllowed { kind: String, location: String },
}

// ========== 便捷构造函数 ==========

impl ApiError {
    /// 创建请求失败错误
    pub fn request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// 创建响应结构异常错误
    pub fn malformed(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        ApiError::MalformedResponse {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// 创建模拟失败
    pub fn simulated(operation: impl Into<String>, id: impl Into<String>) -> Self {
        ApiError::Simulated {
            operation: operation.into(),
            id: id.into(),
        }
    }
}

impl ConfigError {
    /// 创建环境变量缺失错误
    pub fn missing(var_name: impl Into<String>) -> Self {
        ConfigError::EnvVarNotFound {
            var_name: var_name.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

/// API 调用结果类型
pub type ApiResult<T> = Result<T, ApiError>;
