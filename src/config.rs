use crate::error::ConfigError;
use crate::models::{DatabaseId, PageId};
use std::str::FromStr;

/// 写入脚本使用的根页面（课程挂载点）
pub const DEFAULT_ROOT_PAGE_ID: &str = "c0c8fdab09324d578277ddac0fcb7376";

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 服务鉴权凭证（NOTION_KEY）
    pub notion_key: Option<String>,
    /// 读取脚本使用的根数据库（DATABASE_ID）
    pub database_id: Option<String>,
    /// API 基础地址
    pub api_base_url: String,
    /// Notion-Version 请求头
    pub notion_version: String,
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notion_key: None,
            database_id: None,
            api_base_url: "https://api.notion.com/v1".to_string(),
            notion_version: "2022-06-28".to_string(),
            timeout_secs: 30,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 缺失的必需项不在这里报错，由各命令通过 `require_*` 自行检查
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();
        Ok(Self {
            notion_key: non_empty_var("NOTION_KEY"),
            database_id: non_empty_var("DATABASE_ID"),
            api_base_url: std::env::var("NOTION_API_BASE_URL").unwrap_or(default.api_base_url),
            notion_version: std::env::var("NOTION_VERSION").unwrap_or(default.notion_version),
            timeout_secs: parse_var("NOTION_TIMEOUT_SECS", default.timeout_secs)?,
            verbose_logging: parse_var("VERBOSE_LOGGING", default.verbose_logging)?,
        })
    }

    /// 获取鉴权凭证，缺失即为致命错误
    pub fn require_notion_key(&self) -> Result<&str, ConfigError> {
        self.notion_key
            .as_deref()
            .ok_or_else(|| ConfigError::missing("NOTION_KEY"))
    }

    /// 获取根数据库 ID，缺失或格式错误即为致命错误
    pub fn require_database_id(&self) -> Result<DatabaseId, ConfigError> {
        let raw = self
            .database_id
            .as_deref()
            .ok_or_else(|| ConfigError::missing("DATABASE_ID"))?;
        DatabaseId::parse(raw)
    }

    /// 写入脚本的根页面
    pub fn root_page_id(&self, overridden: Option<&str>) -> Result<PageId, ConfigError> {
        PageId::parse(overridden.unwrap_or(DEFAULT_ROOT_PAGE_ID))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value,
                expected_type: std::any::type_name::<T>().to_string(),
            }),
        Err(_) => Ok(default),
    }
}
