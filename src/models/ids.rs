//! 远程服务分配的标识符
//!
//! ID 由服务端创建，本程序只引用、不拥有。页面本身也是一个块容器，
//! 所以 `PageId` 可以无损转换为 `BlockId`。

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::error::ConfigError;

static DASHED_UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("static regex")
});

static TRAILING_HEX_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9a-fA-F]{32})$").expect("static regex"));

/// 把用户输入的 ID（带横线 UUID / 32 位十六进制 / 页面 URL）规范化为带横线的小写 UUID
pub fn normalize_id(input: &str) -> Option<String> {
    let trimmed = input.trim();
    let without_query = trimmed
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');

    if DASHED_UUID.is_match(without_query) {
        return Some(without_query.to_ascii_lowercase());
    }

    let hex = TRAILING_HEX_ID.captures(without_query)?.get(1)?.as_str();
    // URL 中 ID 之前必须是分隔符，避免截取到更长的十六进制串
    let prefix = &without_query[..without_query.len() - hex.len()];
    if prefix
        .chars()
        .last()
        .is_some_and(|c| c.is_ascii_hexdigit())
    {
        return None;
    }

    let hex = hex.to_ascii_lowercase();
    Some(format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    ))
}

macro_rules! notion_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// 直接包装服务端返回的 ID，不做校验
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// 解析用户输入的 ID
            pub fn parse(input: &str) -> Result<Self, ConfigError> {
                normalize_id(input)
                    .map(Self)
                    .ok_or_else(|| ConfigError::InvalidId {
                        value: input.to_string(),
                    })
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

notion_id!(
    /// 块 ID
    BlockId
);
notion_id!(
    /// 页面 ID
    PageId
);
notion_id!(
    /// 数据库（集合）ID
    DatabaseId
);

impl PageId {
    /// 页面作为块容器时的 ID
    pub fn as_block_id(&self) -> BlockId {
        BlockId(self.0.clone())
    }
}

impl From<PageId> for BlockId {
    fn from(id: PageId) -> Self {
        BlockId(id.0)
    }
}
