use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::block_spec::BlockSpec;
use super::ids::PageId;
use crate::error::SpecError;

/// 数据库查询结果中的一个页面
#[derive(Debug, Clone, PartialEq)]
pub struct PageRef {
    pub id: PageId,
    pub properties: JsonValue,
}

impl PageRef {
    /// 取第一个 title 类型属性的纯文本
    pub fn title(&self) -> Option<String> {
        let properties = self.properties.as_object()?;
        properties.values().find_map(|property| {
            if property.get("type").and_then(JsonValue::as_str) != Some("title") {
                return None;
            }
            let runs = property.get("title")?.as_array()?;
            let text: String = runs
                .iter()
                .filter_map(|run| {
                    run.get("plain_text")
                        .or_else(|| run.get("text").and_then(|t| t.get("content")))
                        .and_then(JsonValue::as_str)
                })
                .collect();
            Some(text)
        })
    }
}

/// 待创建的页面及其内容、子页面
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpec {
    pub title: String,
    #[serde(default)]
    pub blocks: Vec<BlockSpec>,
    #[serde(default)]
    pub pages: Vec<PageSpec>,
}

impl PageSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
            pages: Vec::new(),
        }
    }

    pub fn with_blocks(mut self, blocks: Vec<BlockSpec>) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn with_pages(mut self, pages: Vec<PageSpec>) -> Self {
        self.pages = pages;
        self
    }

    /// 包含自身在内的页面数量
    pub fn page_count(&self) -> usize {
        1 + self.pages.iter().map(PageSpec::page_count).sum::<usize>()
    }

    /// 递归检查标题和块嵌套
    pub fn validate(&self, location: &str) -> Result<(), SpecError> {
        if self.title.trim().is_empty() {
            return Err(SpecError::EmptyTitle {
                location: location.to_string(),
            });
        }
        let here = if location.is_empty() {
            self.title.clone()
        } else {
            format!("{} / {}", location, self.title)
        };
        for (i, block) in self.blocks.iter().enumerate() {
            block.validate(&format!("{} > {}#{}", here, block.kind.tag(), i + 1))?;
        }
        for page in &self.pages {
            page.validate(&here)?;
        }
        Ok(())
    }
}

/// 挂在同一个根页面下的一组页面
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Hierarchy {
    #[serde(default)]
    pub pages: Vec<PageSpec>,
}

impl Hierarchy {
    pub fn page_count(&self) -> usize {
        self.pages.iter().map(PageSpec::page_count).sum()
    }

    pub fn validate(&self) -> Result<(), SpecError> {
        self.pages.iter().try_for_each(|page| page.validate(""))
    }
}
