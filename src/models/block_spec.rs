//! 写入侧的块描述
//!
//! 没有 ID，提交给服务端创建。嵌套子块随父块在同一次追加请求中提交。

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

use crate::error::SpecError;

/// 代码块未指定语言时使用的值
pub const DEFAULT_CODE_LANGUAGE: &str = "plain text";

/// 可写入的块类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecKind {
    #[serde(rename = "paragraph")]
    Paragraph,
    #[serde(rename = "heading_1")]
    Heading1,
    #[serde(rename = "heading_2")]
    Heading2,
    #[serde(rename = "heading_3")]
    Heading3,
    #[serde(rename = "bulleted_list_item")]
    BulletedListItem,
    #[serde(rename = "numbered_list_item")]
    NumberedListItem,
    #[serde(rename = "toggle")]
    Toggle,
    #[serde(rename = "quote")]
    Quote,
    #[serde(rename = "code")]
    Code,
    #[serde(rename = "to_do")]
    ToDo,
}

impl SpecKind {
    pub fn tag(self) -> &'static str {
        match self {
            SpecKind::Paragraph => "paragraph",
            SpecKind::Heading1 => "heading_1",
            SpecKind::Heading2 => "heading_2",
            SpecKind::Heading3 => "heading_3",
            SpecKind::BulletedListItem => "bulleted_list_item",
            SpecKind::NumberedListItem => "numbered_list_item",
            SpecKind::Toggle => "toggle",
            SpecKind::Quote => "quote",
            SpecKind::Code => "code",
            SpecKind::ToDo => "to_do",
        }
    }

    /// 服务端是否接受该类型携带嵌套子块
    pub fn accepts_children(self) -> bool {
        !matches!(
            self,
            SpecKind::Heading1 | SpecKind::Heading2 | SpecKind::Heading3 | SpecKind::Code
        )
    }
}

/// 待创建的块
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSpec {
    pub kind: SpecKind,
    /// 每个元素对应一段富文本
    #[serde(default)]
    pub text: Vec<String>,
    /// 仅对代码块有效
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// 仅对待办块有效
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub checked: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BlockSpec>,
}

impl BlockSpec {
    pub fn new(kind: SpecKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: vec![text.into()],
            language: None,
            checked: false,
            children: Vec::new(),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(SpecKind::Paragraph, text)
    }

    pub fn code(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
            ..Self::new(SpecKind::Code, text)
        }
    }

    pub fn with_children(mut self, children: Vec<BlockSpec>) -> Self {
        self.children = children;
        self
    }

    /// 包含自身在内的块数量
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(BlockSpec::count).sum::<usize>()
    }

    /// 检查嵌套关系是否被服务端接受
    pub fn validate(&self, location: &str) -> Result<(), SpecError> {
        if !self.children.is_empty() && !self.kind.accepts_children() {
            return Err(SpecError::ChildrenNotAllowed {
                kind: self.kind.tag().to_string(),
                location: location.to_string(),
            });
        }
        for (i, child) in self.children.iter().enumerate() {
            child.validate(&format!("{} > {}#{}", location, child.kind.tag(), i + 1))?;
        }
        Ok(())
    }

    /// 转换为服务端的块 JSON，子块内联在 `children` 中
    pub fn to_wire(&self) -> JsonValue {
        let tag = self.kind.tag();
        let rich_text: Vec<JsonValue> = self
            .text
            .iter()
            .map(|content| json!({ "type": "text", "text": { "content": content } }))
            .collect();

        let mut payload = Map::new();
        payload.insert("rich_text".to_string(), JsonValue::Array(rich_text));

        match self.kind {
            SpecKind::Code => {
                let language = self.language.as_deref().unwrap_or(DEFAULT_CODE_LANGUAGE);
                payload.insert("language".to_string(), json!(language));
            }
            SpecKind::ToDo => {
                payload.insert("checked".to_string(), json!(self.checked));
            }
            _ => {}
        }

        if !self.children.is_empty() {
            let children: Vec<JsonValue> = self.children.iter().map(BlockSpec::to_wire).collect();
            payload.insert("children".to_string(), JsonValue::Array(children));
        }

        let mut block = Map::new();
        block.insert("object".to_string(), json!("block"));
        block.insert("type".to_string(), json!(tag));
        block.insert(tag.to_string(), JsonValue::Object(payload));
        JsonValue::Object(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_children_are_inlined() {
        let spec = BlockSpec::new(SpecKind::NumberedListItem, "Step 1").with_children(vec![
            BlockSpec::new(SpecKind::Toggle, "Hint")
                .with_children(vec![BlockSpec::paragraph("Detail")]),
        ]);

        let wire = spec.to_wire();
        assert_eq!(wire["type"], "numbered_list_item");
        assert_eq!(
            wire["numbered_list_item"]["rich_text"][0]["text"]["content"],
            "Step 1"
        );
        let toggle = &wire["numbered_list_item"]["children"][0];
        assert_eq!(toggle["type"], "toggle");
        assert_eq!(
            toggle["toggle"]["children"][0]["paragraph"]["rich_text"][0]["text"]["content"],
            "Detail"
        );
        assert_eq!(spec.count(), 3);
    }

    #[test]
    fn test_code_language_defaults() {
        let mut spec = BlockSpec::new(SpecKind::Code, "x");
        assert_eq!(spec.to_wire()["code"]["language"], DEFAULT_CODE_LANGUAGE);

        spec.language = Some("javascript".to_string());
        assert_eq!(spec.to_wire()["code"]["language"], "javascript");
        assert!(spec.to_wire()["code"].get("children").is_none());
    }

    #[test]
    fn test_validate_rejects_children_under_heading() {
        let spec = BlockSpec::new(SpecKind::Heading2, "Example")
            .with_children(vec![BlockSpec::paragraph("nope")]);
        assert!(matches!(
            spec.validate("Content"),
            Err(SpecError::ChildrenNotAllowed { .. })
        ));
    }

    #[test]
    fn test_deserialize_from_toml() {
        let spec: BlockSpec = toml::from_str(
            r#"
            kind = "to_do"
            text = ["Write tests"]
            checked = true
            "#,
        )
        .unwrap();
        assert_eq!(spec.kind, SpecKind::ToDo);
        assert!(spec.checked);
        assert_eq!(spec.to_wire()["to_do"]["checked"], true);
    }
}
