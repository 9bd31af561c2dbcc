//! 读取侧的块模型
//!
//! 服务端返回的块在这里被解码为封闭的枚举。子块永远不会内联在父块的
//! 列表结果里，是否需要继续拉取只看 `has_children`。

use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::ids::BlockId;

/// 一段富文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub content: String,
}

impl TextRun {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// 文本类块的载荷
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextBlock {
    pub rich_text: Vec<TextRun>,
    pub color: Option<String>,
}

impl TextBlock {
    pub fn plain(runs: &[&str]) -> Self {
        Self {
            rich_text: runs.iter().map(|r| TextRun::new(*r)).collect(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// 代码块载荷
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeBlock {
    pub rich_text: Vec<TextRun>,
    pub language: Option<String>,
}

/// 块类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph(TextBlock),
    Heading1(TextBlock),
    Heading2(TextBlock),
    Heading3(TextBlock),
    BulletedListItem(TextBlock),
    NumberedListItem(TextBlock),
    Toggle(TextBlock),
    Quote(TextBlock),
    Code(CodeBlock),
    ChildPage { title: String },
    ToDo { rich_text: Vec<TextRun>, checked: bool },
    /// 服务端自己标记为 unsupported 的块
    Unsupported,
    /// 本程序未建模的类型标签
    Unknown(String),
    /// 已知类型但载荷无法解码
    Malformed { kind: String, reason: String },
}

impl BlockKind {
    /// 线上协议使用的类型标签
    pub fn tag(&self) -> &str {
        match self {
            BlockKind::Paragraph(_) => "paragraph",
            BlockKind::Heading1(_) => "heading_1",
            BlockKind::Heading2(_) => "heading_2",
            BlockKind::Heading3(_) => "heading_3",
            BlockKind::BulletedListItem(_) => "bulleted_list_item",
            BlockKind::NumberedListItem(_) => "numbered_list_item",
            BlockKind::Toggle(_) => "toggle",
            BlockKind::Quote(_) => "quote",
            BlockKind::Code(_) => "code",
            BlockKind::ChildPage { .. } => "child_page",
            BlockKind::ToDo { .. } => "to_do",
            BlockKind::Unsupported => "unsupported",
            BlockKind::Unknown(tag) => tag,
            BlockKind::Malformed { kind, .. } => kind,
        }
    }

    /// 根据类型标签解码载荷，载荷异常时降级为 `Malformed`
    fn decode(tag: &str, payload: JsonValue) -> Self {
        let decoded = match tag {
            "paragraph" => text_payload(payload).map(BlockKind::Paragraph),
            "heading_1" => text_payload(payload).map(BlockKind::Heading1),
            "heading_2" => text_payload(payload).map(BlockKind::Heading2),
            "heading_3" => text_payload(payload).map(BlockKind::Heading3),
            "bulleted_list_item" => text_payload(payload).map(BlockKind::BulletedListItem),
            "numbered_list_item" => text_payload(payload).map(BlockKind::NumberedListItem),
            "toggle" => text_payload(payload).map(BlockKind::Toggle),
            "quote" => text_payload(payload).map(BlockKind::Quote),
            "code" => serde_json::from_value::<WireCode>(payload).map(|code| {
                BlockKind::Code(CodeBlock {
                    rich_text: runs(code.rich_text),
                    language: code.language,
                })
            }),
            "child_page" => serde_json::from_value::<WireChildPage>(payload)
                .map(|page| BlockKind::ChildPage { title: page.title }),
            "to_do" => serde_json::from_value::<WireToDo>(payload).map(|todo| BlockKind::ToDo {
                rich_text: runs(todo.rich_text),
                checked: todo.checked,
            }),
            "unsupported" => return BlockKind::Unsupported,
            other => return BlockKind::Unknown(other.to_string()),
        };

        decoded.unwrap_or_else(|e| BlockKind::Malformed {
            kind: tag.to_string(),
            reason: e.to_string(),
        })
    }
}

/// 服务端返回的一个块
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub has_children: bool,
    pub kind: BlockKind,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: BlockId::new(id),
            has_children: false,
            kind,
        }
    }

    pub fn with_children(mut self, has_children: bool) -> Self {
        self.has_children = has_children;
        self
    }

    /// 从服务端 JSON 解码
    ///
    /// 只有缺少 `id` 才算失败，其余载荷问题都体现在 `BlockKind::Malformed` 上
    pub fn from_wire(value: &JsonValue) -> Result<Self, String> {
        let id = value
            .get("id")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| "块缺少 id 字段".to_string())?;
        let has_children = value
            .get("has_children")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false);
        let tag = value
            .get("type")
            .and_then(JsonValue::as_str)
            .unwrap_or("unsupported");
        let payload = value.get(tag).cloned().unwrap_or(JsonValue::Null);

        Ok(Self {
            id: BlockId::new(id),
            has_children,
            kind: BlockKind::decode(tag, payload),
        })
    }
}

// ========== 线上结构 ==========

#[derive(Deserialize)]
struct WireText {
    content: String,
}

#[derive(Deserialize)]
struct WireRichText {
    #[serde(default)]
    plain_text: Option<String>,
    #[serde(default)]
    text: Option<WireText>,
}

#[derive(Deserialize)]
struct WireTextPayload {
    rich_text: Vec<WireRichText>,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Deserialize)]
struct WireCode {
    rich_text: Vec<WireRichText>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Deserialize)]
struct WireChildPage {
    title: String,
}

#[derive(Deserialize)]
struct WireToDo {
    rich_text: Vec<WireRichText>,
    #[serde(default)]
    checked: bool,
}

fn runs(items: Vec<WireRichText>) -> Vec<TextRun> {
    items
        .into_iter()
        .map(|item| {
            let content = item
                .plain_text
                .or_else(|| item.text.map(|t| t.content))
                .unwrap_or_default();
            TextRun { content }
        })
        .collect()
}

fn text_payload(payload: JsonValue) -> Result<TextBlock, serde_json::Error> {
    let wire: WireTextPayload = serde_json::from_value(payload)?;
    Ok(TextBlock {
        rich_text: runs(wire.rich_text),
        color: wire.color,
    })
}
