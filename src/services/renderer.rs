//! 块渲染器
//!
//! 纯函数：一个块 → 一行可读文本，或者不输出。
//! 永远不会失败，无法渲染的块一律返回 `None`。

use crate::models::{Block, BlockKind, TextBlock, TextRun};

/// 缩进单位
const INDENT: &str = "  ";

/// 渲染单个块
pub fn render(block: &Block) -> Option<String> {
    match &block.kind {
        BlockKind::Paragraph(text) => labelled("Paragraph", &text.rich_text),
        BlockKind::Quote(text) => labelled("Quote", &text.rich_text),
        BlockKind::Heading1(text) | BlockKind::Heading2(text) | BlockKind::Heading3(text) => text
            .rich_text
            .first()
            .filter(|run| !run.content.trim().is_empty())
            .map(|run| run.content.clone()),
        BlockKind::BulletedListItem(text) => colored("Bulleted List Item", text),
        BlockKind::NumberedListItem(text) => colored("Numbered List Item", text),
        BlockKind::Toggle(text) => colored("Toggle", text),
        BlockKind::Code(code) => labelled("Code", &code.rich_text),
        BlockKind::ChildPage { title } if !title.trim().is_empty() => {
            Some(format!("Child Page Title: {}", title))
        }
        BlockKind::ChildPage { .. } => None,
        BlockKind::ToDo { .. } => None,
        BlockKind::Unsupported => None,
        BlockKind::Unknown(_) => None,
        BlockKind::Malformed { .. } => None,
    }
}

/// 按深度缩进一行输出
pub fn format_line(depth: usize, line: &str) -> String {
    format!("{}{}", INDENT.repeat(depth), line)
}

/// 以单个空格连接富文本；没有任何可见文本时返回 `None`
pub fn join_runs(runs: &[TextRun]) -> Option<String> {
    if runs.iter().all(|run| run.content.trim().is_empty()) {
        return None;
    }
    Some(
        runs.iter()
            .map(|run| run.content.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    )
}

fn labelled(label: &str, runs: &[TextRun]) -> Option<String> {
    join_runs(runs).map(|text| format!("{}: {}", label, text))
}

fn colored(label: &str, text: &TextBlock) -> Option<String> {
    let content = join_runs(&text.rich_text)?;
    match text.color.as_deref() {
        Some(color) if color != "default" => {
            Some(format!("{} (Color: {}): {}", label, color, content))
        }
        _ => Some(format!("{}: {}", label, content)),
    }
}
