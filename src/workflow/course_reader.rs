//! 课程大纲读取 - 流程层
//!
//! 按子页面标题识别课程结构（Content / Pre-filled Code / Instructions ...），
//! 对不同的栏目用不同的方式输出。和遍历器一样，某个子树失败只记录下来，
//! 不影响其余栏目。

use futures::StreamExt;
use tracing::{debug, warn};

use crate::models::{Block, BlockId, BlockKind, PageRef};
use crate::services::{format_line, join_runs, DocumentService};
use crate::workflow::tree_walker::{walk, WalkEvent, WalkFailure};

/// 课程栏目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Content,
    PrefilledCode,
    Instructions,
    Instruction,
    ErrorMessages,
    ErrorMessage,
    CorrectAnswers,
    CorrectAnswer,
    Other,
}

impl Section {
    /// 根据页面标题识别栏目
    pub fn classify(title: &str) -> Self {
        let title = title.trim();
        match title {
            "Content" => Section::Content,
            "Pre-filled Code" => Section::PrefilledCode,
            "Instructions" => Section::Instructions,
            "Error Messages" => Section::ErrorMessages,
            "Correct Answers" => Section::CorrectAnswers,
            t if t.starts_with("Instruction") => Section::Instruction,
            t if t.starts_with("Error Message") => Section::ErrorMessage,
            t if t.starts_with("Correct Answer") || t.starts_with("Answer") => {
                Section::CorrectAnswer
            }
            _ => Section::Other,
        }
    }

    /// 只包含子页面的栏目
    fn is_container(self) -> bool {
        matches!(
            self,
            Section::Instructions
                | Section::Instruction
                | Section::ErrorMessages
                | Section::CorrectAnswers
        )
    }
}

/// 一个集合页面的大纲
#[derive(Debug, Default)]
pub struct CourseReport {
    pub lines: Vec<String>,
    pub failures: Vec<WalkFailure>,
}

/// 待处理的子页面
struct Work {
    id: BlockId,
    title: String,
    depth: usize,
}

/// 课程大纲读取器
pub struct CourseReader<'a, S> {
    service: &'a S,
}

impl<'a, S: DocumentService> CourseReader<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self { service }
    }

    /// 读取数据库中的一个课程页面
    pub async fn read_page(&self, page: &PageRef) -> CourseReport {
        let mut report = CourseReport::default();
        report.lines.push(format!("Page ID: {}", page.id));
        if let Some(title) = page.title() {
            report.lines.push(format!("Title: {}", title));
        }

        let mut stack = Vec::new();
        self.push_subpages(&page.id.as_block_id(), 0, &mut stack, &mut report)
            .await;

        while let Some(work) = stack.pop() {
            report
                .lines
                .push(format_line(work.depth, &format!("Subpage Title: {}", work.title)));

            let section = Section::classify(&work.title);
            debug!("栏目 '{}' 识别为 {:?}", work.title, section);
            let depth = work.depth + 1;

            match section {
                Section::Content => self.read_content(&work.id, depth, &mut report).await,
                Section::PrefilledCode => {
                    self.read_labelled(&work.id, depth, "Code Block", section, &mut report)
                        .await
                }
                Section::ErrorMessage => {
                    self.read_labelled(&work.id, depth, "Error Message", section, &mut report)
                        .await
                }
                Section::CorrectAnswer => {
                    self.read_labelled(&work.id, depth, "Answer", section, &mut report)
                        .await
                }
                s if s.is_container() => {
                    self.push_subpages(&work.id, depth, &mut stack, &mut report)
                        .await
                }
                _ => debug!("跳过未识别的栏目: {}", work.title),
            }
        }

        report
    }

    /// 列出子页面并逆序压栈，保持原有顺序
    async fn push_subpages(
        &self,
        container: &BlockId,
        depth: usize,
        stack: &mut Vec<Work>,
        report: &mut CourseReport,
    ) {
        let Some(children) = self.list(container, depth, report).await else {
            return;
        };
        let pages: Vec<Work> = children
            .into_iter()
            .filter_map(|block| match block.kind {
                BlockKind::ChildPage { title } => Some(Work {
                    id: block.id,
                    title,
                    depth,
                }),
                _ => None,
            })
            .collect();
        stack.extend(pages.into_iter().rev());
    }

    /// Content 栏目：完整遍历并渲染
    async fn read_content(&self, page: &BlockId, depth: usize, report: &mut CourseReport) {
        let events = walk(self.service, page.clone());
        futures::pin_mut!(events);
        while let Some(event) = events.next().await {
            match event {
                WalkEvent::Visit { .. } => {
                    if let Some(line) = event.render_line() {
                        report.lines.push(format_line(depth, &line));
                    }
                }
                WalkEvent::Failed(failure) => report.failures.push(failure),
            }
        }
    }

    /// 只输出栏目关心的块，并加上栏目标签
    async fn read_labelled(
        &self,
        page: &BlockId,
        depth: usize,
        label: &str,
        section: Section,
        report: &mut CourseReport,
    ) {
        let Some(children) = self.list(page, depth, report).await else {
            return;
        };
        for block in &children {
            if let Some(failure) = WalkFailure::malformed(depth, block) {
                report.failures.push(failure);
                continue;
            }
            if let Some(text) = section_text(section, block) {
                report
                    .lines
                    .push(format_line(depth, &format!("{}: {}", label, text)));
            }
        }
    }

    async fn list(
        &self,
        container: &BlockId,
        depth: usize,
        report: &mut CourseReport,
    ) -> Option<Vec<Block>> {
        match self.service.list_children(container).await {
            Ok(children) => Some(children),
            Err(error) => {
                warn!("⚠️ 读取栏目失败 {}: {}", container, error);
                report.failures.push(WalkFailure {
                    block_id: container.clone(),
                    depth,
                    error,
                });
                None
            }
        }
    }
}

/// 栏目关心的块文本
fn section_text(section: Section, block: &Block) -> Option<String> {
    match (section, &block.kind) {
        (Section::PrefilledCode, BlockKind::Code(code)) => join_runs(&code.rich_text),
        (Section::ErrorMessage, BlockKind::Paragraph(text)) => join_runs(&text.rich_text),
        (Section::CorrectAnswer, BlockKind::Code(code)) => join_runs(&code.rich_text),
        (Section::CorrectAnswer, BlockKind::Paragraph(text)) => join_runs(&text.rich_text),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockSpec, PageId, PageSpec, SpecKind, TextBlock};
    use crate::testing::{InMemoryService, Operation};
    use crate::workflow::TreeBuilder;
    use serde_json::json;

    #[test]
    fn test_classify() {
        assert_eq!(Section::classify("Content"), Section::Content);
        assert_eq!(Section::classify("Pre-filled Code"), Section::PrefilledCode);
        assert_eq!(Section::classify("Instructions"), Section::Instructions);
        assert_eq!(Section::classify("Instruction 2"), Section::Instruction);
        assert_eq!(Section::classify("Error Messages"), Section::ErrorMessages);
        assert_eq!(Section::classify("Error Message 2"), Section::ErrorMessage);
        assert_eq!(Section::classify("Correct Answers"), Section::CorrectAnswers);
        assert_eq!(Section::classify("Correct Answer 3"), Section::CorrectAnswer);
        assert_eq!(Section::classify("Answer 3"), Section::CorrectAnswer);
        assert_eq!(Section::classify("Notes"), Section::Other);
    }

    async fn seeded_course(service: &InMemoryService) -> PageRef {
        let root = PageId::new("course");
        let builder = TreeBuilder::new(service);
        let pages = vec![
            PageSpec::new("Content").with_blocks(vec![
                BlockSpec::paragraph("Intro"),
                BlockSpec::new(SpecKind::Toggle, "Hint")
                    .with_children(vec![BlockSpec::paragraph("Detail")]),
            ]),
            PageSpec::new("Pre-filled Code").with_blocks(vec![
                BlockSpec::paragraph("ignored"),
                BlockSpec::code("let x = 1;", "rust"),
            ]),
            PageSpec::new("Instructions").with_pages(vec![PageSpec::new("Instruction 1")
                .with_pages(vec![
                    PageSpec::new("Error Messages").with_pages(vec![PageSpec::new(
                        "Error Message 1",
                    )
                    .with_blocks(vec![BlockSpec::paragraph("Oops")])]),
                    PageSpec::new("Correct Answers").with_pages(vec![PageSpec::new(
                        "Correct Answer 1",
                    )
                    .with_blocks(vec![BlockSpec::code("answer()", "rust")])]),
                ])]),
        ];
        for page in &pages {
            builder.build_subtree(&root, page).await;
        }
        PageRef {
            id: root,
            properties: json!({ "Name": { "type": "title", "title": [{ "plain_text": "Rust 101" }] } }),
        }
    }

    #[tokio::test]
    async fn test_outline_of_built_course() {
        let service = InMemoryService::new();
        let page = seeded_course(&service).await;

        let report = CourseReader::new(&service).read_page(&page).await;
        assert!(report.failures.is_empty());
        assert_eq!(
            report.lines,
            vec![
                "Page ID: course",
                "Title: Rust 101",
                "Subpage Title: Content",
                "  Paragraph: Intro",
                "  Toggle: Hint",
                "    Paragraph: Detail",
                "Subpage Title: Pre-filled Code",
                "  Code Block: let x = 1;",
                "Subpage Title: Instructions",
                "  Subpage Title: Instruction 1",
                "    Subpage Title: Error Messages",
                "      Subpage Title: Error Message 1",
                "        Error Message: Oops",
                "    Subpage Title: Correct Answers",
                "      Subpage Title: Correct Answer 1",
                "        Answer: answer()",
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_entry_is_recorded_and_next_entry_prints() {
        let service = InMemoryService::new()
            .with_children(
                "course",
                vec![Block::new(
                    "errors",
                    BlockKind::ChildPage {
                        title: "Error Message 1".to_string(),
                    },
                )
                .with_children(true)],
            )
            .with_children(
                "errors",
                vec![
                    Block::new(
                        "bad",
                        BlockKind::Malformed {
                            kind: "paragraph".to_string(),
                            reason: "missing field `rich_text`".to_string(),
                        },
                    ),
                    Block::new("ok", BlockKind::Paragraph(TextBlock::plain(&["Oops"]))),
                ],
            );
        let page = PageRef {
            id: PageId::new("course"),
            properties: json!({}),
        };

        let report = CourseReader::new(&service).read_page(&page).await;
        assert_eq!(
            report.lines,
            vec![
                "Page ID: course",
                "Subpage Title: Error Message 1",
                "  Error Message: Oops",
            ]
        );
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].block_id, BlockId::new("bad"));
        assert_eq!(report.failures[0].depth, 1);
    }

    #[tokio::test]
    async fn test_failed_section_is_isolated() {
        let service = InMemoryService::new();
        let page = seeded_course(&service).await;
        let content_id = service.children_of(&page.id.as_block_id())[0].id.clone();
        let service = service.fail_on(Operation::ListChildren, content_id.as_str());

        let report = CourseReader::new(&service).read_page(&page).await;
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].block_id, content_id);
        assert!(report
            .lines
            .contains(&"        Answer: answer()".to_string()));
    }
}
