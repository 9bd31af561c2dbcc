//! 集合读取器 - 编排层
//!
//! 查询数据库拿到顶层页面，然后逐个页面遍历并输出。
//! 查询失败是致命的；单个页面、单个子树的失败只计入统计。

use anyhow::{Context, Result};
use futures::StreamExt;
use std::io::Write;
use tracing::info;

use crate::models::{DatabaseId, PageRef};
use crate::services::DocumentService;
use crate::workflow::{walk, CourseReader, WalkEvent};

/// 输出方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// 遍历每个页面的全部块
    Blocks,
    /// 按课程栏目输出大纲
    Outline,
}

/// 读取统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReadStats {
    pub pages: usize,
    pub lines: usize,
    pub failures: usize,
}

/// 集合读取器
pub struct CollectionReader<'a, S> {
    service: &'a S,
}

impl<'a, S: DocumentService> CollectionReader<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self { service }
    }

    /// 读取整个集合并写到 `out`
    pub async fn run<W: Write>(
        &self,
        database_id: &DatabaseId,
        mode: ReadMode,
        out: &mut W,
    ) -> Result<ReadStats> {
        info!("📁 正在查询数据库 {}...", database_id);
        let pages = self
            .service
            .query_collection(database_id)
            .await
            .with_context(|| format!("无法查询数据库: {}", database_id))?;
        info!("✓ 找到 {} 个页面", pages.len());

        let mut stats = ReadStats::default();
        for (index, page) in pages.iter().enumerate() {
            info!(
                "[页面 {}/{}] 开始读取 {}",
                index + 1,
                pages.len(),
                page.id
            );
            match mode {
                ReadMode::Blocks => self.read_blocks(page, out, &mut stats).await?,
                ReadMode::Outline => self.read_outline(page, out, &mut stats).await?,
            }
            stats.pages += 1;
        }

        Ok(stats)
    }

    /// 边遍历边输出
    async fn read_blocks<W: Write>(
        &self,
        page: &PageRef,
        out: &mut W,
        stats: &mut ReadStats,
    ) -> Result<()> {
        let events = walk(self.service, page.id.as_block_id());
        futures::pin_mut!(events);
        while let Some(event) = events.next().await {
            if let WalkEvent::Failed(_) = event {
                stats.failures += 1;
                continue;
            }
            if let Some(line) = event.render_line() {
                writeln!(out, "{}", line)?;
                stats.lines += 1;
            }
        }
        Ok(())
    }

    async fn read_outline<W: Write>(
        &self,
        page: &PageRef,
        out: &mut W,
        stats: &mut ReadStats,
    ) -> Result<()> {
        let report = CourseReader::new(self.service).read_page(page).await;
        for line in &report.lines {
            writeln!(out, "{}", line)?;
        }
        stats.lines += report.lines.len();
        stats.failures += report.failures.len();
        Ok(())
    }
}
