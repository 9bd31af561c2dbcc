//! 课程写入器 - 编排层
//!
//! 把层级描述中的每个顶层页面依次挂到根页面下

use tracing::info;

use crate::models::{Hierarchy, PageId};
use crate::services::DocumentService;
use crate::workflow::{BuildReport, TreeBuilder};

/// 课程写入器
pub struct CourseWriter<'a, S> {
    service: &'a S,
}

impl<'a, S: DocumentService> CourseWriter<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self { service }
    }

    /// 在 `root` 下创建整个层级
    pub async fn run(&self, root: &PageId, hierarchy: &Hierarchy) -> BuildReport {
        let builder = TreeBuilder::new(self.service);
        let mut report = BuildReport {
            root: Some(root.clone()),
            ..Default::default()
        };

        for (index, page) in hierarchy.pages.iter().enumerate() {
            info!(
                "📦 [{}/{}] 创建 '{}' ({} 个页面)",
                index + 1,
                hierarchy.pages.len(),
                page.title,
                page.page_count()
            );
            let subtree = builder.build_subtree(root, page).await;
            report.merge(subtree);
        }

        report
    }
}
