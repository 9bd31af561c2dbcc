//! 页面树构建 - 流程层
//!
//! 按"父先于子"的顺序创建页面：先创建页面拿到 ID，再逐个追加顶层块，
//! 最后处理子页面。每个页面一次创建请求，每个顶层块一次追加请求，
//! 嵌套子块随父块一起提交。
//!
//! 页面创建失败时，它的内容和整个子树都不会发出请求，
//! 而是逐页记录为 `ParentMissing`。

use std::fmt;
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::models::{BlockSpec, PageId, PageSpec};
use crate::services::DocumentService;

/// 成功创建的页面
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPage {
    /// 从子树根开始的标题路径，如 `Instructions / Instruction 1`
    pub path: String,
    pub id: PageId,
}

/// 构建过程中的失败
#[derive(Debug)]
pub enum BuildFailure {
    /// 创建页面失败
    CreatePage { path: String, error: ApiError },
    /// 追加第 `index` 个顶层块失败（从 0 开始）
    AppendBlock {
        path: String,
        page: PageId,
        index: usize,
        error: ApiError,
    },
    /// 父页面没有创建成功，本页被跳过
    ParentMissing { path: String },
}

impl fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildFailure::CreatePage { path, error } => {
                write!(f, "创建页面 '{}' 失败: {}", path, error)
            }
            BuildFailure::AppendBlock {
                path, index, error, ..
            } => write!(f, "向 '{}' 追加第 {} 个块失败: {}", path, index + 1, error),
            BuildFailure::ParentMissing { path } => {
                write!(f, "跳过 '{}': 父页面不存在", path)
            }
        }
    }
}

/// 一次构建的结果
#[derive(Debug, Default)]
pub struct BuildReport {
    /// 子树根页面的 ID，创建失败时为 `None`
    pub root: Option<PageId>,
    pub created: Vec<CreatedPage>,
    pub failures: Vec<BuildFailure>,
}

impl BuildReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// 合并另一个子树的结果（根页面保持不变）
    pub fn merge(&mut self, other: BuildReport) {
        self.created.extend(other.created);
        self.failures.extend(other.failures);
    }
}

/// 页面树构建器
pub struct TreeBuilder<'a, S> {
    service: &'a S,
}

impl<'a, S: DocumentService> TreeBuilder<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self { service }
    }

    /// 在 `parent` 下创建 `spec` 描述的整个子树
    pub async fn build_subtree(&self, parent: &PageId, spec: &PageSpec) -> BuildReport {
        let mut report = BuildReport::default();
        // (父页面 ID, 页面描述, 标题路径)，逆序压栈以保持兄弟顺序
        let mut stack: Vec<(Option<PageId>, &PageSpec, String)> =
            vec![(Some(parent.clone()), spec, spec.title.clone())];
        let mut is_root = true;

        while let Some((parent, page, path)) = stack.pop() {
            let created = match parent {
                Some(parent) => self.create_page(&parent, page, &path, &mut report).await,
                None => {
                    warn!("⚠️ 跳过页面 '{}': 父页面未创建", path);
                    report.failures.push(BuildFailure::ParentMissing { path: path.clone() });
                    None
                }
            };

            if is_root {
                report.root = created.clone();
                is_root = false;
            }

            if let Some(id) = &created {
                let failures = self.append_at(id, &page.blocks, &path).await;
                report.failures.extend(failures);
            }

            for child in page.pages.iter().rev() {
                let child_path = format!("{} / {}", path, child.title);
                stack.push((created.clone(), child, child_path));
            }
        }

        report
    }

    /// 向已存在的页面追加内容，每个顶层块一次请求
    pub async fn append_content(&self, page: &PageId, blocks: &[BlockSpec]) -> Vec<BuildFailure> {
        self.append_at(page, blocks, page.as_str()).await
    }

    async fn create_page(
        &self,
        parent: &PageId,
        page: &PageSpec,
        path: &str,
        report: &mut BuildReport,
    ) -> Option<PageId> {
        match self.service.create_page(parent, &page.title).await {
            Ok(id) => {
                info!("✓ 页面 '{}' 创建成功: {}", path, id);
                report.created.push(CreatedPage {
                    path: path.to_string(),
                    id: id.clone(),
                });
                Some(id)
            }
            Err(e) => {
                error!("❌ 创建页面 '{}' 失败 (父页面 {}): {}", path, parent, e);
                report.failures.push(BuildFailure::CreatePage {
                    path: path.to_string(),
                    error: e,
                });
                None
            }
        }
    }

    async fn append_at(&self, page: &PageId, blocks: &[BlockSpec], path: &str) -> Vec<BuildFailure> {
        let mut failures = Vec::new();
        let container = page.as_block_id();

        for (index, block) in blocks.iter().enumerate() {
            match self
                .service
                .append_blocks(&container, std::slice::from_ref(block))
                .await
            {
                Ok(()) => {}
                Err(e) => {
                    error!(
                        "❌ 向 '{}' ({}) 追加第 {} 个块失败: {}",
                        path,
                        page,
                        index + 1,
                        e
                    );
                    failures.push(BuildFailure::AppendBlock {
                        path: path.to_string(),
                        page: page.clone(),
                        index,
                        error: e,
                    });
                }
            }
        }

        if !blocks.is_empty() && failures.is_empty() {
            info!("✓ '{}' 内容添加成功 ({} 个块)", path, blocks.len());
        }
        failures
    }
}
