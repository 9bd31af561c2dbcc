//! 内存版文档服务
//!
//! 记录每一次调用，可以按操作和 ID 注入失败。测试和 `build --dry-run` 都用它。

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::error::{ApiError, ApiResult};
use crate::models::{
    Block, BlockId, BlockKind, BlockSpec, CodeBlock, DatabaseId, PageId, PageRef, SpecKind,
    TextBlock, TextRun, DEFAULT_CODE_LANGUAGE,
};
use crate::services::DocumentService;

/// 远程操作种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    QueryCollection,
    CreatePage,
    AppendBlocks,
    ListChildren,
}

/// 一次被记录的调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    QueryCollection(DatabaseId),
    CreatePage { parent: PageId, title: String },
    AppendBlocks { block_id: BlockId, blocks: Vec<BlockSpec> },
    ListChildren(BlockId),
}

#[derive(Default)]
struct State {
    next_id: u64,
    collections: HashMap<DatabaseId, Vec<PageRef>>,
    children: HashMap<BlockId, Vec<Block>>,
    /// 由本服务创建的块；预置块的 `has_children` 原样返回
    created: HashSet<BlockId>,
    failures: HashSet<(Operation, String)>,
    calls: Vec<Call>,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn should_fail(&self, operation: Operation, key: &str) -> bool {
        self.failures.contains(&(operation, key.to_string()))
    }

    /// 把块描述落地为带 ID 的块，嵌套子块挂到新块下
    fn materialize(&mut self, spec: &BlockSpec) -> Block {
        let id = BlockId::new(self.next_id("block"));
        self.created.insert(id.clone());
        let children: Vec<Block> = spec
            .children
            .iter()
            .map(|child| self.materialize(child))
            .collect();
        let has_children = !children.is_empty();
        if has_children {
            self.children.insert(id.clone(), children);
        }
        Block {
            id,
            has_children,
            kind: kind_from_spec(spec),
        }
    }
}

/// 内存版文档服务
#[derive(Default)]
pub struct InMemoryService {
    state: Mutex<State>,
}

impl InMemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 预置某个容器的子块
    pub fn with_children(self, parent: &str, blocks: Vec<Block>) -> Self {
        self.state()
            .children
            .insert(BlockId::new(parent), blocks);
        self
    }

    /// 预置数据库中的页面
    pub fn with_collection(self, database_id: &DatabaseId, pages: Vec<PageRef>) -> Self {
        self.state()
            .collections
            .insert(database_id.clone(), pages);
        self
    }

    /// 让某个操作失败
    ///
    /// `key` 对 `CreatePage` 是页面标题，对 `QueryCollection` 是数据库 ID，其余是块 ID
    pub fn fail_on(self, operation: Operation, key: &str) -> Self {
        self.state().failures.insert((operation, key.to_string()));
        self
    }

    /// 迄今为止的全部调用
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// 某个容器被列出子块的次数
    pub fn list_calls_for(&self, block_id: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| matches!(call, Call::ListChildren(id) if id.as_str() == block_id))
            .count()
    }

    /// 某个容器当前的直接子块（不记录调用）
    pub fn children_of(&self, block_id: &BlockId) -> Vec<Block> {
        self.state()
            .children
            .get(block_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl DocumentService for InMemoryService {
    async fn query_collection(&self, database_id: &DatabaseId) -> ApiResult<Vec<PageRef>> {
        let mut state = self.state();
        state.calls.push(Call::QueryCollection(database_id.clone()));
        if state.should_fail(Operation::QueryCollection, database_id.as_str()) {
            return Err(ApiError::simulated("query_collection", database_id.as_str()));
        }
        Ok(state
            .collections
            .get(database_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_page(&self, parent: &PageId, title: &str) -> ApiResult<PageId> {
        let mut state = self.state();
        state.calls.push(Call::CreatePage {
            parent: parent.clone(),
            title: title.to_string(),
        });
        if state.should_fail(Operation::CreatePage, title) {
            return Err(ApiError::simulated("create_page", title));
        }

        let id = PageId::new(state.next_id("page"));
        state.created.insert(id.as_block_id());
        let page_block = Block {
            id: id.as_block_id(),
            has_children: false,
            kind: BlockKind::ChildPage {
                title: title.to_string(),
            },
        };
        state
            .children
            .entry(parent.as_block_id())
            .or_default()
            .push(page_block);
        Ok(id)
    }

    async fn append_blocks(&self, block_id: &BlockId, blocks: &[BlockSpec]) -> ApiResult<()> {
        let mut state = self.state();
        state.calls.push(Call::AppendBlocks {
            block_id: block_id.clone(),
            blocks: blocks.to_vec(),
        });
        if state.should_fail(Operation::AppendBlocks, block_id.as_str()) {
            return Err(ApiError::simulated("append_blocks", block_id.as_str()));
        }

        let new_blocks: Vec<Block> = blocks.iter().map(|spec| state.materialize(spec)).collect();
        state
            .children
            .entry(block_id.clone())
            .or_default()
            .extend(new_blocks);
        Ok(())
    }

    async fn list_children(&self, block_id: &BlockId) -> ApiResult<Vec<Block>> {
        let mut state = self.state();
        state.calls.push(Call::ListChildren(block_id.clone()));
        if state.should_fail(Operation::ListChildren, block_id.as_str()) {
            return Err(ApiError::simulated("list_children", block_id.as_str()));
        }

        let blocks = state.children.get(block_id).cloned().unwrap_or_default();
        // 自己创建的页面在追加内容后才有子块，需要重新计算
        Ok(blocks
            .into_iter()
            .map(|mut block| {
                if state.created.contains(&block.id) {
                    block.has_children = state
                        .children
                        .get(&block.id)
                        .is_some_and(|c| !c.is_empty());
                }
                block
            })
            .collect())
    }
}

fn kind_from_spec(spec: &BlockSpec) -> BlockKind {
    let rich_text: Vec<TextRun> = spec.text.iter().map(TextRun::new).collect();
    let text = TextBlock {
        rich_text: rich_text.clone(),
        color: Some("default".to_string()),
    };
    match spec.kind {
        SpecKind::Paragraph => BlockKind::Paragraph(text),
        SpecKind::Heading1 => BlockKind::Heading1(text),
        SpecKind::Heading2 => BlockKind::Heading2(text),
        SpecKind::Heading3 => BlockKind::Heading3(text),
        SpecKind::BulletedListItem => BlockKind::BulletedListItem(text),
        SpecKind::NumberedListItem => BlockKind::NumberedListItem(text),
        SpecKind::Toggle => BlockKind::Toggle(text),
        SpecKind::Quote => BlockKind::Quote(text),
        SpecKind::Code => BlockKind::Code(CodeBlock {
            rich_text,
            language: Some(
                spec.language
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CODE_LANGUAGE.to_string()),
            ),
        }),
        SpecKind::ToDo => BlockKind::ToDo {
            rich_text,
            checked: spec.checked,
        },
    }
}
