//! 块树遍历 - 流程层
//!
//! 深度优先、先序：先产出一个块，再展开它的子块，然后才轮到下一个兄弟。
//! 子块在消费者拉取到那一步时才请求，每次只有一个请求在途。
//!
//! 是否展开只看 `has_children`，不看块类型。某个子树拉取失败时产出一个
//! `WalkEvent::Failed`，该子树视为没有子块，兄弟子树照常遍历。
//! 载荷无法解码的块照常访问（不输出），随后再产出一个 `Failed`。

use futures::stream::{self, Stream, StreamExt};
use tracing::warn;

use crate::error::ApiError;
use crate::models::{Block, BlockId, BlockKind};
use crate::services::{format_line, render, DocumentService};

/// 遍历中的一次失败：拉取子块失败，或块载荷无法解码
#[derive(Debug)]
pub struct WalkFailure {
    /// 拉取失败的容器，或解码失败的块
    pub block_id: BlockId,
    /// 子块本应所在的深度；解码失败时为该块自身的深度
    pub depth: usize,
    pub error: ApiError,
}

impl WalkFailure {
    /// 检查块是否解码失败，是则记录日志并返回失败记录
    pub(crate) fn malformed(depth: usize, block: &Block) -> Option<Self> {
        let BlockKind::Malformed { kind, reason } = &block.kind else {
            return None;
        };
        warn!("⚠️ 块 {} ({}) 载荷无法解码: {}", block.id, kind, reason);
        Some(Self {
            block_id: block.id.clone(),
            depth,
            error: ApiError::malformed(
                format!("blocks/{}", block.id),
                format!("{} 载荷无法解码: {}", kind, reason),
            ),
        })
    }
}

/// 遍历产出的事件
#[derive(Debug)]
pub enum WalkEvent {
    Visit { depth: usize, block: Block },
    Failed(WalkFailure),
}

impl WalkEvent {
    /// 渲染为控制台的一行（带缩进）
    pub fn render_line(&self) -> Option<String> {
        match self {
            WalkEvent::Visit { depth, block } => render(block).map(|line| format_line(*depth, &line)),
            WalkEvent::Failed(_) => None,
        }
    }
}

/// 一次完整遍历的结果
#[derive(Debug, Default)]
pub struct WalkReport {
    pub visits: Vec<(usize, Block)>,
    pub failures: Vec<WalkFailure>,
}

impl WalkReport {
    fn record(&mut self, event: WalkEvent) {
        match event {
            WalkEvent::Visit { depth, block } => self.visits.push((depth, block)),
            WalkEvent::Failed(failure) => self.failures.push(failure),
        }
    }

    /// 所有可见的输出行
    pub fn lines(&self) -> Vec<String> {
        self.visits
            .iter()
            .filter_map(|(depth, block)| render(block).map(|line| format_line(*depth, &line)))
            .collect()
    }
}

struct WalkState<'a, S> {
    service: &'a S,
    /// 每一层尚未访问的兄弟块
    stack: Vec<(usize, std::vec::IntoIter<Block>)>,
    /// 上一个产出的块，下次拉取时展开
    pending: Option<(usize, BlockId)>,
    /// 紧跟在上一个访问事件之后产出的失败
    queued: Option<WalkFailure>,
}

/// 从 `root` 开始遍历，根的直接子块深度为 0
///
/// 返回惰性的事件流；每次调用都是独立的一次遍历
pub fn walk<'a, S>(service: &'a S, root: BlockId) -> impl Stream<Item = WalkEvent> + 'a
where
    S: DocumentService,
{
    let state = WalkState {
        service,
        stack: Vec::new(),
        pending: Some((0, root)),
        queued: None,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(failure) = state.queued.take() {
                return Some((WalkEvent::Failed(failure), state));
            }

            if let Some((depth, id)) = state.pending.take() {
                match state.service.list_children(&id).await {
                    Ok(children) => state.stack.push((depth, children.into_iter())),
                    Err(error) => {
                        warn!("⚠️ 获取子块失败 {}: {}", id, error);
                        let failure = WalkFailure {
                            block_id: id,
                            depth,
                            error,
                        };
                        return Some((WalkEvent::Failed(failure), state));
                    }
                }
            }

            let (depth, siblings) = state.stack.last_mut()?;
            let depth = *depth;
            match siblings.next() {
                Some(block) => {
                    if block.has_children {
                        state.pending = Some((depth + 1, block.id.clone()));
                    }
                    state.queued = WalkFailure::malformed(depth, &block);
                    return Some((WalkEvent::Visit { depth, block }, state));
                }
                None => {
                    state.stack.pop();
                }
            }
        }
    })
}

/// 遍历到底并收集结果
pub async fn walk_collect<S: DocumentService>(service: &S, root: BlockId) -> WalkReport {
    let mut report = WalkReport::default();
    let events = walk(service, root);
    futures::pin_mut!(events);
    while let Some(event) = events.next().await {
        report.record(event);
    }
    report
}
