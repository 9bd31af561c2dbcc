//! 远程文档服务 - 业务能力层
//!
//! 只描述"服务端能做什么"，不关心调用顺序。
//! HTTP 实现见 `clients::NotionClient`，内存实现见 `testing::InMemoryService`。

use crate::error::ApiResult;
use crate::models::{Block, BlockId, BlockSpec, DatabaseId, PageId, PageRef};

/// 远程文档服务
///
/// 所有方法都只取一页结果，不处理分页游标；调用方按顺序逐个等待。
#[allow(async_fn_in_trait)]
pub trait DocumentService {
    /// 查询数据库中的页面
    async fn query_collection(&self, database_id: &DatabaseId) -> ApiResult<Vec<PageRef>>;

    /// 在父页面下创建子页面，返回新页面 ID
    async fn create_page(&self, parent: &PageId, title: &str) -> ApiResult<PageId>;

    /// 向块容器追加块（嵌套子块随父块一起提交）
    async fn append_blocks(&self, block_id: &BlockId, blocks: &[BlockSpec]) -> ApiResult<()>;

    /// 列出块容器的直接子块
    async fn list_children(&self, block_id: &BlockId) -> ApiResult<Vec<Block>>;
}
