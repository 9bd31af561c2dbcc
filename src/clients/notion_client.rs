//! Notion API 客户端
//!
//! 把 `DocumentService` 的四个操作翻译为 HTTP 请求

use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ApiError, ApiResult, AppError};
use crate::infrastructure::NotionHttp;
use crate::models::{Block, BlockId, BlockSpec, DatabaseId, PageId, PageRef};
use crate::services::DocumentService;
use crate::utils::logging::truncate_text;

/// 单次列表请求的条数上限（服务端允许的最大值）
const PAGE_SIZE: u32 = 100;

/// Notion API 客户端
pub struct NotionClient {
    http: NotionHttp,
}

impl NotionClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            http: NotionHttp::new(config)?,
        })
    }

    /// 构建创建页面的请求体
    pub fn create_page_body(parent: &PageId, title: &str) -> JsonValue {
        json!({
            "parent": { "page_id": parent.as_str() },
            "properties": {
                "title": [
                    { "type": "text", "text": { "content": title } }
                ]
            }
        })
    }

    /// 构建追加子块的请求体
    pub fn append_body(blocks: &[BlockSpec]) -> JsonValue {
        let children: Vec<JsonValue> = blocks.iter().map(BlockSpec::to_wire).collect();
        json!({ "children": children })
    }

    /// 提取列表响应中的 `results`
    pub fn extract_results<'a>(endpoint: &str, response: &'a JsonValue) -> ApiResult<&'a Vec<JsonValue>> {
        if response.get("has_more").and_then(JsonValue::as_bool) == Some(true) {
            warn!("⚠️ {} 还有更多结果，只处理第一页", endpoint);
        }
        response
            .get("results")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| ApiError::malformed(endpoint, "缺少 results 数组"))
    }

    /// 解析数据库查询结果
    pub fn parse_pages(endpoint: &str, response: &JsonValue) -> ApiResult<Vec<PageRef>> {
        Self::extract_results(endpoint, response)?
            .iter()
            .map(|page| {
                let id = page
                    .get("id")
                    .and_then(JsonValue::as_str)
                    .ok_or_else(|| ApiError::malformed(endpoint, "页面缺少 id 字段"))?;
                Ok(PageRef {
                    id: PageId::new(id),
                    properties: page.get("properties").cloned().unwrap_or(JsonValue::Null),
                })
            })
            .collect()
    }

    /// 解析子块列表
    pub fn parse_blocks(endpoint: &str, response: &JsonValue) -> ApiResult<Vec<Block>> {
        Self::extract_results(endpoint, response)?
            .iter()
            .map(|value| Block::from_wire(value).map_err(|reason| ApiError::malformed(endpoint, reason)))
            .collect()
    }
}

impl DocumentService for NotionClient {
    async fn query_collection(&self, database_id: &DatabaseId) -> ApiResult<Vec<PageRef>> {
        let endpoint = format!("databases/{}/query", database_id);
        let response = self.http.post_json(&endpoint, &json!({})).await?;
        let pages = Self::parse_pages(&endpoint, &response)?;
        debug!("数据库 {} 返回 {} 个页面", database_id, pages.len());
        Ok(pages)
    }

    async fn create_page(&self, parent: &PageId, title: &str) -> ApiResult<PageId> {
        let endpoint = "pages";
        let body = Self::create_page_body(parent, title);
        let response = self.http.post_json(endpoint, &body).await?;
        let id = response
            .get("id")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| ApiError::malformed(endpoint, "创建结果缺少 id 字段"))?;
        Ok(PageId::new(id))
    }

    async fn append_blocks(&self, block_id: &BlockId, blocks: &[BlockSpec]) -> ApiResult<()> {
        let endpoint = format!("blocks/{}/children", block_id);
        let body = Self::append_body(blocks);
        debug!("追加 Payload: {}", truncate_text(&body.to_string(), 200));
        self.http.patch_json(&endpoint, &body).await?;
        Ok(())
    }

    async fn list_children(&self, block_id: &BlockId) -> ApiResult<Vec<Block>> {
        let endpoint = format!("blocks/{}/children", block_id);
        let response = self
            .http
            .get_json(&format!("{}?page_size={}", endpoint, PAGE_SIZE))
            .await?;
        Self::parse_blocks(&endpoint, &response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockKind, SpecKind};

    #[test]
    fn test_create_page_body() {
        let body = NotionClient::create_page_body(&PageId::new("parent-1"), "Content");
        assert_eq!(body["parent"]["page_id"], "parent-1");
        assert_eq!(body["properties"]["title"][0]["text"]["content"], "Content");
    }

    #[test]
    fn test_append_body_keeps_order() {
        let blocks = vec![
            BlockSpec::paragraph("first"),
            BlockSpec::new(SpecKind::Heading2, "second"),
        ];
        let body = NotionClient::append_body(&blocks);
        let children = body["children"].as_array().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0]["type"], "paragraph");
        assert_eq!(children[1]["type"], "heading_2");
    }

    #[test]
    fn test_parse_blocks() {
        let response = json!({
            "object": "list",
            "has_more": false,
            "results": [
                {
                    "id": "a",
                    "type": "paragraph",
                    "has_children": false,
                    "paragraph": { "rich_text": [{ "plain_text": "x" }] }
                },
                { "id": "b", "type": "child_page", "has_children": true, "child_page": { "title": "T" } }
            ]
        });
        let blocks = NotionClient::parse_blocks("blocks/root/children", &response).unwrap();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[1].has_children);
        assert!(matches!(blocks[1].kind, BlockKind::ChildPage { .. }));
    }

    #[test]
    fn test_parse_rejects_missing_results() {
        let err = NotionClient::parse_blocks("blocks/root/children", &json!({ "object": "list" }))
            .unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse { .. }));

        let err = NotionClient::parse_blocks(
            "blocks/root/children",
            &json!({ "results": [{ "type": "paragraph" }] }),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_pages() {
        let response = json!({
            "results": [
                { "object": "page", "id": "p-1", "properties": { "Name": { "type": "title", "title": [] } } }
            ]
        });
        let pages = NotionClient::parse_pages("databases/d/query", &response).unwrap();
        assert_eq!(pages[0].id, PageId::new("p-1"));
        assert_eq!(pages[0].title().as_deref(), Some(""));
    }
}
