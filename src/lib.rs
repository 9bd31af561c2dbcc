//! # Notion Course Tree
//!
//! 在 Notion 中批量创建课程页面层级，并遍历、输出页面的块树
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（HTTP 客户端），只暴露能力
//! - `NotionHttp` - 唯一的 Client owner，提供 get/post/patch JSON 能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `DocumentService` - 查询集合 / 创建页面 / 追加块 / 列出子块
//! - `NotionClient` - 基于 HTTP 的实现；`testing::InMemoryService` - 内存实现
//! - `renderer` - 单个块 → 一行文本
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一棵树"怎么走、怎么建
//! - `walk` - 深度优先的惰性遍历
//! - `TreeBuilder` - 父先于子的页面创建
//! - `CourseReader` - 按栏目标题输出课程大纲
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/collection_reader` - 读取整个数据库
//! - `orchestrator/course_writer` - 写入整个课程层级
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod testing;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::NotionClient;
pub use config::Config;
pub use error::{ApiError, AppError, AppResult};
pub use models::{Block, BlockKind, BlockSpec, PageId, PageSpec};
pub use orchestrator::{CollectionReader, CourseWriter, ReadMode};
pub use services::{render, DocumentService};
pub use workflow::{walk, walk_collect, TreeBuilder, WalkEvent};
