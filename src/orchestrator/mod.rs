//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `collection_reader` - 集合读取器
//! - 查询数据库中的顶层页面
//! - 逐页遍历（全部块）或按课程栏目输出大纲
//!
//! ### `course_writer` - 课程写入器
//! - 把层级描述挂到根页面下
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator (集合 / 整个课程)
//!     ↓
//! workflow (TreeWalker / TreeBuilder / CourseReader)
//!     ↓
//! services (DocumentService / renderer)
//!     ↓
//! infrastructure (NotionHttp)
//! ```

pub mod collection_reader;
pub mod course_writer;

pub use collection_reader::{CollectionReader, ReadMode, ReadStats};
pub use course_writer::CourseWriter;
