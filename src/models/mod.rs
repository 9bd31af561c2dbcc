pub mod block;
pub mod block_spec;
pub mod ids;
pub mod loaders;
pub mod page;

pub use block::{Block, BlockKind, CodeBlock, TextBlock, TextRun};
pub use block_spec::{BlockSpec, SpecKind, DEFAULT_CODE_LANGUAGE};
pub use ids::{BlockId, DatabaseId, PageId};
pub use loaders::{builtin_course, load_hierarchy};
pub use page::{Hierarchy, PageRef, PageSpec};
