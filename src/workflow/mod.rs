pub mod course_reader;
pub mod tree_builder;
pub mod tree_walker;

pub use course_reader::{CourseReader, CourseReport, Section};
pub use tree_builder::{BuildFailure, BuildReport, CreatedPage, TreeBuilder};
pub use tree_walker::{walk, walk_collect, WalkEvent, WalkFailure, WalkReport};
