pub mod toml_loader;

pub use toml_loader::{builtin_course, load_hierarchy, parse_hierarchy};
