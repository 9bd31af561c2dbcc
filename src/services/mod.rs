pub mod document_service;
pub mod renderer;

pub use document_service::DocumentService;
pub use renderer::{format_line, join_runs, render};
