pub mod notion_http;

pub use notion_http::NotionHttp;
