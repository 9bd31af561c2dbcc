pub mod notion_client;

pub use notion_client::NotionClient;
