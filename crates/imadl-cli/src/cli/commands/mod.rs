//! CLI command handlers. Each command is in its own file.

mod crawl;
mod cursor;

pub use crawl::{run_crawl, CrawlOverrides, TemplateSource};
pub use cursor::run_cursor;
