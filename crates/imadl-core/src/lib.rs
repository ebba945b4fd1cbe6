pub mod config;
pub mod logging;

pub mod crawl;
pub mod cursor;
pub mod downloader;
pub mod error;
mod http;
pub mod listing;
pub mod media;
pub mod sanitize;
pub mod template;

pub use error::CrawlError;
