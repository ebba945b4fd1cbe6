//! Remote operations the crawl loop depends on.

use std::path::Path;

use crate::config::HttpConfig;
use crate::downloader;
use crate::error::CrawlError;
use crate::listing::{self, ListingItem, PageResult};
use crate::media;
use crate::template::RequestTemplate;

/// The three calls a crawl makes. Implemented over libcurl by `CurlApi`;
/// tests substitute in-memory fakes.
pub trait KnowledgeApi {
    /// Lists the page starting at `offset`.
    fn fetch_page(&self, offset: u64, page_size: u32) -> Result<PageResult, CrawlError>;
    /// Resolves a short-lived direct link for `item`.
    fn resolve_download_url(&self, item: &ListingItem) -> Result<String, CrawlError>;
    /// Streams `url` into `dest`, returning bytes written.
    fn download(&self, url: &str, dest: &Path) -> Result<u64, CrawlError>;
}

/// Live implementation: replays the captured listing request and talks to the media endpoint.
#[derive(Debug, Clone)]
pub struct CurlApi {
    template: RequestTemplate,
    media_url: String,
    http: HttpConfig,
}

impl CurlApi {
    pub fn new(template: RequestTemplate, media_url: impl Into<String>, http: HttpConfig) -> Self {
        Self {
            template,
            media_url: media_url.into(),
            http,
        }
    }
}

impl KnowledgeApi for CurlApi {
    fn fetch_page(&self, offset: u64, page_size: u32) -> Result<PageResult, CrawlError> {
        listing::fetch_page(&self.template, offset, page_size, &self.http)
    }

    fn resolve_download_url(&self, item: &ListingItem) -> Result<String, CrawlError> {
        media::resolve_download_url(
            &self.media_url,
            &self.template,
            &item.parent_folder_id,
            &item.media_id,
            &self.http,
        )
    }

    fn download(&self, url: &str, dest: &Path) -> Result<u64, CrawlError> {
        downloader::download_file(url, dest, &self.http)
    }
}
