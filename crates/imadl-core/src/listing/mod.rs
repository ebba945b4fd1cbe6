//! Listing client: one POST per page against the captured listing endpoint.

mod parse;

pub(crate) use parse::parse_page;

use crate::config::HttpConfig;
use crate::error::CrawlError;
use crate::http;
use crate::template::RequestTemplate;

/// One downloadable entry of a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingItem {
    /// Display name; also the base for the local filename.
    pub title: String,
    /// Knowledge base (folder) the media lives in.
    pub parent_folder_id: String,
    pub media_id: String,
}

/// Parsed listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub items: Vec<ListingItem>,
    /// Server says there is nothing after this page.
    pub is_end: bool,
    /// Server-side continuation token. Kept for diagnostics only; the next
    /// cursor is always recomputed from the local offset.
    pub next_cursor: String,
    /// Total number of entries as reported by the server (display only).
    pub total_size: String,
}

/// Fetches the page starting at `offset`, asking for `page_size` items.
pub fn fetch_page(
    template: &RequestTemplate,
    offset: u64,
    page_size: u32,
    http: &HttpConfig,
) -> Result<PageResult, CrawlError> {
    let body = template.page_body(offset, page_size);
    let response = http::post_json(&template.url, &template.headers, &body, http)?;
    let page = parse_page(&response.body).map_err(|e| match e {
        CrawlError::Protocol(msg) => {
            CrawlError::Protocol(format!("{} (HTTP {})", msg, response.status))
        }
        other => other,
    })?;
    tracing::debug!(
        offset,
        items = page.items.len(),
        is_end = page.is_end,
        next_cursor = %page.next_cursor,
        "listing page parsed"
    );
    Ok(page)
}
