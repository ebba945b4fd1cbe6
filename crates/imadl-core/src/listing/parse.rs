//! Decode listing endpoint responses into `PageResult`.

use serde::Deserialize;

use super::{ListingItem, PageResult};
use crate::error::CrawlError;
use crate::http::excerpt;

#[derive(Debug, Deserialize)]
struct ListResponse {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    knowledge_list: Option<Vec<RawItem>>,
    #[serde(default)]
    next_cursor: Option<String>,
    #[serde(default)]
    is_end: Option<bool>,
    #[serde(default)]
    total_size: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    parent_folder_id: Option<String>,
    #[serde(default)]
    media_id: Option<String>,
}

/// Parses a listing response body. Non-zero `code` becomes `CrawlError::Remote`.
pub(crate) fn parse_page(body: &[u8]) -> Result<PageResult, CrawlError> {
    let resp: ListResponse = serde_json::from_slice(body).map_err(|e| {
        CrawlError::protocol(format!(
            "unexpected listing response: {}; body: {}",
            e,
            excerpt(body)
        ))
    })?;

    if resp.code != 0 {
        return Err(CrawlError::Remote {
            code: resp.code,
            message: resp.msg.unwrap_or_default(),
        });
    }

    let items = resp
        .knowledge_list
        .unwrap_or_default()
        .into_iter()
        .map(|r| ListingItem {
            title: r.title.unwrap_or_default(),
            parent_folder_id: r.parent_folder_id.unwrap_or_default(),
            media_id: r.media_id.unwrap_or_default(),
        })
        .collect();

    // Observed as a decimal string; accept a bare number too.
    let total_size = match resp.total_size {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    Ok(PageResult {
        items,
        is_end: resp.is_end.unwrap_or_default(),
        next_cursor: resp.next_cursor.unwrap_or_default(),
        total_size,
    })
}
