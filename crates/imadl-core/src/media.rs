//! Media resolver: exchanges a (knowledge base, media) pair for a short-lived download URL.

use serde::Deserialize;
use serde_json::json;

use crate::config::HttpConfig;
use crate::error::CrawlError;
use crate::http::{self, excerpt};
use crate::template::RequestTemplate;

/// `scene` value the web client sends when opening a file.
const MEDIA_SCENE: u32 = 1;

#[derive(Debug, Deserialize)]
struct MediaResponse {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    jump_url: Option<String>,
}

/// Resolves the direct download URL for one item.
///
/// Reuses the template's headers only; URL and body are the media endpoint's own.
/// The returned link expires quickly and should be fetched right away.
pub fn resolve_download_url(
    media_url: &str,
    template: &RequestTemplate,
    parent_folder_id: &str,
    media_id: &str,
    http: &HttpConfig,
) -> Result<String, CrawlError> {
    let body = json!({
        "knowledge_base_id": parent_folder_id,
        "media_id": media_id,
        "scene": MEDIA_SCENE,
    });
    let response = http::post_json(media_url, &template.headers, &body, http)?;
    parse_media(&response.body)
}

fn parse_media(body: &[u8]) -> Result<String, CrawlError> {
    let resp: MediaResponse = serde_json::from_slice(body).map_err(|e| {
        CrawlError::protocol(format!(
            "unexpected media response: {}; body: {}",
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
    match resp.jump_url {
        Some(url) if !url.trim().is_empty() => Ok(url),
        _ => Err(CrawlError::protocol("media response has no jump_url")),
    }
}
