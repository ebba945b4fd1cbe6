//! Template capture from a browser HAR (HTTP Archive) export.
//!
//! The listing call is the last POST whose JSON body carries a `cursor`
//! field; its URL, headers, and body become the template.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

use super::{RequestTemplate, CURSOR_FIELD};

/// Root HAR log (top-level wrapper).
#[derive(Debug, Deserialize)]
struct HarLog {
    log: HarRoot,
}

#[derive(Debug, Deserialize)]
struct HarRoot {
    entries: Vec<HarEntry>,
}

#[derive(Debug, Deserialize)]
struct HarEntry {
    request: HarRequest,
}

#[derive(Debug, Deserialize)]
struct HarRequest {
    method: String,
    url: String,
    #[serde(default)]
    headers: Vec<HarHeader>,
    #[serde(default, rename = "postData")]
    post_data: Option<HarPostData>,
}

#[derive(Debug, Deserialize)]
struct HarPostData {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HarHeader {
    name: String,
    value: String,
}

/// Builds a template from the listing request recorded in a HAR file.
pub fn from_har(path: &Path) -> Result<RequestTemplate> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read HAR file: {}", path.display()))?;
    let har: HarLog = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse HAR JSON: {}", path.display()))?;

    if har.log.entries.is_empty() {
        anyhow::bail!("HAR file has no entries");
    }

    let (request, body) = har
        .log
        .entries
        .into_iter()
        .rev()
        .find_map(|e| listing_body(&e.request).map(|body| (e.request, body)))
        .ok_or_else(|| {
            anyhow::anyhow!("HAR file has no POST request with a JSON body containing \"cursor\"")
        })?;

    let mut headers = HashMap::new();
    for h in request.headers {
        // HTTP/2 pseudo headers (:authority, :path, ...) are not real headers.
        if h.name.starts_with(':') || h.name.trim().is_empty() {
            continue;
        }
        headers.insert(h.name, h.value);
    }

    Ok(RequestTemplate {
        url: request.url,
        headers,
        body,
    })
}

fn listing_body(request: &HarRequest) -> Option<Map<String, Value>> {
    if !request.method.eq_ignore_ascii_case("POST") {
        return None;
    }
    let text = request.post_data.as_ref()?.text.as_deref()?;
    match serde_json::from_str::<Value>(text).ok()? {
        Value::Object(map) if map.contains_key(CURSOR_FIELD) => Some(map),
        _ => None,
    }
}
