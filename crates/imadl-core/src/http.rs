//! Blocking JSON POST over libcurl, shared by the listing client and media resolver.

use serde_json::Value;
use std::collections::HashMap;

use crate::config::HttpConfig;
use crate::error::CrawlError;

/// Captured headers that describe the captured body or connection, not the replayed one.
/// libcurl computes them for the request it actually sends.
const SKIPPED_HEADERS: &[&str] = &[
    "content-length",
    "transfer-encoding",
    "connection",
    "accept-encoding",
    "host",
];

/// Raw answer to a POST: status code and full body.
#[derive(Debug)]
pub(crate) struct JsonResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

/// True if the captured header should be forwarded on replay.
pub(crate) fn forwardable(name: &str) -> bool {
    !SKIPPED_HEADERS
        .iter()
        .any(|skip| name.trim().eq_ignore_ascii_case(skip))
}

/// POSTs `body` as JSON to `url` with the captured `headers` and returns the raw response.
///
/// Only connection-level failures are errors here; status and body are judged by the caller.
pub(crate) fn post_json(
    url: &str,
    headers: &HashMap<String, String>,
    body: &Value,
    http: &HttpConfig,
) -> Result<JsonResponse, CrawlError> {
    let payload = serde_json::to_vec(body)
        .map_err(|e| CrawlError::protocol(format!("encode request body: {}", e)))?;

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.post(true)?;
    easy.post_fields_copy(&payload)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    // Empty string: advertise every encoding libcurl can decode.
    easy.accept_encoding("")?;
    easy.connect_timeout(http.connect_timeout())?;
    easy.timeout(http.request_timeout())?;

    let mut list = curl::easy::List::new();
    let mut has_content_type = false;
    for (k, v) in headers.iter().filter(|(k, _)| forwardable(k)) {
        has_content_type |= k.trim().eq_ignore_ascii_case("content-type");
        list.append(&format!("{}: {}", k.trim(), v.trim()))?;
    }
    if !has_content_type {
        list.append("Content-Type: application/json")?;
    }
    // Disable "Expect: 100-continue" round trip.
    list.append("Expect:")?;
    easy.http_headers(list)?;

    let mut response = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            response.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    tracing::debug!(url, status, bytes = response.len(), "POST completed");
    Ok(JsonResponse {
        status,
        body: response,
    })
}

/// Short printable excerpt of a response body for error messages.
pub(crate) fn excerpt(body: &[u8]) -> String {
    const MAX: usize = 200;
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    match text.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
