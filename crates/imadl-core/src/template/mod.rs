//! Request template: the captured listing request replayed once per page.
//!
//! A template is built from a raw HTTP request pasted from a proxy or devtools
//! (`parse_raw_request`) or from a browser HAR export (`from_har`). It is never
//! mutated; each page derives a fresh JSON body with `page_body`.

mod har;
mod raw;

pub use har::from_har;
pub use raw::{parse_raw_request, read_raw_request};

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::cursor::encode_cursor;

/// Body field carrying the pagination token.
pub const CURSOR_FIELD: &str = "cursor";
/// Body field carrying the requested page size.
pub const LIMIT_FIELD: &str = "limit";

/// Captured listing request: target URL, headers, and JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestTemplate {
    pub url: String,
    /// Header name to value, names as captured (last one wins on duplicates).
    pub headers: HashMap<String, String>,
    pub body: Map<String, Value>,
}

impl RequestTemplate {
    /// Body for the page starting at `offset`: the captured body with `cursor` and `limit` replaced.
    pub fn page_body(&self, offset: u64, limit: u32) -> Value {
        let mut body = self.body.clone();
        body.insert(CURSOR_FIELD.to_string(), Value::String(encode_cursor(offset)));
        body.insert(LIMIT_FIELD.to_string(), Value::from(limit));
        Value::Object(body)
    }

    /// Captured body as compact JSON text.
    pub fn body_json(&self) -> String {
        Value::Object(self.body.clone()).to_string()
    }
}

/// Parses a captured body; it must be a JSON object.
pub(crate) fn parse_body(text: &str) -> anyhow::Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| anyhow::anyhow!("request body is not valid JSON: {}", e))?;
    match value {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("request body must be a JSON object, got {}", json_kind(&other)),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
