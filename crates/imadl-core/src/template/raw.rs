//! Raw HTTP/1.1 request capture: request line, headers, blank line, JSON body.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::BufRead;

use super::{parse_body, RequestTemplate};

/// Reads pasted request text until two consecutive empty lines (or EOF).
///
/// A single empty line is kept: it separates headers from body.
pub fn read_raw_request<R: BufRead>(reader: R) -> Result<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut empty_run = 0;
    for line in reader.lines() {
        let line = line.context("read request from input")?;
        let line = line.trim_end_matches('\r').to_string();
        if line.is_empty() {
            empty_run += 1;
            if empty_run >= 2 {
                break;
            }
        } else {
            empty_run = 0;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// Parses raw request text into a template.
///
/// The URL is `base_url` joined with the request-line target unless the target
/// is already absolute. Body lines are concatenated without separators.
pub fn parse_raw_request(text: &str, base_url: &str) -> Result<RequestTemplate> {
    let lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
    let first = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("no request captured"))?;

    let request_line = lines[first];
    let target = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("request line has no target: {:?}", request_line))?;
    let url = resolve_target(base_url, target)?;

    let rest = &lines[first + 1..];
    let split = rest.iter().position(|l| l.is_empty()).unwrap_or(rest.len());

    let mut headers = HashMap::new();
    for line in &rest[..split] {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if !name.is_empty() {
                headers.insert(name.to_string(), value.trim().to_string());
            }
        }
    }

    let body_text: String = rest.get(split + 1..).unwrap_or(&[]).concat();
    let body_text = body_text.trim();
    if body_text.is_empty() {
        anyhow::bail!("captured request has no body; the listing call posts a JSON body");
    }
    let body = parse_body(body_text)?;

    Ok(RequestTemplate { url, headers, body })
}

fn resolve_target(base_url: &str, target: &str) -> Result<String> {
    if let Ok(abs) = url::Url::parse(target) {
        return Ok(abs.to_string());
    }
    let base = url::Url::parse(base_url).with_context(|| format!("invalid base URL: {}", base_url))?;
    let joined = base
        .join(target)
        .with_context(|| format!("invalid request target: {}", target))?;
    Ok(joined.to_string())
}
