//! Minimal HTTP/1.1 server imitating the knowledge-base API for integration tests.
//!
//! Serves three routes:
//! - `POST /list`: pages over `total_items` entries, position taken from the cursor token
//! - `POST /get_media`: returns a `jump_url` pointing back at `/files/<media_id>`
//! - `GET /files/<media_id>`: file body, or 404 for ids in `missing_files`

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    pub total_items: u64,
    /// Media ids whose resolution answers with a non-zero code.
    pub unresolvable: HashSet<String>,
    /// Media ids whose file URL answers 404.
    pub missing_files: HashSet<String>,
    /// Listing requests at this offset get an HTML 502 page.
    pub broken_offset: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }
}

pub struct KnowledgeServer {
    /// e.g. "http://127.0.0.1:12345/"
    pub base_url: String,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl KnowledgeServer {
    pub fn list_url(&self) -> String {
        format!("{}list", self.base_url)
    }

    pub fn media_url(&self) -> String {
        format!("{}get_media", self.base_url)
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub fn file_body(media_id: &str) -> Vec<u8> {
        format!("content of {media_id}\n").repeat(64).into_bytes()
    }
}

/// Starts the server in a background thread. It runs until the process exits.
pub fn start(opts: ServerOptions) -> KnowledgeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let base_url = format!("http://127.0.0.1:{}/", port);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let opts = Arc::new(opts);
    {
        let requests = Arc::clone(&requests);
        let base_url = base_url.clone();
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let requests = Arc::clone(&requests);
                let opts = Arc::clone(&opts);
                let base_url = base_url.clone();
                thread::spawn(move || handle(stream, &opts, &base_url, &requests));
            }
        });
    }
    KnowledgeServer { base_url, requests }
}

fn handle(
    mut stream: TcpStream,
    opts: &ServerOptions,
    base_url: &str,
    requests: &Mutex<Vec<RecordedRequest>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let request = match read_request(&mut stream) {
        Some(r) => r,
        None => return,
    };
    requests.lock().unwrap().push(request.clone());

    let (status, content_type, body) = route(&request, opts, base_url);
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&body);
}

type Response = (&'static str, &'static str, Vec<u8>);

fn route(req: &RecordedRequest, opts: &ServerOptions, base_url: &str) -> Response {
    match (req.method.as_str(), req.path.as_str()) {
        ("POST", "/list") => list(req, opts),
        ("POST", "/get_media") => media(req, opts, base_url),
        ("GET", path) if path.starts_with("/files/") => {
            let id = &path["/files/".len()..];
            if opts.missing_files.contains(id) {
                ("404 Not Found", "text/plain", b"not found".to_vec())
            } else {
                ("200 OK", "application/octet-stream", KnowledgeServer::file_body(id))
            }
        }
        _ => ("404 Not Found", "text/plain", b"no route".to_vec()),
    }
}

fn list(req: &RecordedRequest, opts: &ServerOptions) -> Response {
    let body = req.json();
    let offset = decode_cursor(body["cursor"].as_str().unwrap_or(""));
    let limit = body["limit"].as_u64().unwrap_or(20);
    if opts.broken_offset == Some(offset) {
        return ("502 Bad Gateway", "text/html", b"<html>502 Bad Gateway</html>".to_vec());
    }
    let end = (offset + limit).min(opts.total_items);
    let items: Vec<Value> = (offset..end)
        .map(|n| {
            json!({
                "title": format!("doc:{n}.pdf"),
                "parent_folder_id": body["knowledge_base_id"],
                "media_id": format!("m{n}"),
            })
        })
        .collect();
    let is_end = end >= opts.total_items;
    let resp = json!({
        "code": 0,
        "msg": "",
        "knowledge_list": items,
        "next_cursor": "server-side-token",
        "is_end": is_end,
        "total_size": opts.total_items.to_string(),
    });
    ("200 OK", "application/json", resp.to_string().into_bytes())
}

fn media(req: &RecordedRequest, opts: &ServerOptions, base_url: &str) -> Response {
    let body = req.json();
    let media_id = body["media_id"].as_str().unwrap_or("").to_string();
    let resp = if opts.unresolvable.contains(&media_id) {
        json!({ "code": 2001, "msg": "media not found" })
    } else {
        json!({
            "code": 0,
            "msg": "",
            "jump_url": format!("{}files/{}", base_url, media_id),
            "title": media_id,
        })
    };
    ("200 OK", "application/json", resp.to_string().into_bytes())
}

/// Cursor token → offset: base64, then tag byte 0x08, then a base-128 varint.
pub fn decode_cursor(token: &str) -> u64 {
    if token.is_empty() {
        return 0;
    }
    let bytes = STANDARD.decode(token).expect("cursor is base64");
    assert_eq!(bytes[0], 0x08, "cursor tag byte");
    let mut value = 0u64;
    for (i, b) in bytes[1..].iter().enumerate() {
        value |= u64::from(b & 0x7f) << (7 * i);
        if b & 0x80 == 0 {
            break;
        }
    }
    value
}

fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos;
        }
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return None,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    };

    let head = std::str::from_utf8(&buf[..header_end]).ok()?.to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < content_length {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return None,
            Ok(n) => body.extend_from_slice(&chunk[..n]),
        }
    }
    body.truncate(content_length);

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
