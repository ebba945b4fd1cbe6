//! Single-stream HTTP GET of a resolved link into a local file.
//!
//! The destination is created (truncating any existing file) only once the
//! final response is known to be `200 OK`. There is no retry and no cleanup:
//! a transfer that dies midway leaves the partial file behind.

use std::cell::Cell;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str;

use crate::config::HttpConfig;
use crate::error::CrawlError;

const HTTP_OK: u32 = 200;

/// Downloads `url` to `dest`. Returns the number of body bytes written.
pub fn download_file(url: &str, dest: &Path, http: &HttpConfig) -> Result<u64, CrawlError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(http.connect_timeout())?;
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(std::time::Duration::from_secs(60))?;
    easy.timeout(http.download_timeout())?;

    // Status of the most recent response; redirects emit several status lines.
    let status = Cell::new(0u32);
    let mut out: Option<BufWriter<File>> = None;
    let mut write_err: Option<io::Error> = None;
    let mut written = 0u64;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Some(code) = str::from_utf8(data).ok().and_then(parse_status_line) {
                status.set(code);
            }
            true
        })?;
        transfer.write_function(|data| {
            if status.get() != HTTP_OK {
                // Error page body; swallow it and report the status afterwards.
                return Ok(data.len());
            }
            match write_chunk(&mut out, dest, data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    write_err = Some(e);
                    Ok(0) // abort transfer
                }
            }
        })?;
        let result = transfer.perform();
        result
    };

    if let Some(e) = write_err {
        return Err(CrawlError::Io(e));
    }
    performed?;

    let code = easy.response_code()?;
    if code != HTTP_OK {
        return Err(CrawlError::HttpStatus { code });
    }

    match out {
        Some(mut w) => w.flush()?,
        // Empty body: still leave an (empty) file behind.
        None => {
            File::create(dest)?;
        }
    }
    tracing::debug!(url, dest = %dest.display(), bytes = written, "download finished");
    Ok(written)
}

/// Appends to the destination, creating it on the first chunk.
fn write_chunk(out: &mut Option<BufWriter<File>>, dest: &Path, data: &[u8]) -> io::Result<()> {
    if out.is_none() {
        *out = Some(BufWriter::new(File::create(dest)?));
    }
    if let Some(w) = out.as_mut() {
        w.write_all(data)?;
    }
    Ok(())
}

/// `HTTP/1.1 200 OK` → 200. Header lines that are not status lines yield None.
fn parse_status_line(line: &str) -> Option<u32> {
    let line = line.trim();
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_lines() {
        assert_eq!(parse_status_line("HTTP/1.1 200 OK\r\n"), Some(200));
        assert_eq!(parse_status_line("HTTP/2 302\r\n"), Some(302));
        assert_eq!(parse_status_line("Content-Length: 12\r\n"), None);
        assert_eq!(parse_status_line("\r\n"), None);
    }
}
