//! Error taxonomy shared by the listing client, media resolver, and downloader.

use thiserror::Error;

/// Failure of one remote call or one local write.
///
/// Listing failures end the crawl; resolve and download failures are counted
/// against the single item and the crawl moves on.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Connection-level failure reported by libcurl (DNS, connect, timeout, reset).
    #[error("transport: {0}")]
    Transport(#[from] curl::Error),
    /// Response body was not JSON or did not have the expected shape.
    #[error("protocol: {0}")]
    Protocol(String),
    /// Well-formed response carrying a non-zero application status code.
    #[error("remote error: code={code}, msg={message}")]
    Remote { code: i64, message: String },
    /// Direct file fetch answered with something other than 200.
    #[error("HTTP {code}")]
    HttpStatus { code: u32 },
    /// Local file creation or write failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl CrawlError {
    pub(crate) fn protocol(msg: impl Into<String>) -> Self {
        CrawlError::Protocol(msg.into())
    }
}
