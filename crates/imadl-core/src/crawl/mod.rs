//! Crawl orchestrator: walks the listing page by page and downloads every item.
//!
//! The loop is strictly sequential. It moves between three phases:
//! fetching a page, processing its items, and done. A failed page fetch ends
//! the run; a failed item is counted and skipped.

mod api;
mod state;

pub use api::{CurlApi, KnowledgeApi};
pub use state::{CrawlState, PageTally};

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CrawlError;
use crate::listing::ListingItem;
use crate::sanitize::item_filename;

/// Knobs for one run.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub download_dir: PathBuf,
    pub page_size: u32,
    /// Courtesy pause between pages.
    pub page_delay: Duration,
}

/// Which half of an item's work failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStage {
    Resolve,
    Download,
}

impl fmt::Display for ItemStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStage::Resolve => write!(f, "resolve download link"),
            ItemStage::Download => write!(f, "download"),
        }
    }
}

/// Progress notifications emitted in order while the crawl runs.
#[derive(Debug)]
pub enum CrawlEvent<'a> {
    PageRequested {
        page: u32,
        offset: u64,
    },
    PageFetched {
        page: u32,
        items: usize,
        total_size: &'a str,
    },
    /// `index` is the 1-based position of the item across the whole run.
    ItemStarted {
        index: u64,
        item: &'a ListingItem,
    },
    ItemSaved {
        index: u64,
        path: &'a Path,
        bytes: u64,
    },
    ItemFailed {
        index: u64,
        stage: ItemStage,
        error: &'a CrawlError,
    },
}

/// Why the crawl stopped.
#[derive(Debug)]
pub enum Termination {
    /// A page came back with no items.
    EmptyPage,
    /// A page carried `is_end = true`.
    EndOfListing,
    /// The listing call failed; nothing after this point was attempted.
    FetchFailed { page: u32, error: CrawlError },
}

impl Termination {
    pub fn is_failure(&self) -> bool {
        matches!(self, Termination::FetchFailed { .. })
    }
}

/// Final report of a run.
#[derive(Debug)]
pub struct CrawlSummary {
    pub pages: u32,
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub termination: Termination,
}

impl CrawlSummary {
    fn new(state: CrawlState, termination: Termination) -> Self {
        Self {
            pages: state.pages_fetched(),
            attempted: state.attempted(),
            succeeded: state.succeeded,
            failed: state.failed,
            termination,
        }
    }

    /// True if every listed item was saved and the listing ended normally.
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && !self.termination.is_failure()
    }
}

/// Runs the crawl to completion, reporting progress through `on_event`.
pub fn run_crawl<A, F>(api: &A, opts: &CrawlOptions, mut on_event: F) -> CrawlSummary
where
    A: KnowledgeApi + ?Sized,
    F: FnMut(&CrawlEvent<'_>),
{
    let mut state = CrawlState::new();
    loop {
        on_event(&CrawlEvent::PageRequested {
            page: state.page,
            offset: state.offset,
        });
        tracing::info!(page = state.page, offset = state.offset, "fetching page");

        let page = match api.fetch_page(state.offset, opts.page_size) {
            Ok(page) => page,
            Err(error) => {
                tracing::error!(page = state.page, "failed to fetch page: {}", error);
                return finish(
                    state,
                    Termination::FetchFailed {
                        page: state.page,
                        error,
                    },
                );
            }
        };

        tracing::info!(
            page = state.page,
            items = page.items.len(),
            total = %page.total_size,
            "page fetched"
        );
        on_event(&CrawlEvent::PageFetched {
            page: state.page,
            items: page.items.len(),
            total_size: &page.total_size,
        });

        if page.items.is_empty() {
            tracing::info!(page = state.page, "page has no items; listing complete");
            return finish(
                state.after_page(0, PageTally::default()),
                Termination::EmptyPage,
            );
        }

        let tally = process_page(api, opts, &state, &page.items, &mut on_event);
        state = state.after_page(page.items.len(), tally);

        if page.is_end {
            tracing::info!(page = state.pages_fetched(), "reached last page");
            return finish(state, Termination::EndOfListing);
        }

        if !opts.page_delay.is_zero() {
            std::thread::sleep(opts.page_delay);
        }
    }
}

fn finish(state: CrawlState, termination: Termination) -> CrawlSummary {
    let summary = CrawlSummary::new(state, termination);
    tracing::info!(
        pages = summary.pages,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "crawl finished"
    );
    summary
}

/// Resolves and downloads every item of one page in listing order.
fn process_page<A, F>(
    api: &A,
    opts: &CrawlOptions,
    state: &CrawlState,
    items: &[ListingItem],
    on_event: &mut F,
) -> PageTally
where
    A: KnowledgeApi + ?Sized,
    F: FnMut(&CrawlEvent<'_>),
{
    let mut tally = PageTally::default();
    for (i, item) in items.iter().enumerate() {
        let index = state.attempted() + i as u64 + 1;
        on_event(&CrawlEvent::ItemStarted { index, item });
        let ok = process_item(api, opts, state.page, i + 1, index, item, on_event);
        tally.record(ok);
    }
    tally
}

fn process_item<A, F>(
    api: &A,
    opts: &CrawlOptions,
    page: u32,
    position: usize,
    index: u64,
    item: &ListingItem,
    on_event: &mut F,
) -> bool
where
    A: KnowledgeApi + ?Sized,
    F: FnMut(&CrawlEvent<'_>),
{
    let url = match api.resolve_download_url(item) {
        Ok(url) => url,
        Err(error) => {
            tracing::warn!(page, position, title = %item.title, "[failed] resolve link: {}", error);
            on_event(&CrawlEvent::ItemFailed {
                index,
                stage: ItemStage::Resolve,
                error: &error,
            });
            return false;
        }
    };

    let path = opts
        .download_dir
        .join(item_filename(&item.title, &item.media_id));
    match api.download(&url, &path) {
        Ok(bytes) => {
            tracing::info!(page, position, title = %item.title, bytes, "[ok] saved");
            on_event(&CrawlEvent::ItemSaved {
                index,
                path: &path,
                bytes,
            });
            true
        }
        Err(error) => {
            tracing::warn!(page, position, title = %item.title, "[failed] download: {}", error);
            on_event(&CrawlEvent::ItemFailed {
                index,
                stage: ItemStage::Download,
                error: &error,
            });
            false
        }
    }
}
