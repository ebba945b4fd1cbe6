//! Crawl state threaded through the page loop as a value.

/// Counters carried from one page to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlState {
    /// Offset of the next page: items listed so far.
    pub offset: u64,
    /// 1-based number of the next page to fetch.
    pub page: u32,
    pub succeeded: u64,
    pub failed: u64,
}

impl Default for CrawlState {
    fn default() -> Self {
        Self {
            offset: 0,
            page: 1,
            succeeded: 0,
            failed: 0,
        }
    }
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items processed so far (succeeded + failed).
    pub fn attempted(&self) -> u64 {
        self.succeeded + self.failed
    }

    /// Pages successfully fetched so far.
    pub fn pages_fetched(&self) -> u32 {
        self.page - 1
    }

    /// State after a fetched page whose `item_count` items produced `tally`.
    ///
    /// The offset moves by the number of items actually returned, never by the
    /// requested page size, so a short page keeps the cursor in step with the server.
    #[must_use]
    pub fn after_page(self, item_count: usize, tally: PageTally) -> Self {
        debug_assert_eq!(tally.attempted(), item_count as u64);
        Self {
            offset: self.offset + item_count as u64,
            page: self.page + 1,
            succeeded: self.succeeded + tally.succeeded,
            failed: self.failed + tally.failed,
        }
    }
}

/// Per-page outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageTally {
    pub succeeded: u64,
    pub failed: u64,
}

impl PageTally {
    pub fn record(&mut self, ok: bool) {
        if ok {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn attempted(&self) -> u64 {
        self.succeeded + self.failed
    }
}
