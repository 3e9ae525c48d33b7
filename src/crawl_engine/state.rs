//! States of the pagination loop.

use super::crawl_types::PageCursor;

/// What one rendered results page yielded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    /// Outer HTML of every listing card, in page order
    pub fragments: Vec<String>,
    /// The "next page" control is disabled, i.e. this is the last page
    pub next_disabled: bool,
}

#[derive(Debug)]
pub enum CrawlState {
    /// Navigate to the cursor's page and read its fragments
    Loading(PageCursor),
    /// Extract and persist the fragments of a loaded page
    Processing {
        cursor: PageCursor,
        snapshot: PageSnapshot,
    },
    /// Decide between the next page and stopping
    Advancing(PageCursor),
    Done,
}

impl CrawlState {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            CrawlState::Loading(_) => "loading",
            CrawlState::Processing { .. } => "processing",
            CrawlState::Advancing(_) => "advancing",
            CrawlState::Done => "done",
        }
    }
}
