use serde::Serialize;
use std::fmt;
use url::Url;

use crate::page_renderer::RenderError;
use crate::record_sink::PersistError;
use crate::utils::page_url;

/// Fatal crawl failures. Per-fragment problems never end up here; they are
/// counted in [`CrawlSummary`].
#[derive(Debug)]
pub enum CrawlError {
    /// A page could not be loaded after every allowed attempt
    Render {
        page: u32,
        attempts: u32,
        source: RenderError,
    },
    /// The sink could not be flushed
    Sink(PersistError),
    /// Cancellation was requested; everything written so far is flushed
    Cancelled { pages_completed: u32 },
}

impl fmt::Display for CrawlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render {
                page,
                attempts,
                source,
            } => write!(f, "Page {page} failed after {attempts} attempt(s): {source}"),
            Self::Sink(e) => write!(f, "Record sink error: {e}"),
            Self::Cancelled { pages_completed } => {
                write!(f, "Crawl cancelled after {pages_completed} page(s)")
            }
        }
    }
}

impl std::error::Error for CrawlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render { source, .. } => Some(source),
            Self::Sink(e) => Some(e),
            Self::Cancelled { .. } => None,
        }
    }
}

impl From<PersistError> for CrawlError {
    fn from(err: PersistError) -> Self {
        Self::Sink(err)
    }
}

/// Convenience alias for Result with `CrawlError`
pub type CrawlResult<T> = Result<T, CrawlError>;

/// Position of the crawl. Owned and mutated by the crawl loop only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    /// 1-based
    pub page_number: u32,
    pub url: Url,
    /// Known once the page has been loaded
    pub has_next: bool,
}

impl PageCursor {
    #[must_use]
    pub fn first(start_url: &Url, page_param: &str) -> Self {
        Self {
            page_number: 1,
            url: page_url(start_url, page_param, 1),
            has_next: true,
        }
    }

    /// Cursor for the following page, URL rebuilt from this one
    #[must_use]
    pub fn advance(&self, page_param: &str) -> Self {
        let page_number = self.page_number + 1;
        Self {
            page_number,
            url: page_url(&self.url, page_param, page_number),
            has_next: true,
        }
    }
}

/// Counters for one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    pub pages_visited: u32,
    pub fragments_seen: usize,
    pub records_written: usize,
    pub extraction_failures: usize,
    pub incomplete_records: usize,
    pub write_failures: usize,
    /// Crawl stopped at the page cap instead of the site's last page
    pub hit_page_cap: bool,
}
