//! Progress reporting abstraction for listing crawls
//!
//! Defines the `ProgressReporter` trait for page-level lifecycle events and
//! provides a no-op implementation for callers that only want the summary.

use super::crawl_types::CrawlSummary;
use crate::listing_extractor::JobRecord;

/// Trait for reporting crawl progress at key lifecycle events
///
/// Implementations can send updates to channels, log to console, update a
/// progress bar, etc. The crawl loop calls these synchronously between awaits.
pub trait ProgressReporter: Send + Sync {
    /// Report that loading of results page `page` has started
    fn report_page_started(&self, page: u32, url: &str);

    /// Report that a page rendered and yielded `fragments` listing cards
    fn report_page_loaded(&self, page: u32, fragments: usize);

    /// Report that a page load failed and will be retried
    fn report_page_retry(&self, page: u32, attempt: u32, error: &str);

    /// Report that a record reached the sink
    fn report_record_written(&self, record: &JobRecord);

    /// Report that a fragment was skipped (extraction failure or incomplete record)
    fn report_fragment_skipped(&self, page: u32, reason: &str);

    /// Report that the crawl has completed successfully
    fn report_completed(&self, summary: &CrawlSummary);

    /// Report a fatal error that ended the crawl
    fn report_error(&self, error: &str);
}

/// Progress reporter that does nothing
///
/// All methods are no-ops and will be inlined away by the compiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    #[inline(always)]
    fn report_page_started(&self, _page: u32, _url: &str) {}

    #[inline(always)]
    fn report_page_loaded(&self, _page: u32, _fragments: usize) {}

    #[inline(always)]
    fn report_page_retry(&self, _page: u32, _attempt: u32, _error: &str) {}

    #[inline(always)]
    fn report_record_written(&self, _record: &JobRecord) {}

    #[inline(always)]
    fn report_fragment_skipped(&self, _page: u32, _reason: &str) {}

    #[inline(always)]
    fn report_completed(&self, _summary: &CrawlSummary) {}

    #[inline(always)]
    fn report_error(&self, _error: &str) {}
}
