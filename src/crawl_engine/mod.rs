//! Crawl Engine Module
//!
//! Drives a page renderer through the numbered results pages of a listing
//! search, extracting and persisting records page by page.

// Sub-modules
pub mod crawl_types;
pub mod paginator;
pub mod progress;
pub mod retry;
pub mod state;

// Re-exports for public API
pub use crawl_types::{CrawlError, CrawlResult, CrawlSummary, PageCursor};
pub use paginator::crawl_listings;
pub use progress::{NoOpProgress, ProgressReporter};
pub use retry::RetryPolicy;
pub use state::{CrawlState, PageSnapshot};
