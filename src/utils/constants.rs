//! Shared configuration constants for jobscrape
//!
//! Default values and selectors used throughout the codebase so the crawl
//! engine, the extractor and the binary agree on one set of magic values.

/// Default listing search URL (first results page)
pub const DEFAULT_START_URL: &str = "https://www.ibm.com/careers/search?p=1";

/// Query parameter carrying the page number
pub const DEFAULT_PAGE_PARAM: &str = "p";

/// Default tabular output artifact
pub const DEFAULT_OUTPUT_PATH: &str = "ibm_jobs.csv";

/// Container element of one listing card. Also used as the
/// "results rendered" signal before fragments are collected.
pub const LISTING_CONTAINER_SELECTOR: &str = ".bx--card-group__cards__col";

pub const TITLE_SELECTOR: &str = ".bx--card__heading";

/// Block holding `experience level<br/>location`
pub const LEVEL_LOCATION_SELECTOR: &str = ".ibm--card__copy__inner";

pub const LINK_SELECTOR: &str = "a.bx--card-group__card";

/// Present only on the last results page
pub const NEXT_DISABLED_SELECTOR: &str = r#"a[data-key="next"][aria-disabled="true"]"#;

/// Listing cards carry no description; the field is filled with this marker.
pub const DESCRIPTION_PLACEHOLDER: &str = "to be implemented";

/// Header row of the tabular artifact, in column order
pub const CSV_HEADER: [&str; 5] = ["Title", "Location", "Description", "ExperienceLevel", "URL"];

/// Safety cap on pages visited in one run
///
/// The listing site signals the last page explicitly; the cap only matters
/// when that signal never shows up (markup change, A/B test, bot wall).
pub const DEFAULT_MAX_PAGES: u32 = 500;

/// Retries per page after the first failed attempt
pub const DEFAULT_MAX_PAGE_RETRIES: u8 = 2;

/// First retry delay; doubles on every further attempt
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;

/// Upper bound for a single retry delay
pub const MAX_RETRY_DELAY_MS: u64 = 30_000;

pub const DEFAULT_PAGE_LOAD_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_WAIT_VISIBLE_TIMEOUT_SECS: u64 = 30;

/// Polling interval while waiting for the listing container to become visible
pub const VISIBILITY_POLL_INTERVAL_MS: u64 = 100;

/// Warehouse forwarding defaults
pub const DEFAULT_BUCKET: &str = "ibm_jobs_bucket";
pub const DEFAULT_PROJECT_ID: &str = "jobcrawler-391820";
pub const DEFAULT_DATASET: &str = "ibm_jobs";
pub const DEFAULT_TABLE: &str = "ibm_jobs_main_table";

pub const DEFAULT_STORAGE_ENDPOINT: &str = "https://storage.googleapis.com";
pub const DEFAULT_BIGQUERY_ENDPOINT: &str = "https://bigquery.googleapis.com";

/// Interval between load-job status polls
pub const DEFAULT_LOAD_POLL_INTERVAL_MS: u64 = 2_000;

/// Chrome user agent string for stealth mode
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
