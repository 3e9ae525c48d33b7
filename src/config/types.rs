//! Core configuration types for listing scrapes
//!
//! This module contains the main `ScrapeConfig` struct and the small value
//! types it is built from.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

use crate::utils::constants::{
    LEVEL_LOCATION_SELECTOR, LINK_SELECTOR, LISTING_CONTAINER_SELECTOR, NEXT_DISABLED_SELECTOR,
    TITLE_SELECTOR,
};

/// Persistence shape of the record sink, selected once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkFormat {
    /// Single CSV file, one row per record
    #[default]
    Csv,
    /// One JSON document per record inside a directory
    JsonDocuments,
}

impl FromStr for SinkFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" | "tabular" => Ok(Self::Csv),
            "json" | "json_documents" | "documents" => Ok(Self::JsonDocuments),
            other => Err(format!("unknown sink format '{other}' (expected csv or json)")),
        }
    }
}

/// CSS selectors describing the listing markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// One element per listing card; its outer HTML is the fragment
    pub container: String,
    pub title: String,
    /// Block holding experience level and location separated by a line break
    pub level_location: String,
    /// Anchor carrying the listing URL in `href`
    pub link: String,
    /// Matches only when the "next page" control is disabled
    pub next_disabled: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            container: LISTING_CONTAINER_SELECTOR.to_string(),
            title: TITLE_SELECTOR.to_string(),
            level_location: LEVEL_LOCATION_SELECTOR.to_string(),
            link: LINK_SELECTOR.to_string(),
            next_disabled: NEXT_DISABLED_SELECTOR.to_string(),
        }
    }
}

/// Main configuration struct for a scrape run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// CSV file (tabular sink) or directory (document sink)
    pub(crate) output_path: PathBuf,

    /// First results page.
    ///
    /// **INVARIANT:** parsed and carries a scheme and host (normalized in builder).
    pub(crate) start_url: Url,

    pub(crate) page_param: String,
    pub(crate) sink_format: SinkFormat,
    pub(crate) selectors: ListingSelectors,

    /// Safety cap on pages visited; `None` crawls until the site says stop
    pub(crate) max_pages: Option<u32>,

    /// Retries after a failed page load before the run aborts
    pub(crate) max_page_retries: u8,
    pub(crate) retry_base_delay_ms: u64,

    pub(crate) headless: bool,

    /// Timeout in seconds for `page.goto()`
    pub(crate) page_load_timeout_secs: u64,

    /// Timeout in seconds for the listing container to become visible
    pub(crate) wait_visible_timeout_secs: u64,

    /// Chrome user data directory for profile isolation
    #[serde(skip)]
    pub(crate) chrome_data_dir: Option<PathBuf>,
}

impl ScrapeConfig {
    /// Get the Chrome user data directory if configured
    #[must_use]
    pub fn chrome_data_dir(&self) -> Option<&PathBuf> {
        self.chrome_data_dir.as_ref()
    }
}
