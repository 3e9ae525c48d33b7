//! Getter methods for `ScrapeConfig`

use std::path::Path;
use std::time::Duration;
use url::Url;

use super::types::{ListingSelectors, ScrapeConfig, SinkFormat};

impl ScrapeConfig {
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    #[must_use]
    pub fn start_url(&self) -> &Url {
        &self.start_url
    }

    #[must_use]
    pub fn page_param(&self) -> &str {
        &self.page_param
    }

    #[must_use]
    pub fn sink_format(&self) -> SinkFormat {
        self.sink_format
    }

    #[must_use]
    pub fn selectors(&self) -> &ListingSelectors {
        &self.selectors
    }

    #[must_use]
    pub fn max_pages(&self) -> Option<u32> {
        self.max_pages
    }

    #[must_use]
    pub fn max_page_retries(&self) -> u8 {
        self.max_page_retries
    }

    #[must_use]
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn page_load_timeout_secs(&self) -> u64 {
        self.page_load_timeout_secs
    }

    #[must_use]
    pub fn wait_visible_timeout_secs(&self) -> u64 {
        self.wait_visible_timeout_secs
    }
}
