//! Type-safe builder for `ScrapeConfig` using the typestate pattern
//!
//! This module provides a fluent builder interface with compile-time validation
//! ensuring that the output path and start URL are set before building.

use crate::listing_extractor::compile_selector;
use crate::utils::constants::{
    DEFAULT_MAX_PAGE_RETRIES, DEFAULT_MAX_PAGES, DEFAULT_PAGE_LOAD_TIMEOUT_SECS,
    DEFAULT_PAGE_PARAM, DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_WAIT_VISIBLE_TIMEOUT_SECS,
};
use crate::utils::normalize_start_url;
use anyhow::{Context, Result, anyhow};
use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::{ListingSelectors, ScrapeConfig, SinkFormat};

// Type states for the builder
pub struct WithOutputPath;
pub struct WithStartUrl;

pub struct ScrapeConfigBuilder<State = ()> {
    pub(crate) output_path: Option<PathBuf>,
    pub(crate) start_url: Option<String>,
    pub(crate) page_param: String,
    pub(crate) sink_format: SinkFormat,
    pub(crate) selectors: ListingSelectors,
    pub(crate) max_pages: Option<u32>,
    pub(crate) max_page_retries: u8,
    pub(crate) retry_base_delay_ms: u64,
    pub(crate) headless: bool,
    pub(crate) page_load_timeout_secs: u64,
    pub(crate) wait_visible_timeout_secs: u64,
    pub(crate) chrome_data_dir: Option<PathBuf>,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for ScrapeConfigBuilder<()> {
    fn default() -> Self {
        Self {
            output_path: None,
            start_url: None,
            page_param: DEFAULT_PAGE_PARAM.to_string(),
            sink_format: SinkFormat::Csv,
            selectors: ListingSelectors::default(),
            max_pages: Some(DEFAULT_MAX_PAGES),
            max_page_retries: DEFAULT_MAX_PAGE_RETRIES,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            headless: true,
            page_load_timeout_secs: DEFAULT_PAGE_LOAD_TIMEOUT_SECS,
            wait_visible_timeout_secs: DEFAULT_WAIT_VISIBLE_TIMEOUT_SECS,
            chrome_data_dir: None,
            _phantom: PhantomData,
        }
    }
}

impl ScrapeConfig {
    /// Create a builder for configuring a `ScrapeConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> ScrapeConfigBuilder<()> {
        ScrapeConfigBuilder::default()
    }
}

impl<State> ScrapeConfigBuilder<State> {
    /// Move every field into a builder of the next state
    fn transition<Next>(self) -> ScrapeConfigBuilder<Next> {
        ScrapeConfigBuilder {
            output_path: self.output_path,
            start_url: self.start_url,
            page_param: self.page_param,
            sink_format: self.sink_format,
            selectors: self.selectors,
            max_pages: self.max_pages,
            max_page_retries: self.max_page_retries,
            retry_base_delay_ms: self.retry_base_delay_ms,
            headless: self.headless,
            page_load_timeout_secs: self.page_load_timeout_secs,
            wait_visible_timeout_secs: self.wait_visible_timeout_secs,
            chrome_data_dir: self.chrome_data_dir,
            _phantom: PhantomData,
        }
    }
}

impl ScrapeConfigBuilder<()> {
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> ScrapeConfigBuilder<WithOutputPath> {
        self.output_path = Some(path.into());
        self.transition()
    }
}

impl ScrapeConfigBuilder<WithOutputPath> {
    pub fn start_url(mut self, url: impl Into<String>) -> ScrapeConfigBuilder<WithStartUrl> {
        self.start_url = Some(url.into());
        self.transition()
    }
}

// Build method only available when all required fields are set
impl ScrapeConfigBuilder<WithStartUrl> {
    pub fn build(self) -> Result<ScrapeConfig> {
        let raw_url = self
            .start_url
            .ok_or_else(|| anyhow!("start_url is required"))?;
        let start_url = normalize_start_url(&raw_url)?;

        let output_path = self
            .output_path
            .ok_or_else(|| anyhow!("output_path is required"))?;
        if output_path.as_os_str().is_empty() {
            return Err(anyhow!("output_path must not be empty"));
        }

        if self.page_param.trim().is_empty() {
            return Err(anyhow!("page_param must not be empty"));
        }

        if self.max_pages == Some(0) {
            return Err(anyhow!("max_pages must be at least 1 (use None for no cap)"));
        }

        // Compile every selector once so a typo fails here, not per fragment
        let selectors = &self.selectors;
        for (name, selector) in [
            ("container", &selectors.container),
            ("title", &selectors.title),
            ("level_location", &selectors.level_location),
            ("link", &selectors.link),
            ("next_disabled", &selectors.next_disabled),
        ] {
            compile_selector(selector).with_context(|| format!("Invalid {name} selector"))?;
        }

        // Enforce headless mode in release builds
        #[cfg(not(debug_assertions))]
        let headless = if !self.headless {
            tracing::warn!(
                "Forcing headless mode in release build. \
                Headed mode is only available in debug builds for development."
            );
            true
        } else {
            self.headless
        };

        #[cfg(debug_assertions)]
        let headless = self.headless;

        Ok(ScrapeConfig {
            output_path,
            start_url,
            page_param: self.page_param,
            sink_format: self.sink_format,
            selectors: self.selectors,
            max_pages: self.max_pages,
            max_page_retries: self.max_page_retries,
            retry_base_delay_ms: self.retry_base_delay_ms,
            headless,
            page_load_timeout_secs: self.page_load_timeout_secs,
            wait_visible_timeout_secs: self.wait_visible_timeout_secs,
            chrome_data_dir: self.chrome_data_dir,
        })
    }
}

// Optional settings, available at any state
impl<State> ScrapeConfigBuilder<State> {
    #[must_use]
    pub fn sink_format(mut self, format: SinkFormat) -> Self {
        self.sink_format = format;
        self
    }

    #[must_use]
    pub fn page_param(mut self, param: impl Into<String>) -> Self {
        self.page_param = param.into();
        self
    }

    #[must_use]
    pub fn selectors(mut self, selectors: ListingSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    /// Set the page safety cap
    ///
    /// # Example
    /// ```rust
    /// # use jobscrape::config::ScrapeConfig;
    /// # fn main() -> anyhow::Result<()> {
    /// let config = ScrapeConfig::builder()
    ///     .output_path("./jobs.csv")
    ///     .start_url("https://www.ibm.com/careers/search?p=1")
    ///     .max_pages(None) // crawl until the site disables "next"
    ///     .build()?;
    /// assert_eq!(config.max_pages(), None);
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Set maximum retry attempts per page
    ///
    /// Set to 0 to abort the run on the first failed page load.
    #[must_use]
    pub fn max_page_retries(mut self, retries: u8) -> Self {
        self.max_page_retries = retries;
        self
    }

    #[must_use]
    pub fn retry_base_delay_ms(mut self, millis: u64) -> Self {
        self.retry_base_delay_ms = millis;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn page_load_timeout_secs(mut self, secs: u64) -> Self {
        self.page_load_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn wait_visible_timeout_secs(mut self, secs: u64) -> Self {
        self.wait_visible_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn chrome_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.chrome_data_dir = Some(dir.into());
        self
    }
}
