//! Page rendering capability consumed by the crawl engine.
//!
//! The crawl engine only needs three things from a browser: go to a URL,
//! wait for a selector to become visible and evaluate a script. Keeping that
//! behind [`PageRenderer`] lets tests drive the pagination logic with
//! scripted pages instead of a real Chromium.

pub mod chromium;
pub mod page_timeout;
pub mod scripts;

pub use chromium::ChromiumRenderer;
pub use page_timeout::with_page_timeout;

use std::future::Future;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("{operation} timeout after {secs} seconds")]
    Timeout { operation: String, secs: u64 },

    #[error("Script evaluation failed: {0}")]
    Evaluation(String),

    /// Script ran but returned something of the wrong shape
    #[error("Unexpected script result: {0}")]
    UnexpectedValue(String),

    /// Browser process or CDP connection is gone
    #[error("Browser error: {0}")]
    Browser(String),
}

impl RenderError {
    /// Whether reloading the page has a chance of succeeding
    #[must_use]
    pub fn is_transient(&self) -> bool {
        !matches!(self, RenderError::Browser(_))
    }
}

/// A single browser tab the crawl engine drives sequentially
pub trait PageRenderer {
    /// Load `url` and wait for the navigation to settle
    fn navigate(&mut self, url: &str) -> impl Future<Output = Result<(), RenderError>> + Send;

    /// Wait until an element matching `selector` is rendered and visible
    fn wait_visible(
        &mut self,
        selector: &str,
    ) -> impl Future<Output = Result<(), RenderError>> + Send;

    /// Evaluate a JavaScript expression and return its JSON value
    fn evaluate(
        &mut self,
        script: &str,
    ) -> impl Future<Output = Result<serde_json::Value, RenderError>> + Send;
}
