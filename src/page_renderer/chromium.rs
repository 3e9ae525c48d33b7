//! Headless Chromium implementation of [`PageRenderer`].

use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::page_timeout::with_page_timeout;
use super::scripts;
use super::{PageRenderer, RenderError};
use crate::browser_setup::launch_browser;
use crate::config::ScrapeConfig;
use crate::utils::constants::VISIBILITY_POLL_INTERVAL_MS;

/// One browser with one tab, driven sequentially by the crawl engine.
///
/// `close()` shuts the browser down gracefully; dropping without it aborts
/// the CDP handler and removes the temporary profile.
pub struct ChromiumRenderer {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    /// Temporary profile to delete once Chrome exits; `None` for caller-owned dirs
    temp_profile: Option<PathBuf>,
    page_load_timeout_secs: u64,
    wait_visible_timeout_secs: u64,
}

impl ChromiumRenderer {
    /// Launch Chromium according to `config` and open a blank tab
    pub async fn launch(config: &ScrapeConfig) -> anyhow::Result<Self> {
        let launched = launch_browser(config).await?;

        let page = match launched.browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                launched.handler.abort();
                return Err(anyhow::anyhow!("Failed to open browser tab: {e}"));
            }
        };

        Ok(Self {
            browser: launched.browser,
            handler: launched.handler,
            page,
            temp_profile: launched
                .owns_user_data_dir
                .then_some(launched.user_data_dir),
            page_load_timeout_secs: config.page_load_timeout_secs(),
            wait_visible_timeout_secs: config.wait_visible_timeout_secs(),
        })
    }

    /// Close the tab and the browser, then remove the temporary profile
    pub async fn close(&mut self) -> Result<(), RenderError> {
        if let Err(e) = self.page.clone().close().await {
            debug!("Closing tab failed (browser may already be gone): {e}");
        }
        self.browser
            .close()
            .await
            .map_err(|e| RenderError::Browser(format!("close failed: {e}")))?;
        if let Err(e) = self.browser.wait().await {
            warn!("Waiting for browser exit failed: {e}");
        }
        self.handler.abort();
        self.remove_temp_profile();
        info!("Browser closed");
        Ok(())
    }

    fn remove_temp_profile(&mut self) {
        if let Some(dir) = self.temp_profile.take()
            && let Err(e) = std::fs::remove_dir_all(&dir)
        {
            warn!(
                "Failed to remove browser profile {}: {e}. Manual cleanup may be required.",
                dir.display()
            );
        }
    }
}

async fn evaluate_on(page: &Page, script: &str) -> Result<serde_json::Value, RenderError> {
    let result = page
        .evaluate(script)
        .await
        .map_err(|e| RenderError::Evaluation(e.to_string()))?;
    // `undefined` has no JSON value
    Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
}

impl PageRenderer for ChromiumRenderer {
    #[instrument(skip(self))]
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        let page = &self.page;
        with_page_timeout(
            async move {
                page.goto(url)
                    .await
                    .map_err(|e| RenderError::Navigation {
                        url: url.to_string(),
                        message: e.to_string(),
                    })?;
                Ok(())
            },
            self.page_load_timeout_secs,
            "navigation",
        )
        .await
    }

    #[instrument(skip(self))]
    async fn wait_visible(&mut self, selector: &str) -> Result<(), RenderError> {
        let script = scripts::element_visible(selector);
        let page = self.page.clone();
        with_page_timeout(
            async move {
                loop {
                    let visible = evaluate_on(&page, &script).await?;
                    if visible.as_bool().unwrap_or(false) {
                        return Ok(());
                    }
                    tokio::time::sleep(Duration::from_millis(VISIBILITY_POLL_INTERVAL_MS)).await;
                }
            },
            self.wait_visible_timeout_secs,
            "wait_visible",
        )
        .await
    }

    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value, RenderError> {
        with_page_timeout(
            evaluate_on(&self.page, script),
            self.page_load_timeout_secs,
            "evaluate",
        )
        .await
    }
}

impl Drop for ChromiumRenderer {
    fn drop(&mut self) {
        self.handler.abort();
        if self.temp_profile.is_some() {
            warn!("ChromiumRenderer dropped without close() - removing profile in Drop");
            self.remove_temp_profile();
        }
    }
}
