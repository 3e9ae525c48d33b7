pub mod browser_setup;
pub mod config;
pub mod crawl_engine;
pub mod listing_extractor;
pub mod page_renderer;
pub mod pipeline;
pub mod publisher;
pub mod record_sink;
pub mod utils;
pub mod warehouse;

pub use browser_setup::{download_managed_browser, find_browser_executable, launch_browser};
pub use config::{ListingSelectors, ScrapeConfig, SinkFormat, WarehouseConfig};
pub use crawl_engine::{
    CrawlError, CrawlResult, CrawlSummary, NoOpProgress, ProgressReporter, crawl_listings,
};
pub use listing_extractor::{ExtractionError, JobRecord, ListingExtractor};
pub use page_renderer::{ChromiumRenderer, PageRenderer, RenderError};
pub use pipeline::{Forwarder, PipelineError, RunReport};
pub use publisher::{GcsObjectStore, ObjectStore, UploadError};
pub use record_sink::{PersistError, RecordSink};
pub use warehouse::{
    BigQueryJobs, LoadError, LoadJobHandle, LoadJobStatus, WarehouseJobs, WarehouseLoader,
};

use tokio_util::sync::CancellationToken;

/// Scrape with a headless Chromium and, when `warehouse` is given, publish
/// the CSV and load it into the warehouse.
pub async fn scrape(
    config: ScrapeConfig,
    warehouse: Option<WarehouseConfig>,
    cancel: CancellationToken,
) -> Result<RunReport, PipelineError> {
    let forwarder = warehouse.as_ref().map(Forwarder::from_config).transpose()?;

    let mut renderer = ChromiumRenderer::launch(&config)
        .await
        .map_err(|e| PipelineError::Browser(format!("{e:#}")))?;

    let result = pipeline::run(
        &mut renderer,
        &config,
        forwarder.as_ref(),
        &NoOpProgress,
        &cancel,
    )
    .await;

    if let Err(e) = renderer.close().await {
        log::warn!("Browser shutdown failed: {e}");
    }
    result
}
