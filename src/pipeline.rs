//! One scrape run end to end: crawl into the sink, close it, then optionally
//! publish the artifact and load it into the warehouse.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::{ScrapeConfig, SinkFormat, WarehouseConfig};
use crate::crawl_engine::{CrawlError, CrawlSummary, ProgressReporter, crawl_listings};
use crate::listing_extractor::ListingExtractor;
use crate::page_renderer::PageRenderer;
use crate::publisher::{GcsObjectStore, ObjectStore, UploadError, publish};
use crate::record_sink::{PersistError, RecordSink};
use crate::warehouse::{BigQueryJobs, LoadError, LoadJobHandle, WarehouseJobs, WarehouseLoader};

/// Every fatal outcome of a run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error(transparent)]
    Sink(#[from] PersistError),

    #[error(transparent)]
    Crawl(#[from] CrawlError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Outcome of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub crawl: CrawlSummary,
    /// CSV file or document directory left on disk
    pub artifact: PathBuf,
    /// Present when the artifact was forwarded to the warehouse
    pub load_job: Option<LoadJobHandle>,
}

/// Upload-then-load hand-off for the finished artifact
pub struct Forwarder<S, J> {
    store: S,
    loader: WarehouseLoader<J>,
    bucket: String,
    object_name: String,
    dataset: String,
    table: String,
}

impl Forwarder<GcsObjectStore, BigQueryJobs> {
    /// Cloud Storage + BigQuery clients for `config`
    pub fn from_config(config: &WarehouseConfig) -> Result<Self, PipelineError> {
        let store = GcsObjectStore::from_config(config)?;
        let jobs = BigQueryJobs::from_config(config)?;
        Ok(Self::new(store, WarehouseLoader::from_config(jobs, config), config))
    }
}

impl<S: ObjectStore, J: WarehouseJobs> Forwarder<S, J> {
    pub fn new(store: S, loader: WarehouseLoader<J>, config: &WarehouseConfig) -> Self {
        Self {
            store,
            loader,
            bucket: config.bucket.clone(),
            object_name: config.object_name.clone(),
            dataset: config.dataset.clone(),
            table: config.table.clone(),
        }
    }

    /// Publish `artifact`, then load it and wait for the job
    pub async fn forward(&self, artifact: &Path) -> Result<LoadJobHandle, PipelineError> {
        publish(&self.store, artifact, &self.bucket, &self.object_name).await?;
        let handle = self
            .loader
            .load(&self.bucket, &self.object_name, &self.dataset, &self.table)
            .await?;
        Ok(handle)
    }
}

/// Run one scrape with an already launched renderer.
///
/// Forwarding needs the tabular artifact, so it is rejected up front for
/// the document sink. The sink is closed before forwarding starts, and is
/// closed on a failed crawl too so partial results stay readable.
pub async fn run<R, P, S, J>(
    renderer: &mut R,
    config: &ScrapeConfig,
    forwarder: Option<&Forwarder<S, J>>,
    progress: &P,
    cancel: &CancellationToken,
) -> Result<RunReport, PipelineError>
where
    R: PageRenderer,
    P: ProgressReporter,
    S: ObjectStore,
    J: WarehouseJobs,
{
    if forwarder.is_some() && config.sink_format() != SinkFormat::Csv {
        return Err(PipelineError::Config(
            "warehouse forwarding requires the csv sink format".to_string(),
        ));
    }

    let extractor = ListingExtractor::new(config.selectors())
        .map_err(|e| PipelineError::Config(format!("{e:#}")))?;
    let mut sink = RecordSink::open(config.sink_format(), config.output_path())?;

    let crawl = match crawl_listings(renderer, &mut sink, config, &extractor, progress, cancel).await
    {
        Ok(summary) => summary,
        Err(e) => {
            match sink.close() {
                Ok(report) => log::info!(
                    "Kept {} record(s) in {} before the crawl failed",
                    report.records_written,
                    report.artifact.display()
                ),
                Err(close_err) => log::warn!("Closing sink after crawl failure failed: {close_err}"),
            }
            return Err(e.into());
        }
    };

    let sink_report = sink.close()?;

    let load_job = match forwarder {
        Some(forwarder) => Some(forwarder.forward(&sink_report.artifact).await?),
        None => None,
    };

    Ok(RunReport {
        crawl,
        artifact: sink_report.artifact,
        load_job,
    })
}
