//! jobscrape - paginated job-listing scraper
//!
//! Crawls the listing search page by page into a CSV file (or one JSON
//! document per listing) and optionally forwards the CSV to the warehouse.

use anyhow::{Context, Result};
use clap::Parser;
use jobscrape::utils::constants::{DEFAULT_OUTPUT_PATH, DEFAULT_START_URL};
use jobscrape::{ScrapeConfig, SinkFormat, WarehouseConfig, scrape};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "jobscrape")]
#[command(author, version, about = "Scrape paginated job listings")]
struct Cli {
    /// First results page
    #[arg(long, env = "JOBSCRAPE_START_URL", default_value = DEFAULT_START_URL)]
    start_url: String,

    /// CSV file, or directory for the json format
    #[arg(short, long, env = "JOBSCRAPE_OUTPUT", default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// csv or json
    #[arg(long, env = "JOBSCRAPE_FORMAT", default_value = "csv")]
    format: SinkFormat,

    /// Stop after this many pages (0 = no cap)
    #[arg(long, env = "JOBSCRAPE_MAX_PAGES")]
    max_pages: Option<u32>,

    /// Retries per failed page load
    #[arg(long, env = "JOBSCRAPE_MAX_PAGE_RETRIES")]
    max_page_retries: Option<u8>,

    /// Show the browser window (debug builds only)
    #[arg(long, env = "JOBSCRAPE_HEADED")]
    headed: bool,

    /// Upload the CSV and load it into the warehouse after the crawl
    #[arg(long, env = "JOBSCRAPE_PUBLISH")]
    publish: bool,

    /// Warehouse overrides; unset ones fall back to JOBSCRAPE_* variables
    #[arg(long)]
    bucket: Option<String>,
    #[arg(long)]
    object: Option<String>,
    #[arg(long)]
    project: Option<String>,
    #[arg(long)]
    dataset: Option<String>,
    #[arg(long)]
    table: Option<String>,
    #[arg(long)]
    location: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn scrape_config(&self) -> Result<ScrapeConfig> {
        let mut builder = ScrapeConfig::builder()
            .output_path(self.output.clone())
            .start_url(self.start_url.clone())
            .sink_format(self.format)
            .headless(!self.headed);

        if let Some(max_pages) = self.max_pages {
            builder = builder.max_pages((max_pages > 0).then_some(max_pages));
        }
        if let Some(retries) = self.max_page_retries {
            builder = builder.max_page_retries(retries);
        }

        builder.build().context("Invalid scrape configuration")
    }

    fn warehouse_config(&self) -> Result<Option<WarehouseConfig>> {
        if !self.publish {
            return Ok(None);
        }

        let mut config = WarehouseConfig::from_env()?;
        let overrides = [
            (&self.bucket, &mut config.bucket),
            (&self.object, &mut config.object_name),
            (&self.project, &mut config.project_id),
            (&self.dataset, &mut config.dataset),
            (&self.table, &mut config.table),
        ];
        for (flag, field) in overrides {
            if let Some(value) = flag {
                field.clone_from(value);
            }
        }
        if self.location.is_some() {
            config.location.clone_from(&self.location);
        }
        Ok(Some(config))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .filter_module("chromiumoxide::handler", log::LevelFilter::Off)
        .filter_module("chromiumoxide::conn", log::LevelFilter::Off)
        .init();

    let config = cli.scrape_config()?;
    let warehouse = cli.warehouse_config()?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupt received, stopping after the current page");
            on_signal.cancel();
        }
    });

    let report = scrape(config, warehouse, cancel)
        .await
        .context("Scrape failed")?;

    log::info!(
        "Done: {} page(s), {} record(s) in {}",
        report.crawl.pages_visited,
        report.crawl.records_written,
        report.artifact.display()
    );
    if report.crawl.hit_page_cap {
        log::warn!("Stopped at the page cap; later pages were not scraped");
    }
    if let Some(job) = &report.load_job {
        log::info!("Warehouse load job {} succeeded", job.job_id);
    }

    Ok(())
}
