//! Test utilities and helper functions for the jobscrape test suite

use anyhow::Result;
use jobscrape::config::{ScrapeConfig, SinkFormat, WarehouseConfig};
use jobscrape::crawl_engine::{CrawlSummary, ProgressReporter};
use jobscrape::listing_extractor::JobRecord;
use jobscrape::page_renderer::{PageRenderer, RenderError};
use jobscrape::publisher::{ObjectStore, UploadError};
use jobscrape::warehouse::{LoadError, LoadJobHandle, LoadJobSpec, LoadJobStatus, WarehouseJobs};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use url::Url;

#[allow(dead_code)]
pub const TEST_START_URL: &str = "https://careers.example.com/search?p=1";

/// Creates a temporary directory for test output
#[allow(dead_code)]
pub fn create_test_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// One listing card in the production markup
#[allow(dead_code)]
pub fn listing_card(title: &str, level_location: &str, href: Option<&str>) -> String {
    let anchor_open = match href {
        Some(href) => format!(r#"<a class="bx--card-group__card" href="{href}">"#),
        None => r#"<a class="bx--card-group__card">"#.to_string(),
    };
    format!(
        r#"<div class="bx--card-group__cards__col">{anchor_open}<div class="bx--card__content"><h3 class="bx--card__heading">{title}</h3><div class="ibm--card__copy"><div class="ibm--card__copy__inner">{level_location}</div></div></div></a></div>"#
    )
}

/// The reference card: one software engineering job in Austin
#[allow(dead_code)]
pub fn software_engineer_card() -> String {
    listing_card(
        "Software Engineer",
        "Early career<br/>Austin, TX",
        Some("/jobs/123"),
    )
}

/// Scrape config pointing at the fake site, with millisecond retry delays
#[allow(dead_code)]
pub fn create_test_config(output: &Path, format: SinkFormat) -> ScrapeConfig {
    ScrapeConfig::builder()
        .output_path(output)
        .start_url(TEST_START_URL)
        .sink_format(format)
        .retry_base_delay_ms(1)
        .build()
        .expect("test config is valid")
}

#[allow(dead_code)]
pub fn test_warehouse_config(endpoint: &str) -> WarehouseConfig {
    let mut config = WarehouseConfig::new("jobs-bucket", "test-project", "jobs", "listings", "token");
    config.storage_endpoint = endpoint.to_string();
    config.bigquery_endpoint = endpoint.to_string();
    config.poll_interval_ms = 1;
    config
}

/// One scripted results page
#[allow(dead_code)]
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub fragments: Vec<String>,
    pub next_disabled: bool,
}

#[allow(dead_code)]
impl FakePage {
    pub fn new(fragments: Vec<String>, next_disabled: bool) -> Self {
        Self {
            fragments,
            next_disabled,
        }
    }
}

/// Renderer serving scripted pages keyed by the `p` query parameter
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeRenderer {
    pages: HashMap<u32, FakePage>,
    failures: HashMap<u32, u32>,
    cancel_on: Option<(u32, CancellationToken)>,
    current: Option<u32>,
    /// Every URL passed to `navigate`, in order
    pub navigations: Vec<String>,
}

#[allow(dead_code)]
impl FakeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, number: u32, page: FakePage) -> Self {
        self.pages.insert(number, page);
        self
    }

    /// Make the first `times` navigations to page `number` fail
    pub fn failing(mut self, number: u32, times: u32) -> Self {
        self.failures.insert(number, times);
        self
    }

    /// Cancel `token` as soon as page `number` is requested
    pub fn cancel_when_loading(mut self, number: u32, token: CancellationToken) -> Self {
        self.cancel_on = Some((number, token));
        self
    }

    pub fn visited_pages(&self) -> Vec<u32> {
        self.navigations.iter().filter_map(|url| page_number(url)).collect()
    }

    fn page(&self) -> Result<&FakePage, RenderError> {
        self.current
            .and_then(|n| self.pages.get(&n))
            .ok_or_else(|| RenderError::Evaluation("no page loaded".to_string()))
    }
}

fn page_number(url: &str) -> Option<u32> {
    let url = Url::parse(url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "p")
        .and_then(|(_, value)| value.parse().ok())
}

impl PageRenderer for FakeRenderer {
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        self.navigations.push(url.to_string());
        self.current = None;

        let number = page_number(url).ok_or_else(|| RenderError::Navigation {
            url: url.to_string(),
            message: "no page parameter".to_string(),
        })?;

        if let Some((cancel_page, token)) = &self.cancel_on
            && *cancel_page == number
        {
            token.cancel();
        }

        if let Some(left) = self.failures.get_mut(&number)
            && *left > 0
        {
            *left -= 1;
            return Err(RenderError::Navigation {
                url: url.to_string(),
                message: "connection reset".to_string(),
            });
        }

        if !self.pages.contains_key(&number) {
            return Err(RenderError::Navigation {
                url: url.to_string(),
                message: "404".to_string(),
            });
        }
        self.current = Some(number);
        Ok(())
    }

    async fn wait_visible(&mut self, selector: &str) -> Result<(), RenderError> {
        self.page().map(|_| ()).map_err(|_| RenderError::Timeout {
            operation: format!("wait_visible({selector})"),
            secs: 0,
        })
    }

    async fn evaluate(&mut self, script: &str) -> Result<Value, RenderError> {
        let page = self.page()?;
        if script.contains("querySelectorAll") {
            Ok(json!(page.fragments))
        } else if script.contains("!== null") {
            Ok(json!(page.next_disabled))
        } else {
            Ok(Value::Null)
        }
    }
}

/// Progress reporter that records every event as a short string
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingProgress {
    pub events: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingProgress {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl ProgressReporter for RecordingProgress {
    fn report_page_started(&self, page: u32, _url: &str) {
        self.push(format!("started:{page}"));
    }

    fn report_page_loaded(&self, page: u32, fragments: usize) {
        self.push(format!("loaded:{page}:{fragments}"));
    }

    fn report_page_retry(&self, page: u32, attempt: u32, _error: &str) {
        self.push(format!("retry:{page}:{attempt}"));
    }

    fn report_record_written(&self, record: &JobRecord) {
        self.push(format!("record:{}", record.title));
    }

    fn report_fragment_skipped(&self, page: u32, reason: &str) {
        self.push(format!("skipped:{page}:{reason}"));
    }

    fn report_completed(&self, summary: &CrawlSummary) {
        self.push(format!("completed:{}", summary.records_written));
    }

    fn report_error(&self, _error: &str) {
        self.push("error".to_string());
    }
}

/// Object store that copies uploads into memory
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryObjectStore {
    pub objects: Mutex<HashMap<(String, String), Vec<u8>>>,
}

#[allow(dead_code)]
impl MemoryObjectStore {
    pub fn object(&self, bucket: &str, name: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), name.to_string()))
            .cloned()
    }
}

impl ObjectStore for MemoryObjectStore {
    async fn upload(&self, local: &Path, bucket: &str, object: &str) -> Result<(), UploadError> {
        let bytes = tokio::fs::read(local)
            .await
            .map_err(|source| UploadError::ArtifactUnavailable {
                path: local.to_path_buf(),
                source,
            })?;
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), object.to_string()), bytes);
        Ok(())
    }
}

/// Warehouse whose job statuses are scripted; once the script runs out the
/// job stays pending
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedJobs {
    statuses: Mutex<VecDeque<LoadJobStatus>>,
    pub submitted: Mutex<Vec<LoadJobSpec>>,
    pub polls: Mutex<u32>,
}

#[allow(dead_code)]
impl ScriptedJobs {
    pub fn new(statuses: Vec<LoadJobStatus>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            ..Self::default()
        }
    }

    pub fn polls(&self) -> u32 {
        *self.polls.lock().unwrap()
    }

    pub fn submitted(&self) -> Vec<LoadJobSpec> {
        self.submitted.lock().unwrap().clone()
    }
}

impl WarehouseJobs for ScriptedJobs {
    async fn submit_load_job(&self, spec: &LoadJobSpec) -> Result<LoadJobHandle, LoadError> {
        self.submitted.lock().unwrap().push(spec.clone());
        Ok(LoadJobHandle {
            job_id: "job_1".to_string(),
            project_id: spec.project_id.clone(),
            location: spec.location.clone(),
            status: LoadJobStatus::Pending,
        })
    }

    async fn job_status(&self, _handle: &LoadJobHandle) -> Result<LoadJobStatus, LoadError> {
        *self.polls.lock().unwrap() += 1;
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(LoadJobStatus::Pending))
    }
}

/// Path of the CSV artifact inside a test dir
#[allow(dead_code)]
pub fn csv_path(dir: &TempDir) -> PathBuf {
    dir.path().join("jobs.csv")
}

// Shared handles so tests can inspect the fakes after handing them over
impl ObjectStore for &MemoryObjectStore {
    async fn upload(&self, local: &Path, bucket: &str, object: &str) -> Result<(), UploadError> {
        (**self).upload(local, bucket, object).await
    }
}

impl WarehouseJobs for &ScriptedJobs {
    async fn submit_load_job(&self, spec: &LoadJobSpec) -> Result<LoadJobHandle, LoadError> {
        (**self).submit_load_job(spec).await
    }

    async fn job_status(&self, handle: &LoadJobHandle) -> Result<LoadJobStatus, LoadError> {
        (**self).job_status(handle).await
    }
}
