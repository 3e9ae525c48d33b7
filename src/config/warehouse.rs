use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::utils::constants::{
    DEFAULT_BIGQUERY_ENDPOINT, DEFAULT_BUCKET, DEFAULT_DATASET, DEFAULT_LOAD_POLL_INTERVAL_MS,
    DEFAULT_OUTPUT_PATH, DEFAULT_PROJECT_ID, DEFAULT_STORAGE_ENDPOINT, DEFAULT_TABLE,
};

/// Where the finished artifact is uploaded and which table it is loaded into
#[derive(Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    pub bucket: String,
    pub object_name: String,
    pub project_id: String,
    pub dataset: String,
    pub table: String,
    /// Job location (e.g. `US`, `EU`); `None` lets the warehouse pick
    pub location: Option<String>,
    pub storage_endpoint: String,
    pub bigquery_endpoint: String,
    /// OAuth2 bearer token used for both APIs
    #[serde(skip_serializing)]
    pub access_token: String,
    pub poll_interval_ms: u64,
    /// Give up waiting on the load job after this many seconds; `None` waits forever
    pub max_wait_secs: Option<u64>,
}

// Manual Debug so the token never reaches the logs
impl std::fmt::Debug for WarehouseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarehouseConfig")
            .field("bucket", &self.bucket)
            .field("object_name", &self.object_name)
            .field("project_id", &self.project_id)
            .field("dataset", &self.dataset)
            .field("table", &self.table)
            .field("location", &self.location)
            .field("storage_endpoint", &self.storage_endpoint)
            .field("bigquery_endpoint", &self.bigquery_endpoint)
            .field("access_token", &"<redacted>")
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("max_wait_secs", &self.max_wait_secs)
            .finish()
    }
}

impl WarehouseConfig {
    pub fn new(
        bucket: impl Into<String>,
        project_id: impl Into<String>,
        dataset: impl Into<String>,
        table: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            object_name: DEFAULT_OUTPUT_PATH.to_string(),
            project_id: project_id.into(),
            dataset: dataset.into(),
            table: table.into(),
            location: None,
            storage_endpoint: DEFAULT_STORAGE_ENDPOINT.to_string(),
            bigquery_endpoint: DEFAULT_BIGQUERY_ENDPOINT.to_string(),
            access_token: access_token.into(),
            poll_interval_ms: DEFAULT_LOAD_POLL_INTERVAL_MS,
            max_wait_secs: None,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let access_token = env::var("GOOGLE_OAUTH_ACCESS_TOKEN")
            .or_else(|_| env::var("JOBSCRAPE_ACCESS_TOKEN"))
            .map_err(|_| {
                anyhow::anyhow!(
                    "GOOGLE_OAUTH_ACCESS_TOKEN must be set when warehouse forwarding is enabled"
                )
            })?;

        Ok(Self {
            bucket: env::var("JOBSCRAPE_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
            object_name: env::var("JOBSCRAPE_OBJECT")
                .unwrap_or_else(|_| DEFAULT_OUTPUT_PATH.to_string()),
            project_id: env::var("JOBSCRAPE_PROJECT")
                .unwrap_or_else(|_| DEFAULT_PROJECT_ID.to_string()),
            dataset: env::var("JOBSCRAPE_DATASET").unwrap_or_else(|_| DEFAULT_DATASET.to_string()),
            table: env::var("JOBSCRAPE_TABLE").unwrap_or_else(|_| DEFAULT_TABLE.to_string()),
            location: env::var("JOBSCRAPE_LOCATION").ok(),
            storage_endpoint: env::var("JOBSCRAPE_STORAGE_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_STORAGE_ENDPOINT.to_string()),
            bigquery_endpoint: env::var("JOBSCRAPE_BIGQUERY_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_BIGQUERY_ENDPOINT.to_string()),
            access_token,
            poll_interval_ms: env::var("JOBSCRAPE_POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_LOAD_POLL_INTERVAL_MS),
            max_wait_secs: env::var("JOBSCRAPE_MAX_WAIT_SECS")
                .ok()
                .and_then(|v| v.parse().ok()),
        })
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = WarehouseConfig::new("bucket", "project", "dataset", "table", "token");
        assert_eq!(config.object_name, "ibm_jobs.csv");
        assert_eq!(config.storage_endpoint, "https://storage.googleapis.com");
        assert_eq!(config.poll_interval(), Duration::from_millis(2_000));
        assert_eq!(config.max_wait(), None);
        assert_eq!(config.object_name, "ibm_jobs.csv");
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = WarehouseConfig::new("bucket", "project", "dataset", "table", "s3cr3t");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("s3cr3t"));
        assert!(rendered.contains("<redacted>"));
    }
}
