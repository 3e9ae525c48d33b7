//! Submit a load job and block until it reaches a terminal state.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::errors::LoadError;
use super::{LoadJobHandle, LoadJobSpec, LoadJobStatus, WarehouseJobs};
use crate::config::WarehouseConfig;
use crate::utils::constants::DEFAULT_LOAD_POLL_INTERVAL_MS;

pub struct WarehouseLoader<J> {
    jobs: J,
    project_id: String,
    location: Option<String>,
    poll_interval: Duration,
    max_wait: Option<Duration>,
}

impl<J: WarehouseJobs> WarehouseLoader<J> {
    pub fn new(jobs: J, project_id: impl Into<String>) -> Self {
        Self {
            jobs,
            project_id: project_id.into(),
            location: None,
            poll_interval: Duration::from_millis(DEFAULT_LOAD_POLL_INTERVAL_MS),
            max_wait: None,
        }
    }

    pub fn from_config(jobs: J, config: &WarehouseConfig) -> Self {
        Self {
            jobs,
            project_id: config.project_id.clone(),
            location: config.location.clone(),
            poll_interval: config.poll_interval(),
            max_wait: config.max_wait(),
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Give up with `LoadError::Wait` when the job is still pending after `max_wait`
    #[must_use]
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Load `gs://bucket/object` into `dataset.table` (CSV, header row skipped,
    /// rows appended) and wait for the job to finish.
    #[instrument(skip(self))]
    pub async fn load(
        &self,
        bucket: &str,
        object: &str,
        dataset: &str,
        table: &str,
    ) -> Result<LoadJobHandle, LoadError> {
        let spec = LoadJobSpec {
            project_id: self.project_id.clone(),
            dataset: dataset.to_string(),
            table: table.to_string(),
            source_uri: format!("gs://{bucket}/{object}"),
            location: self.location.clone(),
        };

        let mut handle = self.jobs.submit_load_job(&spec).await?;
        info!(
            "Load job {} created for {} -> {}.{}",
            handle.job_id, spec.source_uri, dataset, table
        );

        let started = Instant::now();
        while !handle.status.is_terminal() {
            if let Some(max_wait) = self.max_wait
                && started.elapsed() >= max_wait
            {
                warn!("Load job {} still pending after {max_wait:?}", handle.job_id);
                return Err(LoadError::Wait(format!(
                    "job {} did not finish within {max_wait:?}",
                    handle.job_id
                )));
            }

            tokio::time::sleep(self.poll_interval).await;
            handle.status = self.jobs.job_status(&handle).await?;
            debug!("Load job {} status: {:?}", handle.job_id, handle.status);
        }

        match &handle.status {
            LoadJobStatus::Failed(reason) => Err(LoadError::JobFailed {
                job_id: handle.job_id.clone(),
                reason: reason.clone(),
            }),
            _ => {
                info!("Load job {} finished", handle.job_id);
                Ok(handle)
            }
        }
    }
}
