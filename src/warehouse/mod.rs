//! Asynchronous warehouse ingestion of the published artifact.

pub mod bigquery;
pub mod errors;
pub mod loader;

pub use bigquery::BigQueryJobs;
pub use errors::LoadError;
pub use loader::WarehouseLoader;

use serde::Serialize;
use std::future::Future;

/// Everything needed to create one load job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadJobSpec {
    pub project_id: String,
    pub dataset: String,
    pub table: String,
    /// `gs://bucket/object`
    pub source_uri: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LoadJobStatus {
    Pending,
    Succeeded,
    Failed(String),
}

impl LoadJobStatus {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoadJobStatus::Pending)
    }
}

/// A submitted load job and the last status seen for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadJobHandle {
    pub job_id: String,
    pub project_id: String,
    pub location: Option<String>,
    pub status: LoadJobStatus,
}

/// Warehouse job capability: create a load job, then ask how it is doing
pub trait WarehouseJobs {
    fn submit_load_job(
        &self,
        spec: &LoadJobSpec,
    ) -> impl Future<Output = Result<LoadJobHandle, LoadError>> + Send;

    fn job_status(
        &self,
        handle: &LoadJobHandle,
    ) -> impl Future<Output = Result<LoadJobStatus, LoadError>> + Send;
}
