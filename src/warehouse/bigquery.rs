//! BigQuery load jobs over the v2 REST API.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::errors::LoadError;
use super::{LoadJobHandle, LoadJobSpec, LoadJobStatus, WarehouseJobs};
use crate::config::WarehouseConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JobInsert<'a> {
    job_reference: JobReference,
    configuration: JobConfiguration<'a>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    project_id: String,
    job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

#[derive(Serialize)]
struct JobConfiguration<'a> {
    load: LoadConfiguration<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoadConfiguration<'a> {
    source_uris: [&'a str; 1],
    destination_table: TableReference<'a>,
    source_format: &'static str,
    field_delimiter: &'static str,
    skip_leading_rows: u32,
    write_disposition: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TableReference<'a> {
    project_id: &'a str,
    dataset_id: &'a str,
    table_id: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobResource {
    job_reference: Option<JobReference>,
    status: Option<JobStatusResource>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatusResource {
    state: Option<String>,
    error_result: Option<ErrorProto>,
}

#[derive(Deserialize)]
struct ErrorProto {
    reason: Option<String>,
    message: Option<String>,
}

impl ErrorProto {
    fn describe(&self) -> String {
        match (&self.reason, &self.message) {
            (Some(reason), Some(message)) => format!("{reason}: {message}"),
            (Some(only), None) | (None, Some(only)) => only.clone(),
            (None, None) => "unknown error".to_string(),
        }
    }
}

impl JobResource {
    fn status(&self) -> LoadJobStatus {
        let Some(status) = &self.status else {
            return LoadJobStatus::Pending;
        };
        if status.state.as_deref() != Some("DONE") {
            return LoadJobStatus::Pending;
        }
        match &status.error_result {
            Some(error) => LoadJobStatus::Failed(error.describe()),
            None => LoadJobStatus::Succeeded,
        }
    }
}

/// Load-job client for one warehouse endpoint
#[derive(Clone)]
pub struct BigQueryJobs {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl BigQueryJobs {
    pub fn new(
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, LoadError> {
        Self::with_client_builder(
            reqwest::Client::builder().timeout(REQUEST_TIMEOUT),
            endpoint,
            access_token,
        )
    }

    /// Same as [`BigQueryJobs::new`] with caller-supplied client settings
    pub fn with_client_builder(
        builder: reqwest::ClientBuilder,
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, LoadError> {
        let client = builder
            .build()
            .map_err(|e| LoadError::Client(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    pub fn from_config(config: &WarehouseConfig) -> Result<Self, LoadError> {
        Self::new(&config.bigquery_endpoint, &config.access_token)
    }

    fn jobs_url(&self, project_id: &str) -> String {
        format!("{}/bigquery/v2/projects/{project_id}/jobs", self.endpoint)
    }
}

/// Job ids only allow letters, digits, `_` and `-`
fn new_job_id() -> String {
    format!("jobscrape_{}", Uuid::new_v4().simple())
}

async fn read_job(response: reqwest::Response) -> Result<JobResource, String> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("status {}: {body}", status.as_u16()));
    }
    response
        .json::<JobResource>()
        .await
        .map_err(|e| format!("unreadable job resource: {e}"))
}

impl WarehouseJobs for BigQueryJobs {
    #[instrument(skip(self))]
    async fn submit_load_job(&self, spec: &LoadJobSpec) -> Result<LoadJobHandle, LoadError> {
        let job_id = new_job_id();
        let body = JobInsert {
            job_reference: JobReference {
                project_id: spec.project_id.clone(),
                job_id: job_id.clone(),
                location: spec.location.clone(),
            },
            configuration: JobConfiguration {
                load: LoadConfiguration {
                    source_uris: [spec.source_uri.as_str()],
                    destination_table: TableReference {
                        project_id: &spec.project_id,
                        dataset_id: &spec.dataset,
                        table_id: &spec.table,
                    },
                    source_format: "CSV",
                    field_delimiter: ",",
                    skip_leading_rows: 1,
                    write_disposition: "WRITE_APPEND",
                },
            },
        };

        debug!("Submitting load job {job_id} for {}", spec.source_uri);
        let response = self
            .client
            .post(self.jobs_url(&spec.project_id))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| LoadError::Submit(e.to_string()))?;
        let resource = read_job(response).await.map_err(LoadError::Submit)?;

        // The service may normalize the id or pick the location
        let (job_id, location) = match &resource.job_reference {
            Some(reference) => (
                reference.job_id.clone(),
                reference.location.clone().or_else(|| spec.location.clone()),
            ),
            None => (job_id, spec.location.clone()),
        };

        info!("Submitted load job {job_id}");
        Ok(LoadJobHandle {
            job_id,
            project_id: spec.project_id.clone(),
            location,
            status: resource.status(),
        })
    }

    #[instrument(skip(self), fields(job_id = %handle.job_id))]
    async fn job_status(&self, handle: &LoadJobHandle) -> Result<LoadJobStatus, LoadError> {
        let url = format!("{}/{}", self.jobs_url(&handle.project_id), handle.job_id);
        let mut request = self.client.get(url).bearer_auth(&self.access_token);
        if let Some(location) = &handle.location {
            request = request.query(&[("location", location)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LoadError::Wait(e.to_string()))?;
        let resource = read_job(response).await.map_err(LoadError::Wait)?;
        Ok(resource.status())
    }
}
