//! Google Cloud Storage upload over the JSON API.

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::ObjectStore;
use super::errors::UploadError;
use crate::config::WarehouseConfig;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct GcsObjectStore {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl GcsObjectStore {
    pub fn new(
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| UploadError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    pub fn from_config(config: &WarehouseConfig) -> Result<Self, UploadError> {
        Self::new(&config.storage_endpoint, &config.access_token)
    }

    fn upload_url(&self, bucket: &str) -> String {
        format!("{}/upload/storage/v1/b/{bucket}/o", self.endpoint)
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

impl ObjectStore for GcsObjectStore {
    #[instrument(skip(self))]
    async fn upload(&self, local: &Path, bucket: &str, object: &str) -> Result<(), UploadError> {
        let unavailable = |source| UploadError::ArtifactUnavailable {
            path: local.to_path_buf(),
            source,
        };
        let file = tokio::fs::File::open(local).await.map_err(unavailable)?;
        let size = file.metadata().await.map_err(unavailable)?.len();

        debug!("Uploading {size} bytes to gs://{bucket}/{object}");

        let response = self
            .client
            .post(self.upload_url(bucket))
            .query(&[("uploadType", "media"), ("name", object)])
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, content_type_for(local))
            .header(CONTENT_LENGTH, size)
            .body(reqwest::Body::from(file))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("Successfully uploaded to gs://{bucket}/{object}");
        Ok(())
    }
}
