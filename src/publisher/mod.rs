//! Batch publishing of the finished artifact to an object store.

pub mod errors;
pub mod gcs;

pub use errors::UploadError;
pub use gcs::GcsObjectStore;

use std::future::Future;
use std::path::Path;
use tracing::{info, instrument};

/// Object storage capability used once per run, after the crawl
pub trait ObjectStore {
    /// Upload the whole file at `local` as `bucket/object`, replacing any existing object
    fn upload(
        &self,
        local: &Path,
        bucket: &str,
        object: &str,
    ) -> impl Future<Output = Result<(), UploadError>> + Send;
}

/// Publish the local artifact. Fails before any network traffic when the
/// artifact is not a regular file.
#[instrument(skip(store))]
pub async fn publish<S: ObjectStore>(
    store: &S,
    local: &Path,
    bucket: &str,
    object: &str,
) -> Result<(), UploadError> {
    let metadata = tokio::fs::metadata(local)
        .await
        .map_err(|source| UploadError::ArtifactUnavailable {
            path: local.to_path_buf(),
            source,
        })?;
    if !metadata.is_file() {
        return Err(UploadError::ArtifactUnavailable {
            path: local.to_path_buf(),
            source: std::io::Error::other("not a regular file"),
        });
    }

    info!("Publishing {} to gs://{bucket}/{object}", local.display());
    store.upload(local, bucket, object).await
}
