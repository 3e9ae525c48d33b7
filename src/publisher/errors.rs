use std::path::PathBuf;
use thiserror::Error;

/// Upload failures. All of them are fatal; uploads are not retried.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Local artifact missing, unreadable or not a regular file
    #[error("Artifact {path} is not available: {source}")]
    ArtifactUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Connection or protocol failure talking to the object store
    #[error("Object store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Object store answered with a non-success status
    #[error("Object store rejected upload with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Object store client error: {0}")]
    Client(String),
}
