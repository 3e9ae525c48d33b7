use thiserror::Error;

/// Warehouse load failures. Each kind is fatal and not retried.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The load job could not be created
    #[error("Failed to submit load job: {0}")]
    Submit(String),

    /// Polling failed or the job did not finish in time
    #[error("Failed while waiting for load job: {0}")]
    Wait(String),

    /// The job finished with an error result
    #[error("Load job {job_id} failed: {reason}")]
    JobFailed { job_id: String, reason: String },

    #[error("Warehouse client error: {0}")]
    Client(String),
}
