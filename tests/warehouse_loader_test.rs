//! Load job submission and polling

use jobscrape::warehouse::{BigQueryJobs, LoadError, LoadJobStatus, WarehouseLoader};
use mockito::Matcher;
use serde_json::json;
use std::time::Duration;

mod common;
use common::ScriptedJobs;

fn loader(jobs: ScriptedJobs) -> WarehouseLoader<ScriptedJobs> {
    WarehouseLoader::new(jobs, "test-project").with_poll_interval(Duration::from_millis(1))
}

#[tokio::test]
async fn test_polls_until_success() {
    let jobs = ScriptedJobs::new(vec![
        LoadJobStatus::Pending,
        LoadJobStatus::Pending,
        LoadJobStatus::Succeeded,
    ]);
    let loader = loader(jobs);

    let handle = loader
        .load("jobs-bucket", "ibm_jobs.csv", "jobs", "listings")
        .await
        .unwrap();

    assert_eq!(handle.status, LoadJobStatus::Succeeded);
    assert_eq!(handle.job_id, "job_1");
}

#[tokio::test]
async fn test_load_job_points_at_uploaded_object() {
    let jobs = ScriptedJobs::new(vec![LoadJobStatus::Succeeded]);
    let loader = WarehouseLoader::new(&jobs, "test-project")
        .with_location("EU")
        .with_poll_interval(Duration::from_millis(1));

    loader
        .load("jobs-bucket", "ibm_jobs.csv", "jobs", "listings")
        .await
        .unwrap();

    let submitted = jobs.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].source_uri, "gs://jobs-bucket/ibm_jobs.csv");
    assert_eq!(submitted[0].project_id, "test-project");
    assert_eq!(submitted[0].dataset, "jobs");
    assert_eq!(submitted[0].table, "listings");
    assert_eq!(submitted[0].location.as_deref(), Some("EU"));
    assert_eq!(jobs.polls(), 1);
}

#[tokio::test]
async fn test_failed_job_is_job_failed() {
    let jobs = ScriptedJobs::new(vec![
        LoadJobStatus::Pending,
        LoadJobStatus::Failed("invalid: CSV table references column position 5".to_string()),
    ]);

    let err = loader(jobs)
        .load("jobs-bucket", "ibm_jobs.csv", "jobs", "listings")
        .await
        .unwrap_err();

    match err {
        LoadError::JobFailed { job_id, reason } => {
            assert_eq!(job_id, "job_1");
            assert!(reason.contains("column position 5"));
        }
        other => panic!("expected JobFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_max_wait_gives_up_with_wait_error() {
    // Never leaves the pending state
    let jobs = ScriptedJobs::new(Vec::new());
    let loader = loader(jobs).with_max_wait(Duration::from_millis(20));

    let err = loader
        .load("jobs-bucket", "ibm_jobs.csv", "jobs", "listings")
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::Wait(_)));
}

#[tokio::test]
async fn test_bigquery_submit_and_poll() {
    let mut server = mockito::Server::new_async().await;

    let insert = server
        .mock("POST", "/bigquery/v2/projects/test-project/jobs")
        .match_header("authorization", "Bearer token")
        .match_body(Matcher::PartialJson(json!({
            "jobReference": { "projectId": "test-project", "location": "US" },
            "configuration": {
                "load": {
                    "sourceUris": ["gs://jobs-bucket/ibm_jobs.csv"],
                    "destinationTable": {
                        "projectId": "test-project",
                        "datasetId": "jobs",
                        "tableId": "listings"
                    },
                    "sourceFormat": "CSV",
                    "fieldDelimiter": ",",
                    "skipLeadingRows": 1,
                    "writeDisposition": "WRITE_APPEND"
                }
            }
        })))
        .with_status(200)
        .with_body(
            json!({
                "jobReference": {
                    "projectId": "test-project",
                    "jobId": "job_abc",
                    "location": "US"
                },
                "status": { "state": "RUNNING" }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let poll = server
        .mock("GET", "/bigquery/v2/projects/test-project/jobs/job_abc")
        .match_query(Matcher::UrlEncoded("location".into(), "US".into()))
        .match_header("authorization", "Bearer token")
        .with_status(200)
        .with_body(json!({ "status": { "state": "DONE" } }).to_string())
        .create_async()
        .await;

    let jobs = BigQueryJobs::new(server.url(), "token").unwrap();
    let loader = WarehouseLoader::new(jobs, "test-project")
        .with_location("US")
        .with_poll_interval(Duration::from_millis(1));

    let handle = loader
        .load("jobs-bucket", "ibm_jobs.csv", "jobs", "listings")
        .await
        .unwrap();

    assert_eq!(handle.job_id, "job_abc");
    assert_eq!(handle.status, LoadJobStatus::Succeeded);
    insert.assert_async().await;
    poll.assert_async().await;
}

#[tokio::test]
async fn test_bigquery_error_result_is_job_failed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/bigquery/v2/projects/test-project/jobs")
        .with_status(200)
        .with_body(
            json!({
                "jobReference": { "projectId": "test-project", "jobId": "job_bad" },
                "status": { "state": "PENDING" }
            })
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", "/bigquery/v2/projects/test-project/jobs/job_bad")
        .with_status(200)
        .with_body(
            json!({
                "status": {
                    "state": "DONE",
                    "errorResult": { "reason": "invalid", "message": "Error while reading data" }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let jobs = BigQueryJobs::new(server.url(), "token").unwrap();
    let err = WarehouseLoader::new(jobs, "test-project")
        .with_poll_interval(Duration::from_millis(1))
        .load("jobs-bucket", "ibm_jobs.csv", "jobs", "listings")
        .await
        .unwrap_err();

    match err {
        LoadError::JobFailed { job_id, reason } => {
            assert_eq!(job_id, "job_bad");
            assert_eq!(reason, "invalid: Error while reading data");
        }
        other => panic!("expected JobFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bigquery_rejected_submission_is_submit_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/bigquery/v2/projects/test-project/jobs")
        .with_status(404)
        .with_body(r#"{"error":{"message":"Not found: Dataset test-project:jobs"}}"#)
        .create_async()
        .await;

    let jobs = BigQueryJobs::new(server.url(), "token").unwrap();
    let err = WarehouseLoader::new(jobs, "test-project")
        .load("jobs-bucket", "ibm_jobs.csv", "jobs", "listings")
        .await
        .unwrap_err();

    match err {
        LoadError::Submit(message) => assert!(message.contains("404")),
        other => panic!("expected Submit, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bigquery_poll_failure_is_wait_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/bigquery/v2/projects/test-project/jobs")
        .with_status(200)
        .with_body(
            json!({
                "jobReference": { "projectId": "test-project", "jobId": "job_x" },
                "status": { "state": "RUNNING" }
            })
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", "/bigquery/v2/projects/test-project/jobs/job_x")
        .with_status(500)
        .with_body("backend error")
        .create_async()
        .await;

    let jobs = BigQueryJobs::new(server.url(), "token").unwrap();
    let err = WarehouseLoader::new(jobs, "test-project")
        .with_poll_interval(Duration::from_millis(1))
        .load("jobs-bucket", "ibm_jobs.csv", "jobs", "listings")
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::Wait(_)));
}
