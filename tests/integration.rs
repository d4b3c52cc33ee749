//! End-to-end integration tests for the API tester
//!
//! These tests verify the complete harness workflow by:
//! 1. Starting the mock platform binary in a chosen mode
//! 2. Running the tester binary against it
//! 3. Checking the exit status, console report and JSON summary

use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use ml_api_tester::common::parse_listen_address;
use serde_json::Value;

/// A running mock platform, killed on drop
struct MockPlatform {
    child: Child,
    base_url: String,
}

impl MockPlatform {
    fn start(mode: &str) -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_mock-platform"))
            .args(["--mode", mode])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to start mock platform");

        let stdout = child.stdout.take().expect("mock platform has no stdout");
        let mut line = String::new();
        BufReader::new(stdout)
            .read_line(&mut line)
            .expect("Failed to read mock platform address");
        let addr = parse_listen_address(&line)
            .unwrap_or_else(|| panic!("Unexpected mock platform output: {line}"));

        Self {
            child,
            base_url: format!("http://{}", addr),
        }
    }
}

impl Drop for MockPlatform {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Output from a tester run
#[derive(Debug)]
struct TesterOutput {
    stdout: String,
    stderr: String,
    code: Option<i32>,
}

impl TesterOutput {
    fn summary(&self) -> Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not a JSON summary ({e}): {}", self.stdout))
    }
}

fn run_tester(args: &[&str]) -> TesterOutput {
    let output = Command::new(env!("CARGO_BIN_EXE_ml-api-tester"))
        .args(args)
        .env_remove("ML_API_BASE_URL")
        .env_remove("ML_API_LOG_FILE")
        .env("RUST_LOG", "ml_api_tester=info")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to run ml-api-tester");

    TesterOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        code: output.status.code(),
    }
}

fn run_against(platform: &MockPlatform, extra: &[&str]) -> TesterOutput {
    let mut args = vec![
        "run",
        "--base-url",
        platform.base_url.as_str(),
        "--poll-attempts",
        "3",
        "--poll-interval-ms",
        "20",
        "--request-timeout-secs",
        "10",
    ];
    args.extend_from_slice(extra);
    run_tester(&args)
}

fn scenario<'a>(summary: &'a Value, name: &str) -> &'a Value {
    summary["scenarios"]
        .as_array()
        .and_then(|s| s.iter().find(|r| r["scenario"] == name))
        .unwrap_or_else(|| panic!("scenario {name} missing from {summary}"))
}

// ============== Tests ==============

#[test]
fn test_healthy_platform_passes() {
    let platform = MockPlatform::start("healthy");
    let output = run_against(&platform, &[]);

    assert_eq!(output.code, Some(0), "stdout: {}\nstderr: {}", output.stdout, output.stderr);
    assert!(output.stdout.contains("12/12 tests passed"), "{}", output.stdout);
    assert!(output.stdout.contains("Success Rate: 100.0%"));
    assert!(output.stdout.contains("All tests passed!"));
    assert!(output.stdout.contains("Dataset ID: ds-1"));
    assert!(
        output
            .stdout
            .lines()
            .any(|l| l.contains("Columns:") && l.contains("\"species\"")),
        "columns should include the target column: {}",
        output.stdout
    );
    assert!(output.stdout.contains("Content-Length: 30 bytes"));
}

#[test]
fn test_healthy_platform_json_summary() {
    let platform = MockPlatform::start("healthy");
    let output = run_against(&platform, &["--json"]);

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    let summary = output.summary();
    assert_eq!(summary["tests_run"], 12);
    assert_eq!(summary["tests_passed"], 12);
    assert_eq!(summary["success_rate"], 100.0);

    // the console is silent in JSON mode; the per-call trace moves to the log
    assert_eq!(output.stderr.matches("check passed").count(), 12, "{}", output.stderr);
    assert!(output.stderr.contains("api/dataset/upload"));

    let order: Vec<&str> = summary["scenarios"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["scenario"].as_str().unwrap())
        .collect();
    assert_eq!(
        order,
        [
            "api_root",
            "models_list",
            "model_parameters",
            "dataset_upload",
            "dataset_columns",
            "dataset_clean",
            "model_training",
            "training_progress",
            "model_download",
        ]
    );
}

#[test]
fn test_missing_unsupervised_family_is_contract_failure() {
    let platform = MockPlatform::start("no-unsupervised");
    let output = run_against(&platform, &["--json"]);

    assert_eq!(output.code, Some(1));
    let summary = output.summary();
    // every request still returned the expected status
    assert_eq!(summary["tests_run"], summary["tests_passed"]);

    let list = scenario(&summary, "models_list");
    assert_eq!(list["outcome"], "failed");
    assert_eq!(list["failure"]["kind"], "contract");
}

#[test]
fn test_missing_dataset_id_skips_dependent_requests() {
    let platform = MockPlatform::start("no-dataset-id");
    let output = run_against(&platform, &["--json"]);

    assert_eq!(output.code, Some(1));
    let summary = output.summary();
    // root, list, 2 parameter lookups, upload
    assert_eq!(summary["tests_run"], 5);

    assert_eq!(scenario(&summary, "dataset_upload")["failure"]["kind"], "contract");
    for name in [
        "dataset_columns",
        "dataset_clean",
        "model_training",
        "training_progress",
        "model_download",
    ] {
        assert_eq!(scenario(&summary, name)["failure"]["kind"], "precondition", "{name}");
    }
}

#[test]
fn test_slow_training_is_soft_pass() {
    let platform = MockPlatform::start("slow");
    let output = run_against(&platform, &["--json"]);

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    let summary = output.summary();
    // 3 progress checks and a status re-check, no download
    assert_eq!(summary["tests_run"], 12);

    let progress = scenario(&summary, "training_progress");
    assert_eq!(progress["outcome"], "soft_passed");
    assert_eq!(progress["reason"], "timed_out");

    let download = scenario(&summary, "model_download");
    assert_eq!(download["reason"], "not_applicable");
}

#[test]
fn test_slow_training_fails_when_timeout_is_failure() {
    let platform = MockPlatform::start("slow");
    let output = run_against(&platform, &["--json", "--timeout-is-failure"]);

    assert_eq!(output.code, Some(1));
    let summary = output.summary();
    assert_eq!(scenario(&summary, "training_progress")["outcome"], "failed");
}

#[test]
fn test_failed_training_job() {
    let platform = MockPlatform::start("fail-job");
    let output = run_against(&platform, &[]);

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("Training failed: training diverged"), "{}", output.stdout);
    assert!(output.stdout.contains("Some tests failed"));
}

#[test]
fn test_unreachable_platform() {
    let output = run_tester(&[
        "run",
        "--base-url",
        "http://127.0.0.1:1",
        "--request-timeout-secs",
        "5",
        "--json",
    ]);

    assert_eq!(output.code, Some(1));
    let summary = output.summary();
    assert_eq!(summary["tests_run"], 5);
    assert_eq!(summary["tests_passed"], 0);
    assert_eq!(summary["success_rate"], 0.0);
    assert_eq!(scenario(&summary, "api_root")["failure"]["kind"], "transport");
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let output = run_tester(&["run", "--base-url", "not-a-url"]);

    assert_eq!(output.code, Some(1));
    assert!(output.stderr.contains("Configuration error"), "{}", output.stderr);
}

#[test]
fn test_list_scenarios() {
    let output = run_tester(&["list"]);

    assert_eq!(output.code, Some(0));
    let upload = output.stdout.find("Dataset Upload").unwrap();
    let columns = output.stdout.find("Dataset Columns").unwrap();
    let download = output.stdout.find("Model Download").unwrap();
    assert!(upload < columns && columns < download);
    assert!(output.stdout.contains("GET api/model/progress/{job_id}"));
}

#[test]
fn test_log_file_receives_run_logs() {
    let dir = tempfile::tempdir().unwrap();
    let log_path: PathBuf = dir.path().join("tester.log");
    let platform = MockPlatform::start("healthy");

    let output = run_against(
        &platform,
        &["--json", "--log-file", log_path.to_str().unwrap()],
    );

    assert_eq!(output.code, Some(0));
    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("Starting ML platform API tests"), "{log}");
    assert!(log.contains("Finished ML platform API tests"));
}

async fn upload(platform: &MockPlatform, part: reqwest::multipart::Part) -> (u16, Value) {
    let form = reqwest::multipart::Form::new().part("file", part);
    let response = reqwest::Client::new()
        .post(format!("{}/api/dataset/upload", platform.base_url))
        .multipart(form)
        .send()
        .await
        .expect("upload request failed");
    let status = response.status().as_u16();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

const IRIS_HEAD: &str = "sepal_length,sepal_width,petal_length,petal_width,species\n5.1,3.5,1.4,0.2,setosa\n";

#[tokio::test]
async fn test_mock_platform_accepts_chunked_upload() {
    let platform = MockPlatform::start("healthy");
    let chunks = futures_util::stream::iter(vec![
        Ok::<_, std::io::Error>(IRIS_HEAD.as_bytes()[..20].to_vec()),
        Ok(IRIS_HEAD.as_bytes()[20..].to_vec()),
    ]);
    let part = reqwest::multipart::Part::stream(reqwest::Body::wrap_stream(chunks))
        .file_name("test_iris.csv")
        .mime_str("text/csv")
        .unwrap();

    let (status, body) = upload(&platform, part).await;

    assert_eq!(status, 200, "{body}");
    assert_eq!(body["dataset_id"], "ds-1");
    assert_eq!(body["rows"], 1);
}

#[tokio::test]
async fn test_mock_platform_rejects_unexpected_upload() {
    let platform = MockPlatform::start("healthy");

    let wrong_name = reqwest::multipart::Part::text(IRIS_HEAD)
        .file_name("iris.txt")
        .mime_str("text/csv")
        .unwrap();
    let (status, _) = upload(&platform, wrong_name).await;
    assert_eq!(status, 400);

    let wrong_type = reqwest::multipart::Part::text(IRIS_HEAD)
        .file_name("test_iris.csv")
        .mime_str("application/json")
        .unwrap();
    let (status, _) = upload(&platform, wrong_type).await;
    assert_eq!(status, 400);
}
