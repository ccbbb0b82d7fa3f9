//! End-to-end tests of the `hlt` binary against local mock servers
//!
//! Runs are kept short (a few VUs for about two seconds) so the suite stays
//! fast while still exercising the real client, scheduler, report and exit
//! code paths.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::process::{Command, Output};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

const CONFIG_VARS: &[&str] = &[
    "TARGET_URL",
    "DURATION",
    "VUS",
    "THINK_TIME",
    "THRESHOLDS",
    "TIMEOUT",
    "GRACEFUL_STOP",
    "ENABLE_COLOR",
];

async fn server_responding(status: u16, delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status).set_body_string("ok").set_delay(delay))
        .mount(&server)
        .await;
    server
}

/// Short scenario against `url`, run off the async runtime so the mock server keeps serving
async fn run_hlt(dir: &TempDir, url: &str, extra: &[&str]) -> Output {
    let mut cmd = Command::cargo_bin("hlt").unwrap();
    cmd.current_dir(dir.path())
        .env("NO_COLOR", "1")
        .args(["--url", url, "--vus", "3", "--duration", "2s", "--think-time", "500ms", "--timeout", "1s"])
        .args(extra);
    for var in CONFIG_VARS {
        cmd.env_remove(var);
    }

    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn parse_report(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be a JSON report")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_passing_run_exits_zero() {
    let dir = TempDir::new().unwrap();
    let server = server_responding(200, Duration::ZERO).await;

    run_hlt(&dir, &server.uri(), &[])
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("scenario: 3 VUs for 2s, 500ms think time"))
        .stdout(predicate::str::contains("✓ http_req_failed: rate<0.001"))
        .stdout(predicate::str::contains("✓ http_req_duration: p(95)<150"))
        .stdout(predicate::str::contains("RESULT: PASSED"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_server_errors_exit_99() {
    let dir = TempDir::new().unwrap();
    let server = server_responding(500, Duration::ZERO).await;

    run_hlt(&dir, &server.uri(), &[])
        .await
        .assert()
        .code(99)
        .stdout(predicate::str::contains("✗ http_req_failed: rate<0.001"))
        .stdout(predicate::str::contains("RESULT: FAILED (1 of 2 thresholds breached)"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_server_breaches_latency_threshold() {
    let dir = TempDir::new().unwrap();
    let server = server_responding(200, Duration::from_millis(200)).await;

    let output = run_hlt(&dir, &server.uri(), &["--output", "json"]).await;
    output.clone().assert().code(99);

    let report = parse_report(&output);
    assert_eq!(report["passed"], false);
    let failed: Vec<&str> = report["thresholds"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|t| t["passed"] == false)
        .map(|t| t["expression"].as_str().unwrap())
        .collect();
    assert_eq!(failed, vec!["p(95)<150"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_json_report_contents() {
    let dir = TempDir::new().unwrap();
    let server = server_responding(200, Duration::ZERO).await;

    let output = run_hlt(&dir, &server.uri(), &["--output", "json"]).await;
    output.clone().assert().success();

    let report = parse_report(&output);
    let requests = report["metrics"]["http_reqs"]["count"].as_u64().unwrap();
    // 3 VUs, one request every ~500ms for 2s
    assert!((9..=15).contains(&requests), "unexpected request count {}", requests);
    assert_eq!(report["metrics"]["http_req_failed"]["rate"], 0.0);
    assert_eq!(report["metrics"]["status_codes"]["200"].as_u64(), Some(requests));
    assert!(report["peak_vus"].as_u64().unwrap() <= 3);
    assert_eq!(report["interrupted"], false);
    assert_eq!(report["duration"], "2s");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_custom_threshold_can_fail_on_request_count() {
    let dir = TempDir::new().unwrap();
    let server = server_responding(200, Duration::ZERO).await;

    run_hlt(&dir, &server.uri(), &["--threshold", "http_reqs=count>1000"])
        .await
        .assert()
        .code(99)
        .stdout(predicate::str::contains("✗ http_reqs: count>1000"))
        .stdout(predicate::str::contains("http_req_duration: p(95)").not());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_summary_export() {
    let dir = TempDir::new().unwrap();
    let server = server_responding(200, Duration::ZERO).await;

    run_hlt(&dir, &server.uri(), &["--summary-export", "summary.json"])
        .await
        .assert()
        .success();

    let exported: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("summary.json")).unwrap()).unwrap();
    assert_eq!(exported["passed"], true);
    assert_eq!(exported["thresholds"].as_array().unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_summary_export_failure_exits_5() {
    let dir = TempDir::new().unwrap();
    let server = server_responding(200, Duration::ZERO).await;

    run_hlt(&dir, &server.uri(), &["--summary-export", "missing/dir/summary.json"])
        .await
        .assert()
        .code(5)
        .stdout(predicate::str::contains("RESULT: PASSED"))
        .stderr(predicate::str::contains("summary.json"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unreachable_target_counts_failures() {
    let dir = TempDir::new().unwrap();
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let output = run_hlt(&dir, &format!("http://127.0.0.1:{}/", port), &["--output", "json"]).await;
    output.clone().assert().code(99);

    let report = parse_report(&output);
    assert_eq!(report["metrics"]["http_req_failed"]["rate"], 1.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_debug_logs_go_to_stderr() {
    let dir = TempDir::new().unwrap();
    let server = server_responding(200, Duration::ZERO).await;

    let output = run_hlt(&dir, &server.uri(), &["--output", "json", "--debug"]).await;
    output.clone()
        .assert()
        .success()
        .stderr(predicate::str::contains("GET -> 200"));

    // stdout must still be a single clean JSON document
    parse_report(&output);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_scenario_file_drives_the_run() {
    let dir = TempDir::new().unwrap();
    let server = server_responding(200, Duration::ZERO).await;
    std::fs::write(
        dir.path().join("scenario.json"),
        format!(
            r#"{{"url": "{}", "vus": 2, "duration": "1s", "think_time": "250ms", "thresholds": {{"iterations": ["count>0"]}}}}"#,
            server.uri()
        ),
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("hlt").unwrap();
    cmd.current_dir(dir.path())
        .args(["--config", "scenario.json", "--output", "json"]);
    for var in CONFIG_VARS {
        cmd.env_remove(var);
    }
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap()).await.unwrap();

    output.clone().assert().success();
    let report = parse_report(&output);
    assert_eq!(report["vus"], 2);
    assert_eq!(report["thresholds"][0]["metric"], "iterations");
}
