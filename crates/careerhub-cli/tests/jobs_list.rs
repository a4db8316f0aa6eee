//! Integration tests for `careerhub jobs` against a mock portal.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn temp_home() -> TempDir {
    TempDir::new().expect("create temp careerhub home")
}

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn postings() -> Value {
    json!([
        {
            "_id": "1",
            "title": "Backend Engineer",
            "companyName": "Acme",
            "jobLocation": "Bengaluru",
            "floatedBy": "Placement Cell",
            "category": 0,
            "eligibleBatch": [24, 25],
            "stipend": 90000,
            "startDate": "2025-07-01T00:00:00Z",
            "createdAt": "2025-01-10T00:00:00Z"
        },
        {
            "_id": "2",
            "title": "ML Intern",
            "companyName": "Globex",
            "category": 1,
            "eligibleBatch": [26],
            "stipend": 30000,
            "startDate": "2025-05-15T00:00:00Z",
            "createdAt": "2025-02-01T00:00:00Z"
        },
        {
            "_id": "3",
            "title": "Frontend Intern",
            "companyName": "Initech",
            "category": 1,
            "eligibleBatch": [25, 26],
            "stipend": 45000,
            "startDate": "2025-06-01T00:00:00Z",
            "createdAt": "2025-02-05T00:00:00Z"
        }
    ])
}

async fn mock_portal(status: u16, body: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/job/getAll"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_jobs_prints_table() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = mock_portal(200, postings()).await;

    cargo_bin_cmd!("careerhub")
        .env("CAREERHUB_HOME", home.path())
        .args(["--api-url", &server.uri(), "jobs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backend Engineer"))
        .stdout(predicate::str::contains("Globex"))
        .stdout(predicate::str::contains("Internship"))
        .stdout(predicate::str::contains("15/05/2025"));
}

#[tokio::test]
async fn test_jobs_filters_and_sorts_json() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = mock_portal(200, postings()).await;

    let output = cargo_bin_cmd!("careerhub")
        .env("CAREERHUB_HOME", home.path())
        .args([
            "--api-url",
            &server.uri(),
            "jobs",
            "--internships",
            "--batch",
            "2026",
            "--sort",
            "stipend",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let jobs: Value = serde_json::from_slice(&output.stdout).unwrap();
    let titles: Vec<&str> = jobs
        .as_array()
        .unwrap()
        .iter()
        .map(|job| job["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Frontend Intern", "ML Intern"]);
}

#[tokio::test]
async fn test_jobs_recent_sort_orders_by_start_date() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = mock_portal(200, postings()).await;

    let output = cargo_bin_cmd!("careerhub")
        .env("CAREERHUB_HOME", home.path())
        .args(["--api-url", &server.uri(), "jobs", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let jobs: Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = jobs
        .as_array()
        .unwrap()
        .iter()
        .map(|job| job["_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["2", "3", "1"]);
}

#[tokio::test]
async fn test_jobs_without_match_prints_no_match() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = mock_portal(200, postings()).await;

    cargo_bin_cmd!("careerhub")
        .env("CAREERHUB_HOME", home.path())
        .args(["--api-url", &server.uri(), "jobs", "--jobs", "--batch", "22"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No Match Found"));
}

#[tokio::test]
async fn test_jobs_reports_server_error() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = mock_portal(500, json!({ "msg": "database offline" })).await;

    cargo_bin_cmd!("careerhub")
        .env("CAREERHUB_HOME", home.path())
        .args(["--api-url", &server.uri(), "jobs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fetch postings from"))
        .stderr(predicate::str::contains("database offline"));
}

#[test]
fn test_jobs_rejects_unknown_batch() {
    let home = temp_home();

    cargo_bin_cmd!("careerhub")
        .env("CAREERHUB_HOME", home.path())
        .args(["--api-url", "http://127.0.0.1:9", "jobs", "--batch", "2030"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown batch: 2030"));
}

#[tokio::test]
async fn test_jobs_keeps_postings_next_to_malformed_one() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let mut body = postings();
    let entries = body.as_array_mut().unwrap();
    entries.truncate(2);
    entries[1].as_object_mut().unwrap().remove("startDate");
    let server = mock_portal(200, body).await;

    let output = cargo_bin_cmd!("careerhub")
        .env("CAREERHUB_HOME", home.path())
        .args(["--api-url", &server.uri(), "jobs", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let jobs: Value = serde_json::from_slice(&output.stdout).unwrap();
    let jobs = jobs.as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["_id"], "1");
}
