//! Smoke tests for the `dps-ingest` binary

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dps_ingest() -> Command {
    let mut cmd = Command::cargo_bin("dps-ingest").unwrap();
    cmd.env("LOG_OUTPUT", "console").env("LOG_LEVEL", "warn");
    cmd
}

#[test]
fn sources_lists_registry() {
    dps_ingest()
        .arg("sources")
        .assert()
        .success()
        .stdout(predicate::str::contains("species_host"))
        .stdout(predicate::str::contains("file_metadata"));
}

#[test]
fn unknown_source_fails() {
    let dir = TempDir::new().unwrap();
    dps_ingest()
        .args(["crawl", "not_a_source", "--data-dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown source"));
}

#[test]
fn crawl_requires_a_source() {
    dps_ingest().arg("crawl").assert().failure();
}

#[test]
fn extract_ids_writes_seed_files() {
    let dir = TempDir::new().unwrap();
    let pests = dir.path().join("pests");
    std::fs::create_dir_all(&pests).unwrap();
    std::fs::write(
        pests.join("pests_batch_1.json"),
        json!([{"TP_GUID": "a"}, {"TP_GUID": "b"}]).to_string(),
    )
    .unwrap();

    dps_ingest()
        .args(["extract-ids", "--data-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 species ids"));

    assert!(dir.path().join("species_id/species_ids_1.json").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn crawl_all_extracts_ids_and_continues_past_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webapi/nb/SpeciesCode/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"rowid": 1, "TP_GUID": "0b7d1c56-3e2f-4a8b-9c0d-1e2f3a4b5c6d", "SSNameSci": "Bursaphelenchus xylophilus"}],
            "paging": {"pagenum": 1, "totalpage": 1, "pagecount": 5000}
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    dps_ingest()
        .args(["crawl", "--all", "--timeout", "5", "--base-url", &server.uri(), "--data-dir"])
        .arg(&data)
        .arg("--cleaned-dir")
        .arg(dir.path().join("cleaned"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("pests: 1 seeds (0 failed), 1 records in 1 files"))
        .stdout(predicate::str::contains("1 species ids in 1 files"))
        .stdout(predicate::str::contains("meta: 1 seeds (1 failed)"))
        .stdout(predicate::str::contains("issue_code_detail:"))
        .stderr(predicate::str::contains("source(s) failed"))
        .stderr(predicate::str::contains("file_metadata"));

    assert!(data.join("species_id/species_ids_1.json").exists());
}
