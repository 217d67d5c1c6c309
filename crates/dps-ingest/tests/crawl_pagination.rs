//! End-to-end crawl tests against a simulated paginated server

use dps_common::files::numbered_files;
use dps_ingest::client::{FetchRequest, PageFetcher};
use dps_ingest::config::CrawlConfig;
use dps_ingest::sources;
use dps_ingest::{crawl_source_until, HttpFetcher};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOST_PATH: &str = "/webapi/nb/SpeciesHost/list/concat";

fn test_config(server: &MockServer, dir: &TempDir, batch_size: usize) -> CrawlConfig {
    CrawlConfig {
        base_url: server.uri(),
        data_dir: dir.path().join("data"),
        cleaned_dir: dir.path().join("cleaned"),
        concurrency: 4,
        batch_size,
        request_timeout_secs: 5,
        ..CrawlConfig::default()
    }
}

fn write_species_ids(config: &CrawlConfig, ids: &[&str]) {
    let dir = config.species_id_dir();
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("species_ids_1.json"), json!(ids).to_string()).unwrap();
}

fn host_page(seed: &str, page: u64, total: u64) -> Value {
    json!({
        "content": [
            {"rowid": page * 10 + 1, "HOST_NAME": format!("{}-{}-a", seed, page), "Icodes": [{"ICodeID": 7}]},
            {"rowid": page * 10 + 2, "HOST_NAME": format!("{}-{}-b", seed, page)}
        ],
        "paging": {"pagenum": page, "totalpage": total, "pagecount": 5000}
    })
}

fn batch_sizes(dir: &Path, prefix: &str) -> Vec<usize> {
    numbered_files(dir, prefix, "json")
        .unwrap()
        .iter()
        .map(|f| {
            let items: Vec<Value> = serde_json::from_slice(&std::fs::read(&f.path).unwrap()).unwrap();
            items.len()
        })
        .collect()
}

async fn mount_host_page(server: &MockServer, seed: &str, page: u64, total: u64) {
    Mock::given(method("POST"))
        .and(path(HOST_PATH))
        .and(body_string_contains(format!("SC_GUID={}", seed)))
        .and(body_string_contains(format!("paging%5Bpagenum%5D={}", page)))
        .respond_with(ResponseTemplate::new(200).set_body_json(host_page(seed, page, total)))
        .mount(server)
        .await;
}

fn never() -> std::future::Pending<()> {
    std::future::pending()
}

#[tokio::test]
async fn three_seeds_two_pages_fill_three_batches() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, &dir, 5);
    write_species_ids(&config, &["seed-1", "seed-2", "seed-3"]);

    for seed in ["seed-1", "seed-2", "seed-3"] {
        mount_host_page(&server, seed, 1, 2).await;
        mount_host_page(&server, seed, 2, 2).await;
    }

    let fetcher = Arc::new(HttpFetcher::new(&config).unwrap());
    let summary = crawl_source_until(&sources::SPECIES_HOST, &config, fetcher, never())
        .await
        .unwrap();

    assert_eq!(summary.seeds, 3);
    assert_eq!(summary.completed, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.records, 12);
    assert!(!summary.interrupted);
    assert_eq!(server.received_requests().await.unwrap().len(), 6);

    let out = config.source_dir("species_host");
    assert_eq!(batch_sizes(&out, "species_host_batch"), vec![5, 5, 2]);

    let first: Vec<Value> =
        serde_json::from_slice(&std::fs::read(out.join("species_host_batch_1.json")).unwrap()).unwrap();
    let record = &first[0];
    let keys: Vec<&String> = record.as_object().unwrap().keys().collect();
    assert_eq!(keys[0], "species_id");
    assert_eq!(keys[1], "rowid");
    assert!(record["Icodes"].is_array());
}

#[tokio::test]
async fn single_page_issues_no_further_requests() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, &dir, 100);

    Mock::given(method("POST"))
        .and(path("/webapi/nb/SpeciesCode/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"TP_GUID": "g1", "SCName": "松材线虫"}, {"TP_GUID": "g2"}],
            "paging": {"pagenum": "1", "totalpage": "1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = Arc::new(HttpFetcher::new(&config).unwrap());
    let summary = crawl_source_until(&sources::PESTS, &config, fetcher, never())
        .await
        .unwrap();

    assert_eq!(summary.records, 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);

    let text = std::fs::read_to_string(config.source_dir("pests").join("pests_batch_1.json")).unwrap();
    assert!(text.contains("松材线虫"));
}

#[tokio::test]
async fn zero_total_pages_emits_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, &dir, 100);

    Mock::given(method("POST"))
        .and(path("/webapi/nb/SpeciesCode/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [],
            "paging": {"pagenum": 1, "totalpage": 0}
        })))
        .mount(&server)
        .await;

    let fetcher = Arc::new(HttpFetcher::new(&config).unwrap());
    let summary = crawl_source_until(&sources::PESTS, &config, fetcher, never())
        .await
        .unwrap();

    assert_eq!(summary.records, 0);
    assert_eq!(summary.completed, 1);
    assert!(summary.batch.files.is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_body_stops_only_that_seed() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, &dir, 100);
    write_species_ids(&config, &["good-1", "bad", "broken", "good-2"]);

    mount_host_page(&server, "good-1", 1, 1).await;
    mount_host_page(&server, "good-2", 1, 1).await;
    Mock::given(method("POST"))
        .and(path(HOST_PATH))
        .and(body_string_contains("SC_GUID=bad"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(HOST_PATH))
        .and(body_string_contains("SC_GUID=broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = Arc::new(HttpFetcher::new(&config).unwrap());
    let summary = crawl_source_until(&sources::SPECIES_HOST, &config, fetcher, never())
        .await
        .unwrap();

    assert_eq!(summary.completed, 2);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.records, 4);
    // No retries: one request per seed
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
}

#[tokio::test]
async fn detail_sources_fetch_once_per_seed() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, &dir, 100);
    write_species_ids(&config, &["g1"]);

    Mock::given(method("GET"))
        .and(path("/webapi/nb/home/code/detail/g1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "TP_GUID": "g1",
            "SSNameSci": "Bursaphelenchus xylophilus",
            "ym": [{"SONType": "拉丁异名", "SOtherNameSci": "Aphelenchoides xylophilus"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/webapi/nb/SpeciesCode/ParentList/Bursaphelenchus%20xylophilus"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"SSNameSci": "Bursaphelenchus", "SLevel": "属"},
            {"SSNameSci": "Aphelenchoididae", "SLevel": "科"}
        ])))
        .mount(&server)
        .await;

    let fetcher = Arc::new(HttpFetcher::new(&config).unwrap());
    let meta = crawl_source_until(&sources::META, &config, fetcher.clone(), never())
        .await
        .unwrap();
    assert_eq!(meta.records, 1);

    let parents = crawl_source_until(&sources::SPECIES_PARENT, &config, fetcher, never())
        .await
        .unwrap();
    assert_eq!(parents.records, 2);

    let batch: Vec<Value> = serde_json::from_slice(
        &std::fs::read(config.source_dir("species_parent").join("species_parent_batch_1.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(batch[0]["species_SSNameSci"], "Bursaphelenchus xylophilus");
    assert_eq!(batch[0]["species_TP_GUID"], "g1");
    assert_eq!(batch[1]["SLevel"], "科");
}

/// Serves page 1 of every seed and never answers page 2
struct StallingFetcher;

#[async_trait::async_trait]
impl PageFetcher for StallingFetcher {
    async fn fetch(&self, request: &FetchRequest) -> dps_common::Result<String> {
        let seed = request.form_value("SC_GUID").unwrap_or_default().to_string();
        if request.form_value("paging[pagenum]") == Some("1") {
            return Ok(host_page(&seed, 1, 2).to_string());
        }
        std::future::pending().await
    }
}

#[tokio::test]
async fn shutdown_flushes_buffered_records() {
    let dir = TempDir::new().unwrap();
    let config = CrawlConfig {
        data_dir: dir.path().join("data"),
        batch_size: 100,
        ..CrawlConfig::default()
    };
    write_species_ids(&config, &["s1", "s2", "s3"]);

    let summary = crawl_source_until(
        &sources::SPECIES_HOST,
        &config,
        Arc::new(StallingFetcher),
        tokio::time::sleep(Duration::from_millis(200)),
    )
    .await
    .unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.completed, 0);
    assert_eq!(summary.batch.records_written, 6);
    assert_eq!(batch_sizes(&config.source_dir("species_host"), "species_host_batch"), vec![6]);
}

#[tokio::test]
async fn missing_seed_files_are_an_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, &dir, 10);

    let fetcher = Arc::new(HttpFetcher::new(&config).unwrap());
    let result = crawl_source_until(&sources::SPECIES_HOST, &config, fetcher, never()).await;
    assert!(result.is_err());
}
