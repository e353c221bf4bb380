//! Integration tests for the harvester
//!
//! These tests use wiremock to serve a miniature catalog site and run the
//! full crawl → export → process cycle end-to-end.

use std::sync::Arc;
use tempfile::TempDir;
use textbook_harvest::config::Config;
use textbook_harvest::crawler::{harvest, Coordinator, ShutdownOutcome};
use textbook_harvest::output::{load_records, JsonLinesReporter, MemoryReporter};
use textbook_harvest::{CrawlPhase, HarvestError, TextbookRecord};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(server_uri: &str, dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.crawler.root_url = format!("{}/city/", server_uri);
    config.crawler.base_url = server_uri.to_string();
    config.crawler.worker_count = 3;
    config.crawler.district_delay_ms = 5; // Very short for testing
    config.crawler.shutdown_grace_secs = 1;
    config.crawler.shutdown_force_secs = 1;
    config.output.raw_csv_path = dir.path().join("raw.csv").display().to_string();
    config.output.processed_csv_path = Some(dir.path().join("processed.csv").display().to_string());
    config.output.error_log_path = dir.path().join("error_logs.txt").display().to_string();
    config
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

fn district_list(entries: &[(&str, &str)]) -> String {
    let items: String = entries
        .iter()
        .map(|(href, name)| format!(r#"<li><a href="{}">{}</a></li>"#, href, name))
        .collect();
    format!(
        r#"<html><body><div class="Districtlist"><ul>
            <li><a href="/all">所有</a></li>{}
        </ul></div></body></html>"#,
        items
    )
}

fn grade_group(grade: &str, entries: &[(&str, &str, &str)]) -> String {
    let items: String = entries
        .iter()
        .map(|(version, title, href)| {
            format!(
                r#"<li><i>{}</i><a class="ih3" href="{}">{}</a></li>"#,
                version, href, title
            )
        })
        .collect();
    format!(
        r#"<div class="i_d"><h3>{}</h3><div class="divlist"><ul>{}</ul></div></div>"#,
        grade, items
    )
}

#[tokio::test]
async fn test_single_city_end_to_end() {
    let server = MockServer::start().await;
    let uri = server.uri();

    mount_page(
        &server,
        "/city/",
        r#"<html><body><div id="citylist"><b>北京</b><a href="/city/beijing">北京市</a></div></body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/city/beijing",
        &district_list(&[("/city/beijing/haidian", "海淀区")]),
    )
    .await;
    mount_page(
        &server,
        "/city/beijing/haidian",
        &format!(
            "<html><body>{}</body></html>",
            grade_group("一年级", &[("人教版", "语文", "/book/1")])
        ),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&uri, &dir);
    let reporter = Arc::new(MemoryReporter::new());

    let summary = harvest(config, reporter.clone()).await.expect("Harvest failed");

    assert_eq!(
        summary.processed,
        vec![TextbookRecord {
            province: "北京".to_string(),
            city: "北京市".to_string(),
            district: "海淀区".to_string(),
            grade: "一年级".to_string(),
            subject: "语文".to_string(),
            version: "人教版".to_string(),
            book_url: format!("{}/city/beijing/book/1", uri),
        }]
    );
    assert_eq!(summary.statistics.total_records, 1);
    assert_eq!(summary.statistics.province_count, 1);
    assert!(reporter.entries().is_empty());

    // Raw and processed exports are both written
    let raw = load_records(&dir.path().join("raw.csv")).unwrap();
    assert_eq!(raw.len(), 1);
    let processed = std::fs::read_to_string(dir.path().join("processed.csv")).unwrap();
    assert!(processed.starts_with("省,市,区/县,年级,科目,版本,课本链接\n"));
}

#[tokio::test]
async fn test_failed_city_leaves_other_cities_intact() {
    let server = MockServer::start().await;
    let uri = server.uri();

    mount_page(
        &server,
        "/city/",
        r#"<div id="citylist">
            <b>江苏</b>
            <a href="/c/nanjing">南京市</a>
            <a href="/c/suzhou">苏州市</a>
            <b>浙江</b>
            <a href="/c/hangzhou">杭州市</a>
        </div>"#,
    )
    .await;

    // 苏州 is down
    Mock::given(method("GET"))
        .and(path("/c/suzhou"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    mount_page(
        &server,
        "/c/nanjing",
        &district_list(&[("/d/xuanwu", "玄武区"), ("/d/gulou", "鼓楼区")]),
    )
    .await;
    mount_page(
        &server,
        "/c/hangzhou",
        &district_list(&[("/d/xihu", "西湖区")]),
    )
    .await;

    mount_page(
        &server,
        "/d/xuanwu",
        &format!(
            "{}{}",
            grade_group("高一", &[("苏教版", "数学", "/b/1")]),
            grade_group("一年级", &[("人教版", "语文", "/b/2")])
        ),
    )
    .await;
    mount_page(
        &server,
        "/d/gulou",
        &grade_group("一年级", &[("人教版", "语文", "/b/3")]),
    )
    .await;
    mount_page(
        &server,
        "/d/xihu",
        &grade_group("七年级", &[("浙教版", "科学", "http://cdn.example.com/b/4")]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&uri, &dir);
    let reporter = Arc::new(MemoryReporter::new());

    let summary = harvest(config, reporter.clone()).await.expect("Harvest failed");

    assert_eq!(summary.crawl.cities_found, 3);
    assert_eq!(summary.crawl.cities_failed, 1);
    assert_eq!(summary.crawl.districts_visited, 3);
    assert_eq!(summary.crawl.records_collected, 4);
    assert_eq!(summary.crawl.records.len(), 4);
    assert_eq!(summary.shutdown, ShutdownOutcome::Graceful);

    assert!(summary.processed.iter().all(|r| r.city != "苏州市"));
    let order: Vec<_> = summary
        .processed
        .iter()
        .map(|r| (r.city.as_str(), r.grade.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("南京市", "一年级"),
            ("南京市", "一年级"),
            ("南京市", "高一"),
            ("杭州市", "七年级"),
        ]
    );
    assert_eq!(summary.statistics.province_count, 2);

    let entries = reporter.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "Failed to process city: 苏州市");
    assert_eq!(entries[0].exception, "FetchError::Status");
}

#[tokio::test]
async fn test_unreachable_root_aborts_without_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/city/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir);
    let error_log = dir.path().join("error_logs.txt");
    let reporter = Arc::new(JsonLinesReporter::new(&error_log));

    let result = harvest(config, reporter).await;

    assert!(matches!(result, Err(HarvestError::RootUnreachable { .. })));
    assert!(!dir.path().join("raw.csv").exists());
    assert!(!dir.path().join("processed.csv").exists());

    let log = std::fs::read_to_string(&error_log).unwrap();
    let entry: serde_json::Value = serde_json::from_str(log.lines().next().unwrap()).unwrap();
    assert_eq!(entry["exception"], "RootUnreachable");
}

#[tokio::test]
async fn test_duplicates_across_districts_are_collapsed() {
    let server = MockServer::start().await;
    let uri = server.uri();

    mount_page(
        &server,
        "/city/",
        r#"<div id="citylist"><b>上海</b><a href="/c/sh">上海市</a></div>"#,
    )
    .await;
    mount_page(
        &server,
        "/c/sh",
        &district_list(&[("/d/pd", "浦东新区"), ("/d/pd2", "浦东新区")]),
    )
    .await;
    mount_page(
        &server,
        "/d/pd",
        &grade_group("二年级", &[("沪教版", "英语", "/b/first")]),
    )
    .await;
    mount_page(
        &server,
        "/d/pd2",
        &grade_group("二年级", &[("沪教版", "英语", "/b/second")]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&uri, &dir);
    let summary = harvest(config, Arc::new(MemoryReporter::new()))
        .await
        .expect("Harvest failed");

    // Raw export keeps both, processed keeps the first seen
    assert_eq!(summary.crawl.records.len(), 2);
    assert_eq!(summary.processed.len(), 1);
    assert_eq!(summary.processed[0].book_url, format!("{}/c/sh/b/first", uri));
}

#[tokio::test]
async fn test_coordinator_reaches_done() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/city/",
        r#"<div id="citylist"><b>天津</b><a href="/c/tj">天津市</a></div>"#,
    )
    .await;
    mount_page(&server, "/c/tj", "<html><body>no districts</body></html>").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir);
    let mut coordinator =
        Coordinator::new(config, Arc::new(MemoryReporter::new())).expect("Failed to create coordinator");

    let report = coordinator.run().await.expect("Crawl failed");
    assert_eq!(coordinator.phase(), CrawlPhase::Done);
    assert_eq!(report.cities_found, 1);
    assert_eq!(report.cities_failed, 0);
    assert!(report.records.is_empty());
    assert!(dir.path().join("raw.csv").exists());

    coordinator.shutdown().await;
}
