//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use route_trawler::config::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use route_trawler::crawler::{crawl, Coordinator};
use route_trawler::render::HttpRenderer;
use route_trawler::state::{SessionState, VisitOutcome};
use route_trawler::storage::FsSink;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing captures below `capture_dir`
fn create_test_config(capture_dir: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            pacing_ms: 5, // Very short for testing
            navigation_timeout_secs: 5,
            ..CrawlerConfig::default()
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            mobile: false,
        },
        output: OutputConfig {
            capture_dir: capture_dir.display().to_string(),
            report_path: None,
        },
        ..Config::default()
    }
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
        .mount(server)
        .await;
}

/// Host and port of the mock server as they appear in capture keys
fn key_prefix(server: &MockServer) -> String {
    server
        .uri()
        .trim_start_matches("http://")
        .replace(':', "_")
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(
        &mock_server,
        "/",
        r#"<html><head><title>Home</title></head><body>
            <a href="/about">About</a>
            <a href="/blog">Blog</a>
            <a href="https://elsewhere.test/">External</a>
        </body></html>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/about",
        r#"<html><body><a href="/">Home</a><a href="/team">Team</a></body></html>"#,
    )
    .await;
    mount_page(&mock_server, "/team", "<html><body>Team</body></html>").await;
    mount_page(
        &mock_server,
        "/blog",
        r#"<html><body><a href="/about">About</a></body></html>"#,
    )
    .await;

    let config = create_test_config(dir.path());
    let seed = format!("{}/", mock_server.uri());
    let report = crawl(&config, &seed, CancellationToken::new()).await.unwrap();

    assert_eq!(report.state, SessionState::Complete);
    let base = mock_server.uri();
    assert_eq!(
        report.visit_order(),
        vec![
            format!("{}/", base),
            format!("{}/about", base),
            format!("{}/team", base),
            format!("{}/blog", base),
        ]
    );
    assert_eq!(report.captured_count(), 4);

    // Every page was requested exactly once
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);

    let folder = dir.path().join("127.0.0.1");
    let prefix = key_prefix(&mock_server);
    let home = std::fs::read_to_string(folder.join(format!("{}-.html", prefix))).unwrap();
    assert!(home.contains("<title>Home</title>"));
    assert!(folder.join(format!("{}-about.html", prefix)).exists());
    assert!(folder.join(format!("{}-team.html", prefix)).exists());
}

#[tokio::test]
async fn test_crawl_contains_server_errors() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/broken">Broken</a><a href="/fine">Fine</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/fine", "<html><body>ok</body></html>").await;

    let config = create_test_config(dir.path());
    let seed = format!("{}/", mock_server.uri());
    let report = crawl(&config, &seed, CancellationToken::new()).await.unwrap();

    assert_eq!(report.state, SessionState::Complete);
    assert_eq!(report.visits.len(), 3);
    assert!(matches!(
        report.visits[1].outcome,
        VisitOutcome::RenderFailed(_)
    ));
    assert!(report.visits[2].outcome.is_success());
}

#[tokio::test]
async fn test_crawl_skips_auth_pages() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/login">Log in</a><a href="/about">About</a></body></html>"#,
    )
    .await;
    mount_page(&mock_server, "/about", "<html><body>About</body></html>").await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(dir.path());
    let seed = format!("{}/", mock_server.uri());
    let report = crawl(&config, &seed, CancellationToken::new()).await.unwrap();

    assert_eq!(report.state, SessionState::Complete);
    assert_eq!(report.excluded, vec![format!("{}/login", mock_server.uri())]);
    assert_eq!(report.visits.len(), 2);
}

#[tokio::test]
async fn test_non_html_page_is_contained() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/data.json">Data</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(dir.path());
    let renderer = HttpRenderer::from_config(&config);
    let sink = FsSink::new(dir.path());
    let mut coordinator = Coordinator::from_config(renderer, sink, &config);

    let report = coordinator
        .run(&format!("{}/", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(report.state, SessionState::Complete);
    assert_eq!(report.failed_count(), 1);
    assert!(!coordinator.renderer().is_open());
}

#[tokio::test]
async fn test_off_origin_redirect_links_are_not_followed() {
    let site = MockServer::start().await;
    let elsewhere = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(&site, "/", r#"<html><body><a href="/out">Out</a></body></html>"#).await;
    Mock::given(method("GET"))
        .and(path("/out"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/landing", elsewhere.uri()).as_str()),
        )
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/only-elsewhere"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&site)
        .await;
    mount_page(
        &elsewhere,
        "/landing",
        r#"<html><body><a href="/only-elsewhere">Local to the other site</a></body></html>"#,
    )
    .await;

    let config = create_test_config(dir.path());
    let seed = format!("{}/", site.uri());
    let report = crawl(&config, &seed, CancellationToken::new()).await.unwrap();

    let base = site.uri();
    assert_eq!(report.state, SessionState::Complete);
    assert_eq!(
        report.discovered,
        vec![format!("{}/", base), format!("{}/out", base)]
    );
    assert_eq!(report.visits.len(), 2);
    assert!(report.visits[1].outcome.is_success());
    assert_eq!(report.visits[1].links_found, 0);

    // The redirect target was loaded once and nothing below it
    let requests = elsewhere.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_invalid_seed_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(dir.path());

    let result = crawl(&config, "not-a-url", CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(route_trawler::TrawlerError::InvalidSeed { .. })
    ));
}
