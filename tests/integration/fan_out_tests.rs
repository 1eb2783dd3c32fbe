//! Integration tests for profile search and feed extraction

use route_trawler::config::{Config, CrawlerConfig, OutputConfig, ProfileEntry};
use route_trawler::crawler::{feed, search};
use route_trawler::output::RunMode;
use route_trawler::state::SessionState;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config(capture_dir: &Path, profiles: Vec<ProfileEntry>) -> Config {
    Config {
        crawler: CrawlerConfig {
            pacing_ms: 5,
            ..CrawlerConfig::default()
        },
        output: OutputConfig {
            capture_dir: capture_dir.display().to_string(),
            report_path: None,
        },
        profiles,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_profile_search_captures_each_profile() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/alpha/jane"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html><body>alpha</body></html>", "text/html"),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/beta/jane/profile"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let profiles = vec![
        ProfileEntry::new("alpha", &format!("{}/alpha/", base)),
        ProfileEntry::new("beta", &format!("{}/beta/{{username}}/profile", base)),
    ];
    let config = create_test_config(dir.path(), profiles);

    let report = search(&config, "jane", CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.mode, RunMode::ProfileSearch);
    assert_eq!(report.state, SessionState::Complete);
    assert_eq!(report.visits.len(), 2);
    assert_eq!(report.captured_count(), 1);

    let captured = dir.path().join("jane").join("alpha.html");
    assert!(std::fs::read_to_string(captured).unwrap().contains("alpha"));
    assert!(!dir.path().join("jane").join("beta.html").exists());
}

#[tokio::test]
async fn test_feed_extracts_media() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><body>
                <img src="/a.jpg">
                <video src="https://cdn.test/b.mp4"></video>
                <img src="/a.jpg">
                <a href="/story">Story</a>
            </body></html>"#,
            "text/html",
        ))
        .mount(&mock_server)
        .await;

    let config = create_test_config(dir.path(), Vec::new());
    let url = format!("{}/feed", mock_server.uri());

    let report = feed(&config, &url, CancellationToken::new()).await.unwrap();

    assert_eq!(report.mode, RunMode::Feed);
    assert_eq!(report.captured_count(), 1);

    let key = report.visits[0].key_path.clone().unwrap();
    let media_file = dir.path().join(format!("{}.media.txt", key));
    let media = std::fs::read_to_string(media_file).unwrap();
    let lines: Vec<_> = media.lines().collect();
    assert_eq!(
        lines,
        vec![
            format!("{}/a.jpg", mock_server.uri()).as_str(),
            "https://cdn.test/b.mp4"
        ]
    );

    // Feed mode never follows links
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}
