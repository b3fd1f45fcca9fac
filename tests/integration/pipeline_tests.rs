//! End-to-end pipeline tests
//!
//! Each test starts a wiremock server standing in for a whole site and runs
//! the coordinator against it with the real reqwest fetcher.

use std::sync::Arc;
use sumi_sift::config::Config;
use sumi_sift::crawler::{Coordinator, HttpFetcher};
use sumi_sift::output::{write_json, SiteResult};
use sumi_sift::platform::Platform;
use sumi_sift::robustness::HostRegistry;
use sumi_sift::{LinkOutcome, RunReport, SiftError};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a configuration with pacing and backoff shrunk for tests
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.network.min_delay_ms = 0;
    config.network.jitter_ms = 0;
    config.network.timeout_secs = 5;
    config.retry.base_delay_ms = 1;
    config.retry.max_delay_ms = 5;
    config.output.save = false;
    config
}

fn article(title: &str) -> String {
    let paragraph = "Writing a longer paragraph here so the extractor sees ordinary prose, \
                     with a few commas, a handful of clauses, and enough words to count.";
    format!(
        r#"<html><head><title>{title}</title></head><body>
        <header><nav><a href="/">Home</a> <a href="/about">About</a></nav></header>
        <article><h1>{title}</h1><p>{p}</p><p>{p}</p><p>{p}</p></article>
        <footer>Copyright</footer>
        </body></html>"#,
        title = title,
        p = paragraph
    )
}

fn sitemap(base: &str, paths: &[String]) -> String {
    let urls: String = paths
        .iter()
        .map(|p| format!("<url><loc>{}{}</loc></url>", base, p))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        urls
    )
}

fn article_paths(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("/posts/article-{}", i)).collect()
}

async fn mount_page(server: &MockServer, page: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn mount_xml(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "application/xml"),
        )
        .mount(server)
        .await;
}

async fn run(config: Config, seed: &str) -> Result<RunReport, SiftError> {
    let fetcher = Arc::new(HttpFetcher::new(&config.network).expect("Failed to build fetcher"));
    let registry = Arc::new(HostRegistry::new(config.circuit_breaker.clone()));
    let coordinator =
        Coordinator::new(config, fetcher, None, registry).expect("Failed to create coordinator");
    coordinator.run(seed).await
}

#[tokio::test]
async fn test_sitemap_site_is_bounded() {
    let server = MockServer::start().await;
    let base = server.uri();
    let paths = article_paths(12);

    mount_page(&server, "/", 200, article("Home")).await;
    mount_xml(&server, "/sitemap.xml", sitemap(&base, &paths)).await;
    for p in &paths {
        mount_page(&server, p, 200, article(p)).await;
    }

    let mut config = create_test_config();
    config.pipeline.max_additional_pages = 5;
    config.pipeline.max_articles = 5;

    let report = run(config, &format!("{}/", base)).await.expect("Run failed");

    assert_eq!(report.statistics.candidates, 6);
    assert!(report.result.items.len() <= 5);
    assert_eq!(report.result.items.len(), 5);
    assert_eq!(report.result.items[0].source_url, format!("{}/", base));
    assert_eq!(
        report.result.items[1].source_url,
        format!("{}/posts/article-1", base)
    );
    for item in &report.result.items {
        assert!(!item.title.is_empty());
        assert!(!item.content.is_empty());
    }
}

#[tokio::test]
async fn test_forbidden_seed_returns_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let seed = format!("{}/", server.uri());
    let report = run(create_test_config(), &seed).await.expect("Run failed");

    assert_eq!(report.result.site, seed);
    assert!(report.result.items.is_empty());
}

#[tokio::test]
async fn test_failing_host_trips_circuit() {
    let server = MockServer::start().await;
    let base = server.uri();
    let paths = article_paths(8);

    mount_page(&server, "/", 200, article("Home")).await;
    mount_xml(&server, "/sitemap.xml", sitemap(&base, &paths)).await;
    Mock::given(method("GET"))
        .and(path_regex("^/posts/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(5)
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.pipeline.max_additional_pages = 8;
    config.pipeline.concurrency = 1;
    config.retry.max_attempts = 1;
    config.circuit_breaker.failure_threshold = 5;

    let report = run(config, &format!("{}/", base)).await.expect("Run failed");

    assert_eq!(report.result.items.len(), 1);
    assert_eq!(report.statistics.count(LinkOutcome::TransientError), 5);
    assert_eq!(report.statistics.count(LinkOutcome::CircuitOpen), 3);
    assert_eq!(report.statistics.open_circuits.len(), 1);
}

#[tokio::test]
async fn test_unreachable_seed_is_setup_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let error = run(create_test_config(), &format!("{}/", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(error, SiftError::SeedUnreachable { .. }));
    assert!(error.is_setup_failure());
}

#[tokio::test]
async fn test_seed_only_run_skips_discovery() {
    let server = MockServer::start().await;

    mount_page(&server, "/", 200, article("Home")).await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.pipeline.max_additional_pages = 0;

    let report = run(config, &format!("{}/", server.uri()))
        .await
        .expect("Run failed");

    assert_eq!(report.statistics.candidates, 1);
    assert_eq!(report.result.items.len(), 1);
}

#[tokio::test]
async fn test_wordpress_sitemap_is_found() {
    let server = MockServer::start().await;
    let base = server.uri();
    let paths = article_paths(3);

    let home = format!(
        r#"<html><head>
        <meta name="generator" content="WordPress 6.4.2">
        <link rel="stylesheet" href="{base}/wp-content/themes/twentytwenty/style.css">
        <title>My Blog</title></head>
        <body><div class="entry-content"><p>Welcome.</p></div></body></html>"#,
        base = base
    );
    mount_page(&server, "/", 200, home).await;
    mount_xml(&server, "/wp-sitemap.xml", sitemap(&base, &paths)).await;
    for p in &paths {
        mount_page(&server, p, 200, article(p)).await;
    }

    let mut config = create_test_config();
    config.pipeline.max_additional_pages = 3;

    let report = run(config, &format!("{}/", base)).await.expect("Run failed");

    let platform = report.statistics.platform.as_ref().map(|fp| fp.platform);
    assert_eq!(platform, Some(Platform::WordPress));
    assert_eq!(report.statistics.candidates, 4);
    assert_eq!(report.result.items.len(), 3);
    assert_eq!(report.statistics.count(LinkOutcome::ExtractionFailed), 1);
}

#[tokio::test]
async fn test_advertised_feed_supplies_links() {
    let server = MockServer::start().await;
    let base = server.uri();

    let home = format!(
        r#"<html><head><title>News</title>
        <link rel="alternate" type="application/rss+xml" href="{base}/custom-feed.xml">
        </head><body><p>Latest stories.</p></body></html>"#,
        base = base
    );
    let feed = format!(
        r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>News</title>
<item><title>One</title><link>{base}/stories/one</link></item>
<item><title>Two</title><link>{base}/stories/two</link></item>
</channel></rss>"#,
        base = base
    );
    mount_page(&server, "/", 200, home).await;
    mount_xml(&server, "/custom-feed.xml", feed).await;
    mount_page(&server, "/stories/one", 200, article("One")).await;
    mount_page(&server, "/stories/two", 200, article("Two")).await;

    let report = run(create_test_config(), &format!("{}/", base))
        .await
        .expect("Run failed");

    let urls = report.result.source_urls();
    assert_eq!(
        urls,
        vec![
            format!("{}/stories/one", base),
            format!("{}/stories/two", base)
        ]
    );
}

#[tokio::test]
async fn test_repeated_runs_are_idempotent() {
    let server = MockServer::start().await;
    let base = server.uri();
    let paths = article_paths(4);

    mount_page(&server, "/", 200, article("Home")).await;
    mount_xml(&server, "/sitemap.xml", sitemap(&base, &paths)).await;
    for p in &paths {
        mount_page(&server, p, 200, article(p)).await;
    }

    let seed = format!("{}/", base);
    let first = run(create_test_config(), &seed).await.expect("First run failed");
    let second = run(create_test_config(), &seed).await.expect("Second run failed");

    assert_eq!(first.result.items.len(), second.result.items.len());
    assert_eq!(first.result.source_urls(), second.result.source_urls());
}

#[tokio::test]
async fn test_result_document_is_written() {
    let server = MockServer::start().await;
    mount_page(&server, "/", 200, article("Home")).await;

    let mut config = create_test_config();
    config.pipeline.max_additional_pages = 0;
    let report = run(config, &format!("{}/", server.uri()))
        .await
        .expect("Run failed");

    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let path = write_json(&report.result, dir.path(), "127.0.0.1", chrono::Utc::now())
        .expect("Failed to write result");

    let contents = std::fs::read_to_string(&path).expect("Failed to read result");
    let parsed: SiteResult = serde_json::from_str(&contents).expect("Invalid JSON");
    assert_eq!(parsed, report.result);
    assert!(path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("sift_results_127.0.0.1_")));
}
