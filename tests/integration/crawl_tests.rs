//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock WordPress sites and test the full
//! discover-then-crawl cycle end-to-end.

use backlink_scout::config::{CrawlOptions, UserAgentConfig};
use backlink_scout::crawler::{build_http_client, Coordinator, MatchCriteria, MatchRecord};
use backlink_scout::output::{CsvOutputHandler, OutputHandler};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates crawl options suited to a local mock server
fn test_options() -> CrawlOptions {
    CrawlOptions {
        sitemap_concurrency: 4,
        page_concurrency: 4,
        max_pages: 100,
        request_timeout_secs: 1,
        crawl_deadline_secs: None,
    }
}

fn test_coordinator(options: CrawlOptions) -> Coordinator {
    let user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
    };
    let client = build_http_client(&user_agent, &options).expect("Failed to build client");
    Coordinator::with_client(client, options)
}

fn sitemap_index(locs: &[String]) -> String {
    let entries: String = locs
        .iter()
        .map(|loc| format!("<sitemap><loc>{}</loc></sitemap>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</sitemapindex>"#,
        entries
    )
}

fn url_set(locs: &[String]) -> String {
    let entries: String = locs
        .iter()
        .map(|loc| format!("<url><loc>{}</loc></url>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        entries
    )
}

fn article_page(body: &str) -> String {
    format!(
        r#"<html><body>
            <nav><a href="/target/">Menu</a></nav>
            <article>{}</article>
        </body></html>"#,
        body
    )
}

/// Mounts a sitemap index pointing at one sub-sitemap listing `page_paths`
async fn mount_single_sitemap(server: &MockServer, page_paths: &[&str]) {
    let base = server.uri();
    let sub = format!("{}/wp-sitemap-posts-post-1.xml", base);
    let pages: Vec<String> = page_paths.iter().map(|p| format!("{}{}", base, p)).collect();

    Mock::given(method("GET"))
        .and(path("/wp-sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap_index(&[sub])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/wp-sitemap-posts-post-1.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(url_set(&pages)))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page_path: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_link_mode_end_to_end() {
    let server = MockServer::start().await;
    let base = server.uri();
    let target = format!("{}/target/", base);

    mount_single_sitemap(&server, &["/a/", "/b/", "/c/", "/target/"]).await;
    mount_page(
        &server,
        "/a/",
        article_page(r#"<p>Intro. <a href="/target/">read more</a></p>"#),
    )
    .await;
    mount_page(
        &server,
        "/b/",
        article_page(r#"<p>Links <a href="/elsewhere/">elsewhere</a>.</p>"#),
    )
    .await;
    mount_page(&server, "/c/", "<html><body><p>No article</p></body></html>".to_string()).await;

    // The target page itself must never be fetched as a crawl input
    Mock::given(method("GET"))
        .and(path("/target/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_page("")))
        .expect(0)
        .mount(&server)
        .await;

    let coordinator = test_coordinator(test_options());
    let criteria = MatchCriteria::links([target.clone()]);

    let pages = coordinator.discover_pages(&criteria).await;
    assert_eq!(pages.len(), 3, "target should be excluded: {:?}", pages);

    let result = coordinator.crawl(pages, &criteria).await;

    let matches = &result.matches[&target];
    assert_eq!(matches.len(), 1);
    match &matches[0] {
        MatchRecord::Link(link) => {
            assert_eq!(link.source, format!("{}/a/", base));
            assert_eq!(link.anchor_text, "read more");
        }
        other => panic!("Expected a link match, got {:?}", other),
    }

    let summary = &result.summary;
    assert_eq!(summary.pages_processed, 3);
    assert_eq!(summary.pages_with_article, 2);
    assert_eq!(summary.pages_matched, 1);
    assert_eq!(summary.no_match, 2);
    assert_eq!(summary.fetch_errors, 0);

    let dir = tempfile::TempDir::new().unwrap();
    let written = CsvOutputHandler::new(dir.path())
        .write_result(&result)
        .unwrap();
    assert_eq!(
        written,
        vec![dir.path().join("internal_links_target_1_found.csv")]
    );
}

#[tokio::test]
async fn test_link_mode_multiple_targets_on_one_page() {
    let server = MockServer::start().await;
    let base = server.uri();
    let first = format!("{}/first/", base);
    let second = format!("{}/second/", base);
    let unused = format!("{}/unused/", base);

    mount_single_sitemap(&server, &["/a/"]).await;
    mount_page(
        &server,
        "/a/",
        article_page(
            r#"<p><a href="/first/">One</a> and <a href="/second/">Two</a>.</p>"#,
        ),
    )
    .await;

    let coordinator = test_coordinator(test_options());
    let criteria = MatchCriteria::links([first.clone(), second.clone(), unused.clone()]);

    let pages = coordinator.discover_pages(&criteria).await;
    let result = coordinator.crawl(pages, &criteria).await;

    assert_eq!(result.matches[&first].len(), 1);
    assert_eq!(result.matches[&second].len(), 1);
    assert!(result.matches[&unused].is_empty());
    assert_eq!(result.summary.pages_matched, 1);
    assert_eq!(result.summary.total_matches, 2);
}

#[tokio::test]
async fn test_keyword_mode_end_to_end() {
    let server = MockServer::start().await;
    let base = server.uri();
    let target = format!("{}/target/", base);

    mount_single_sitemap(&server, &["/a/", "/b/", "/c/"]).await;
    mount_page(
        &server,
        "/a/",
        article_page("<p>Best casino bonus today.</p><p>Nothing else here.</p>"),
    )
    .await;
    // Already links to the target from a paragraph, so it is skipped
    mount_page(
        &server,
        "/b/",
        article_page(r#"<p>Our <a href="/target/">casino</a> guide.</p>"#),
    )
    .await;
    mount_page(&server, "/c/", article_page("<p>Gardening tips.</p>")).await;

    let coordinator = test_coordinator(test_options());
    let criteria = MatchCriteria::keywords(&target, &["casino", "bonus"]).unwrap();

    let pages = coordinator.discover_pages(&criteria).await;
    let result = coordinator.crawl(pages, &criteria).await;

    let matches = &result.matches[&target];
    assert_eq!(matches.len(), 1);
    match &matches[0] {
        MatchRecord::Keyword(found) => {
            assert_eq!(found.source, format!("{}/a/", base));
            let keywords: Vec<&str> = found.keywords.iter().map(|k| k.keyword.as_str()).collect();
            assert_eq!(keywords, vec!["casino", "bonus"]);
            for keyword in &found.keywords {
                assert_eq!(keyword.sentences, vec!["Best casino bonus today."]);
            }
        }
        other => panic!("Expected a keyword match, got {:?}", other),
    }

    assert_eq!(result.summary.skipped_contains_target, 1);
    assert_eq!(result.summary.no_match, 1);
    assert_eq!(result.summary.pages_matched, 1);
}

#[tokio::test]
async fn test_each_sub_sitemap_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    let subs: Vec<String> = (1..=3)
        .map(|i| format!("{}/wp-sitemap-posts-post-{}.xml", base, i))
        .collect();

    Mock::given(method("GET"))
        .and(path("/wp-sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap_index(&subs)))
        .expect(1)
        .mount(&server)
        .await;

    for i in 1..=3 {
        // Every sub-sitemap lists the shared page plus one of its own
        let pages = vec![format!("{}/shared/", base), format!("{}/page-{}/", base, i)];
        Mock::given(method("GET"))
            .and(path(format!("/wp-sitemap-posts-post-{}.xml", i)))
            .respond_with(ResponseTemplate::new(200).set_body_string(url_set(&pages)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let coordinator = test_coordinator(test_options());
    let criteria = MatchCriteria::links([format!("{}/target/", base)]);

    let mut pages = coordinator.discover_pages(&criteria).await;
    pages.sort();

    // Duplicates survive discovery
    assert_eq!(pages.len(), 6);
    assert_eq!(
        pages.iter().filter(|p| p.ends_with("/shared/")).count(),
        3
    );

    server.verify().await;
}

#[tokio::test]
async fn test_failing_sub_sitemap_isolated() {
    let server = MockServer::start().await;
    let base = server.uri();

    let subs = vec![
        format!("{}/wp-sitemap-posts-post-1.xml", base),
        format!("{}/wp-sitemap-posts-page-1.xml", base),
        format!("{}/wp-sitemap-broken.xml", base),
    ];

    Mock::given(method("GET"))
        .and(path("/wp-sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap_index(&subs)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wp-sitemap-posts-post-1.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(url_set(&[format!("{}/a/", base)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wp-sitemap-posts-page-1.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wp-sitemap-broken.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<urlset><url><loc>"))
        .mount(&server)
        .await;

    let coordinator = test_coordinator(test_options());
    let criteria = MatchCriteria::links([format!("{}/target/", base)]);

    let pages = coordinator.discover_pages(&criteria).await;
    assert_eq!(pages, vec![format!("{}/a/", base)]);
}

#[tokio::test]
async fn test_missing_sitemap_index_yields_empty_result() {
    let server = MockServer::start().await;
    let base = server.uri();
    let target = format!("{}/target/", base);

    Mock::given(method("GET"))
        .and(path("/wp-sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let coordinator = test_coordinator(test_options());
    let criteria = MatchCriteria::links([target.clone()]);

    let pages = coordinator.discover_pages(&criteria).await;
    assert!(pages.is_empty());

    let result = coordinator.crawl(pages, &criteria).await;
    assert!(result.is_empty());
    assert_eq!(result.summary.pages_processed, 0);
    assert!(result.matches[&target].is_empty());
}

#[tokio::test]
async fn test_timeout_page_does_not_stop_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();
    let target = format!("{}/target/", base);

    mount_single_sitemap(&server, &["/slow/", "/a/", "/b/"]).await;

    Mock::given(method("GET"))
        .and(path("/slow/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_page(r#"<a href="/target/">slow</a>"#))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/a/",
        article_page(r#"<a href="/target/">fast</a>"#),
    )
    .await;
    mount_page(&server, "/b/", article_page("<p>Plain.</p>")).await;

    let coordinator = test_coordinator(test_options());
    let criteria = MatchCriteria::links([target.clone()]);

    let pages = coordinator.discover_pages(&criteria).await;
    let result = coordinator.crawl(pages, &criteria).await;

    assert_eq!(result.summary.pages_processed, 3);
    assert_eq!(result.summary.fetch_errors, 1);
    assert_eq!(result.matches[&target].len(), 1);
    assert_eq!(result.matches[&target][0].source(), format!("{}/a/", base));
}

#[tokio::test]
async fn test_page_ceiling_limits_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();
    let target = format!("{}/target/", base);

    let paths: Vec<String> = (0..10).map(|i| format!("/page-{}/", i)).collect();
    let path_refs: Vec<&str> = paths.iter().map(String::as_str).collect();
    mount_single_sitemap(&server, &path_refs).await;

    for (i, page_path) in paths.iter().enumerate() {
        let mock = Mock::given(method("GET"))
            .and(path(page_path.as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(article_page(r#"<a href="/target/">go</a>"#)),
            );
        // Only the first pages in sitemap order may be fetched
        let mock = if i < 4 { mock.expect(1) } else { mock.expect(0) };
        mock.mount(&server).await;
    }

    let mut options = test_options();
    options.max_pages = 4;
    let coordinator = test_coordinator(options);
    let criteria = MatchCriteria::links([target.clone()]);

    let pages = coordinator.discover_pages(&criteria).await;
    assert_eq!(pages.len(), 10);

    let result = coordinator.crawl(pages, &criteria).await;

    assert_eq!(result.summary.pages_found, 10);
    assert_eq!(result.summary.pages_total, 4);
    assert_eq!(result.summary.pages_dropped(), 6);
    assert_eq!(result.summary.pages_processed, 4);
    assert_eq!(result.matches[&target].len(), 4);

    server.verify().await;
}

#[tokio::test]
async fn test_crawl_deadline_returns_partial_result() {
    let server = MockServer::start().await;
    let base = server.uri();
    let target = format!("{}/target/", base);

    mount_single_sitemap(&server, &["/fast/", "/slow/"]).await;
    mount_page(
        &server,
        "/fast/",
        article_page(r#"<a href="/target/">fast</a>"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_page("<p>Slow.</p>"))
                .set_delay(Duration::from_secs(4)),
        )
        .mount(&server)
        .await;

    let mut options = test_options();
    options.request_timeout_secs = 10;
    options.crawl_deadline_secs = Some(1);
    let coordinator = test_coordinator(options);
    let criteria = MatchCriteria::links([target.clone()]);

    let pages = coordinator.discover_pages(&criteria).await;
    let result = coordinator.crawl(pages, &criteria).await;

    assert_eq!(result.summary.pages_processed, 1);
    assert_eq!(result.summary.cancelled, 1);
    assert_eq!(result.matches[&target].len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pages_crawled_in_parallel_within_bound() {
    let server = MockServer::start().await;
    let base = server.uri();
    let target = format!("{}/target/", base);

    let paths: Vec<String> = (0..6).map(|i| format!("/slow-{}/", i)).collect();
    let path_refs: Vec<&str> = paths.iter().map(String::as_str).collect();
    mount_single_sitemap(&server, &path_refs).await;

    for page_path in &paths {
        Mock::given(method("GET"))
            .and(path(page_path.as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(article_page(r#"<a href="/target/">go</a>"#))
                    .set_delay(Duration::from_millis(800)),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let mut options = test_options();
    options.request_timeout_secs = 10;
    options.page_concurrency = 3;
    let coordinator = test_coordinator(options);
    let criteria = MatchCriteria::links([target.clone()]);

    let pages = coordinator.discover_pages(&criteria).await;
    let started = std::time::Instant::now();
    let result = coordinator.crawl(pages, &criteria).await;
    let elapsed = started.elapsed();

    assert_eq!(result.summary.pages_processed, 6);
    assert_eq!(result.matches[&target].len(), 6);
    // Two waves of three: overlapping, but never all six at once
    assert!(elapsed >= Duration::from_millis(1600), "too fast: {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(4000), "not parallel: {:?}", elapsed);
}
