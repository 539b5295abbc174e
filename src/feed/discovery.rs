use futures::future::join_all;
use thiserror::Error;
use url::Url;

use crate::config::DiscoveryConfig;
use crate::feed::scanner::{scan_site, Diagnostics};
use crate::feed::sections::find_blog_sections;
use crate::feed::types::{FeedSet, RunReport, SiteResult};
use crate::util::{is_same_origin, validate_url};

/// Failures that end discovery for one input URL.
///
/// These are the only errors that reach [`SiteResult::error`]; candidate
/// and section failures are absorbed by the scanner.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The input could not be used as a site URL.
    #[error("{0}")]
    InvalidUrl(String),
    /// The input URL's own page could not be requested at all.
    #[error("{0}")]
    Unreachable(String),
    /// The per-URL deadline expired with work outstanding.
    #[error("Timeout")]
    Timeout,
}

/// Discovers feeds for every input URL concurrently.
///
/// Each URL runs under its own deadline; a failure or timeout on one never
/// cancels or delays another. Results keep input order.
pub async fn discover_all(
    client: &reqwest::Client,
    urls: &[String],
    config: &DiscoveryConfig,
) -> RunReport {
    let results = join_all(urls.iter().map(|url| discover_site(client, url, config))).await;
    RunReport::from_results(results)
}

/// Discovers feeds for one input URL under `config.timeout()`.
///
/// The deadline covers the root scan and every section scan combined. When
/// it expires the whole pipeline future is dropped, which aborts in-flight
/// fetches, and the result carries `error: "Timeout"` with no feeds.
pub async fn discover_site(
    client: &reqwest::Client,
    input: &str,
    config: &DiscoveryConfig,
) -> SiteResult {
    let outcome = tokio::time::timeout(config.timeout(), run_pipeline(client, input, config))
        .await
        .unwrap_or(Err(DiscoveryError::Timeout));

    match outcome {
        Ok((feeds, diagnostics)) => {
            tracing::info!(url = %input, feeds = feeds.len(), "Discovery complete");
            SiteResult {
                url: input.to_owned(),
                feeds: feeds.into_vec(),
                error: None,
                diagnostics,
            }
        }
        Err(e) => {
            tracing::warn!(url = %input, error = %e, "Discovery failed");
            SiteResult::failed(input, e.to_string())
        }
    }
}

/// Root scan, then section scans, merged first-seen-wins.
async fn run_pipeline(
    client: &reqwest::Client,
    input: &str,
    config: &DiscoveryConfig,
) -> Result<(FeedSet, Vec<String>), DiscoveryError> {
    let root_url = validate_url(input).map_err(|e| DiscoveryError::InvalidUrl(e.to_string()))?;
    let verbose = config.verbose_diagnostics;
    let mut diagnostics = Diagnostics::new(verbose);

    let root = scan_site(client, &root_url, verbose)
        .await
        .map_err(|e| DiscoveryError::Unreachable(e.to_string()))?;
    diagnostics.extend(root.diagnostics);
    let mut feeds = root.feeds;

    if config.skip_blog_sections {
        return Ok((feeds, diagnostics.into_vec()));
    }
    let Some(html) = root.html else {
        tracing::debug!(url = %root_url, "Root page unavailable, skipping sections");
        return Ok((feeds, diagnostics.into_vec()));
    };

    // Anchors are relative to where the root page was actually served from
    let page_url = root.final_url.as_ref().unwrap_or(&root_url);
    let sections = find_blog_sections(Some(&html), page_url, config);
    let section_urls = resolve_sections(&root_url, &sections, &mut diagnostics);
    if section_urls.is_empty() {
        return Ok((feeds, diagnostics.into_vec()));
    }

    tracing::debug!(url = %root_url, sections = section_urls.len(), "Scanning blog sections");
    let outcomes = join_all(
        section_urls
            .iter()
            .map(|section| scan_site(client, section, verbose)),
    )
    .await;

    for (section, outcome) in section_urls.iter().zip(outcomes) {
        match outcome {
            Ok(outcome) => {
                diagnostics.extend(outcome.diagnostics);
                feeds.merge(outcome.feeds);
            }
            Err(e) => {
                tracing::debug!(section = %section, error = %e, "Section unreachable");
                diagnostics.push(|| format!("failed to fetch section {section}: {e}"));
            }
        }
    }

    Ok((feeds, diagnostics.into_vec()))
}

/// Resolves section paths against the root, keeping same-origin URLs other than the root itself.
fn resolve_sections(root: &Url, sections: &[String], diagnostics: &mut Diagnostics) -> Vec<Url> {
    let mut urls: Vec<Url> = Vec::with_capacity(sections.len());

    for section in sections {
        let resolved = match root.join(section) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(section = %section, error = %e, "Skipping unresolvable section");
                diagnostics.push(|| format!("invalid section path {section:?}: {e}"));
                continue;
            }
        };
        if !is_same_origin(&resolved, root) {
            tracing::debug!(section = %resolved, "Skipping cross-origin section");
            diagnostics.push(|| {
                format!(
                    "section {resolved} is not on {}",
                    root.origin().ascii_serialization()
                )
            });
            continue;
        }
        if resolved == *root || urls.contains(&resolved) {
            continue;
        }
        urls.push(resolved);
    }

    urls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::scanner::build_client;
    use crate::feed::types::FeedKind;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RSS: &str = r#"<?xml version="1.0"?><rss version="2.0"><channel></channel></rss>"#;

    async fn mount_html(server: &MockServer, at: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_owned(), "text/html"))
            .mount(server)
            .await;
    }

    async fn mount_rss(server: &MockServer, at: &str) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(200).set_body_raw(RSS, "application/rss+xml"))
            .mount(server)
            .await;
    }

    fn urls(result: &SiteResult) -> Vec<String> {
        result.feeds.iter().map(|f| f.url.clone()).collect()
    }

    #[tokio::test]
    async fn test_root_and_section_feeds_merged() {
        let server = MockServer::start().await;
        mount_html(
            &server,
            "/",
            r#"<link type="application/rss+xml" href="/main.rss" title="Main">
               <a href="/blog">Blog</a>"#,
        )
        .await;
        mount_rss(&server, "/main.rss").await;
        mount_html(
            &server,
            "/blog",
            r#"<link type="application/rss+xml" href="/blog/posts.rss" title="Posts">
               <link type="application/rss+xml" href="/main.rss" title="Main again">"#,
        )
        .await;
        mount_rss(&server, "/blog/posts.rss").await;

        let client = build_client().unwrap();
        let result = discover_site(&client, &server.uri(), &DiscoveryConfig::default()).await;

        assert_eq!(result.error, None);
        assert_eq!(
            urls(&result),
            vec![
                format!("{}/main.rss", server.uri()),
                format!("{}/blog/posts.rss", server.uri()),
            ]
        );
        // Root's entry wins over the section's duplicate
        assert_eq!(result.feeds[0].title, "Main");
        assert_eq!(result.feeds[1].kind, FeedKind::Rss);
    }

    #[tokio::test]
    async fn test_skip_blog_sections() {
        let server = MockServer::start().await;
        mount_html(&server, "/", r#"<a href="/blog">Blog</a>"#).await;
        Mock::given(method("GET"))
            .and(path("/blog"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = DiscoveryConfig {
            skip_blog_sections: true,
            ..DiscoveryConfig::default()
        };
        let client = build_client().unwrap();
        let result = discover_site(&client, &server.uri(), &config).await;

        assert_eq!(result.error, None);
        assert!(result.feeds.is_empty());
    }

    #[tokio::test]
    async fn test_root_failure_skips_sections_without_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/blog"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = build_client().unwrap();
        let result = discover_site(&client, &server.uri(), &DiscoveryConfig::default()).await;

        assert_eq!(result.error, None);
        assert!(result.feeds.is_empty());
    }

    #[tokio::test]
    async fn test_deadline_reports_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let config = DiscoveryConfig {
            timeout_ms: 200,
            ..DiscoveryConfig::default()
        };
        let client = build_client().unwrap();
        let started = std::time::Instant::now();
        let result = discover_site(&client, &server.uri(), &config).await;

        assert_eq!(result.error.as_deref(), Some("Timeout"));
        assert!(result.feeds.is_empty());
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    /// URL on a local port nothing listens on.
    fn refused_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}")
    }

    #[tokio::test]
    async fn test_unreachable_root_reports_message() {
        let uri = refused_url();

        let client = build_client().unwrap();
        let result = discover_site(&client, &uri, &DiscoveryConfig::default()).await;

        let error = result.error.unwrap();
        assert!(error.starts_with("Request failed"), "got {error}");
        assert!(result.feeds.is_empty());
    }

    #[tokio::test]
    async fn test_sections_follow_redirected_root() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/company/"))
            .mount(&server)
            .await;
        mount_html(&server, "/company/", r#"<a href="news/">Company news</a>"#).await;
        mount_html(
            &server,
            "/company",
            r#"<link type="application/rss+xml" href="/company/feed.rss" title="Company">"#,
        )
        .await;
        mount_rss(&server, "/company/feed.rss").await;

        let client = build_client().unwrap();
        let result = discover_site(&client, &server.uri(), &DiscoveryConfig::default()).await;

        assert_eq!(result.error, None);
        assert_eq!(
            urls(&result),
            vec![format!("{}/company/feed.rss", server.uri())]
        );
    }

    #[tokio::test]
    async fn test_invalid_input_reports_message() {
        let client = build_client().unwrap();
        let result = discover_site(&client, "not a url", &DiscoveryConfig::default()).await;

        let error = result.error.unwrap();
        assert!(error.starts_with("Invalid URL"), "got {error}");
        assert!(result.feeds.is_empty());
    }

    #[tokio::test]
    async fn test_verbose_collects_section_diagnostics() {
        let server = MockServer::start().await;
        mount_html(&server, "/", r#"<a href="/news">News</a>"#).await;

        let config = DiscoveryConfig {
            verbose_diagnostics: true,
            ..DiscoveryConfig::default()
        };
        let client = build_client().unwrap();
        let result = discover_site(&client, &server.uri(), &config).await;

        let section_failure = format!("failed to fetch {}/news", server.uri());
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.starts_with(&section_failure)));
    }

    #[test]
    fn test_resolve_sections_filters() {
        let root = Url::parse("https://example.com/").unwrap();
        let sections = vec![
            "/blog".to_string(),
            "https://other.example/news".to_string(),
            "/".to_string(),
            "blog".to_string(),
            "http://[::1".to_string(),
            "/press".to_string(),
        ];
        let mut diagnostics = Diagnostics::new(true);
        let resolved = resolve_sections(&root, &sections, &mut diagnostics);

        let resolved: Vec<_> = resolved.iter().map(Url::as_str).collect();
        assert_eq!(
            resolved,
            vec!["https://example.com/blog", "https://example.com/press"]
        );
        assert_eq!(diagnostics.into_vec().len(), 2);
    }

    #[test]
    fn test_timeout_error_display() {
        assert_eq!(DiscoveryError::Timeout.to_string(), "Timeout");
    }
}
