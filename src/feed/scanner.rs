use futures::stream::{self, StreamExt};
use thiserror::Error;
use url::Url;

use crate::feed::candidates::resolve_candidates;
use crate::feed::types::{FeedSet, ScanOutcome};
use crate::feed::validator::is_feed_document;

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const MAX_BODY_SIZE: usize = 5 * 1024 * 1024; // 5MB
const MAX_CONCURRENT_VALIDATIONS: usize = 8;

/// Errors from a single HTTP fetch.
///
/// Only [`FetchError::Network`] on the scanned page itself escapes
/// [`scan_site`]; everything else becomes absence of data.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[source] reqwest::Error),
    /// The connection broke while reading the body
    #[error("Failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body exceeded the 5MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
}

/// A successfully fetched response body.
#[derive(Debug)]
pub struct FetchedPage {
    /// URL after redirects; relative links resolve against this.
    pub final_url: Url,
    /// Lower-cased `Content-Type` header, empty when absent.
    pub content_type: String,
    pub body: String,
}

/// Builds the HTTP client shared by every scan in a run.
pub fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().user_agent(USER_AGENT).build()
}

/// Collects swallowed-failure messages when verbose diagnostics are on.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    enabled: bool,
    entries: Vec<String>,
}

impl Diagnostics {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, message: impl FnOnce() -> String) {
        if self.enabled {
            self.entries.push(message());
        }
    }

    pub(crate) fn extend(&mut self, entries: Vec<String>) {
        if self.enabled {
            self.entries.extend(entries);
        }
    }

    pub(crate) fn into_vec(self) -> Vec<String> {
        self.entries
    }
}

/// Fetches `url` with a GET and reads the body under the size limit.
///
/// # Errors
///
/// - [`FetchError::Network`] - DNS, connection, or TLS failure
/// - [`FetchError::Body`] - Connection lost while reading the body
/// - [`FetchError::HttpStatus`] - Non-2xx response
/// - [`FetchError::ResponseTooLarge`] - Body exceeded 5MB
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<FetchedPage, FetchError> {
    let response = client.get(url).send().await.map_err(FetchError::Network)?;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();

    let bytes = read_limited_bytes(response, MAX_BODY_SIZE).await?;

    Ok(FetchedPage {
        final_url,
        content_type,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Body)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

/// Visits one page and returns the feeds it confirms.
///
/// Fetches `url`; when the page answers with a non-2xx status or an
/// unreadable body, returns an outcome with no HTML and no feeds.
/// Otherwise every candidate from [`resolve_candidates`] is fetched (up to
/// 8 at a time) and kept only if [`is_feed_document`] accepts it.
/// Feeds keep candidate order regardless of which fetch finishes first.
///
/// There is no internal timeout: the caller bounds this future with its
/// deadline, and dropping it cancels every outstanding fetch.
///
/// # Errors
///
/// Returns [`FetchError::Network`] when the page request itself could not
/// be sent, i.e. the site is unreachable.
pub async fn scan_site(
    client: &reqwest::Client,
    url: &Url,
    verbose: bool,
) -> Result<ScanOutcome, FetchError> {
    let mut diagnostics = Diagnostics::new(verbose);

    let page = match fetch_page(client, url.as_str()).await {
        Ok(page) => page,
        Err(e @ FetchError::Network(_)) => return Err(e),
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "Page fetch failed");
            diagnostics.push(|| format!("failed to fetch {url}: {e}"));
            return Ok(ScanOutcome {
                html: None,
                final_url: None,
                feeds: FeedSet::new(),
                diagnostics: diagnostics.into_vec(),
            });
        }
    };

    let candidates = resolve_candidates(&page.body, &page.final_url);
    for href in &candidates.rejected_hrefs {
        diagnostics.push(|| format!("invalid feed href {href:?} on {}", page.final_url));
    }

    let checked: Vec<_> = stream::iter(candidates.feeds.into_vec())
        .map(|candidate| async move {
            let verdict = fetch_page(client, &candidate.url)
                .await
                .map(|fetched| is_feed_document(&fetched.body, &fetched.content_type));
            (candidate, verdict)
        })
        .buffered(MAX_CONCURRENT_VALIDATIONS)
        .collect()
        .await;

    let mut feeds = FeedSet::new();
    for (candidate, verdict) in checked {
        match verdict {
            Ok(true) => {
                tracing::debug!(feed = %candidate.url, kind = ?candidate.kind, "Confirmed feed");
                feeds.insert(candidate);
            }
            Ok(false) => {
                tracing::debug!(candidate = %candidate.url, "Not a feed document");
                diagnostics.push(|| format!("candidate {} is not a feed", candidate.url));
            }
            Err(e) => {
                tracing::debug!(candidate = %candidate.url, error = %e, "Candidate fetch failed");
                diagnostics.push(|| format!("failed to fetch candidate {}: {e}", candidate.url));
            }
        }
    }

    Ok(ScanOutcome {
        html: Some(page.body),
        final_url: Some(page.final_url),
        feeds,
        diagnostics: diagnostics.into_vec(),
    })
}
