use scraper::{Html, Selector};
use url::Url;

use crate::feed::types::{Feed, FeedKind, FeedSet};
use crate::util::clean_title;

/// Title used when a declared feed link carries no `title` attribute.
pub const DEFAULT_FEED_TITLE: &str = "Untitled Feed";

/// Conventional feed locations probed on every page, relative to the page URL.
pub const GUESSED_FEED_PATHS: [&str; 9] = [
    "rss.xml",
    "feed.xml",
    "rss",
    "atom",
    "atom.xml",
    "index.xml",
    "feeds/rss.xml",
    "feed",
    "rss/feed.xml",
];

/// Candidate feed URLs derived from one page, not yet fetched.
#[derive(Debug, Default)]
pub struct Candidates {
    /// Declared links first, then guessed paths; unique by resolved URL.
    pub feeds: FeedSet,
    /// Declared hrefs that could not be resolved against the page URL.
    pub rejected_hrefs: Vec<String>,
}

/// Derives candidate feed locations from page HTML.
///
/// Two passes, in order:
///
/// 1. `<link>` elements whose `type` mentions `rss+xml` or `atom+xml`. The
///    href is resolved against `base`; hrefs that fail to resolve are
///    reported in [`Candidates::rejected_hrefs`]. The `rel` attribute is not
///    checked because plenty of sites omit it.
/// 2. [`GUESSED_FEED_PATHS`], each resolved against `base`, titled with its
///    last path segment.
///
/// The first occurrence of a resolved URL wins. No network access happens
/// here; malformed HTML simply yields fewer declared links.
pub fn resolve_candidates(html: &str, base: &Url) -> Candidates {
    let mut candidates = Candidates::default();

    for (href, title, mime) in declared_feed_links(html) {
        let trimmed = href.trim();
        let resolved = if trimmed.is_empty() {
            None
        } else {
            base.join(trimmed).ok()
        };

        let Some(resolved) = resolved else {
            tracing::debug!(href = %href, base = %base, "Skipping unresolvable feed href");
            candidates.rejected_hrefs.push(href);
            continue;
        };

        let title = title
            .as_deref()
            .map(clean_title)
            .filter(|t| !t.is_empty())
            .map(|t| t.into_owned())
            .unwrap_or_else(|| DEFAULT_FEED_TITLE.to_owned());

        candidates.feeds.insert(Feed {
            url: resolved.to_string(),
            title,
            kind: FeedKind::infer(&mime),
        });
    }

    for path in GUESSED_FEED_PATHS {
        let Ok(resolved) = base.join(path) else {
            continue;
        };
        let title = path.rsplit('/').next().unwrap_or(path);

        candidates.feeds.insert(Feed {
            url: resolved.to_string(),
            title: title.to_owned(),
            kind: FeedKind::infer(path),
        });
    }

    candidates
}

/// Returns `(href, title, mime)` for every `<link>` declaring an RSS/Atom feed.
fn declared_feed_links(html: &str) -> Vec<(String, Option<String>, String)> {
    let Ok(selector) = Selector::parse("link[href][type]") else {
        return Vec::new();
    };
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .filter_map(|el| {
            let el = el.value();
            let mime = el.attr("type")?.to_ascii_lowercase();
            if !(mime.contains("rss+xml") || mime.contains("atom+xml")) {
                return None;
            }
            let href = el.attr("href")?.to_owned();
            let title = el.attr("title").map(str::to_owned);
            Some((href, title, mime))
        })
        .collect()
}
