use indexmap::{IndexMap, IndexSet};
use scraper::{Html, Selector};
use url::Url;

use crate::config::DiscoveryConfig;
use crate::util::{is_same_origin, path_segments};

/// Substrings of link text or path that mark a blog/news section.
pub const SECTION_KEYWORDS: [&str; 17] = [
    "blog",
    "news",
    "articles",
    "posts",
    "updates",
    "journal",
    "insights",
    "stories",
    "press",
    "medium",
    "substack",
    "the-edge",
    "engineering-blog",
    "dev",
    "engineering",
    "developers",
    "community",
];

/// Section roots probed when the page offers no usable links.
pub const DEFAULT_SECTION_PATHS: [&str; 17] = [
    "/blog",
    "/news",
    "/articles",
    "/posts",
    "/updates",
    "/journal",
    "/insights",
    "/stories",
    "/press",
    "/medium",
    "/substack",
    "/the-edge",
    "/engineering-blog",
    "/engineering",
    "/developers",
    "/dev",
    "/community",
];

/// Links deeper than this many segments never produce a section root.
const MAX_LINK_DEPTH: usize = 3;

/// Picks up to `config.max_blog_sections` same-origin section roots to scan.
///
/// - With `config.blog_section_paths` set, returns exactly that list
///   truncated, regardless of the page. Repeated entries are kept; the
///   coordinator skips section URLs it has already scheduled.
/// - Otherwise, each same-origin `<a href>` whose text or path mentions a
///   [`SECTION_KEYWORDS`] entry and whose path has 1–3 segments yields the
///   root `/` + first segment.
/// - When that finds nothing, or `html` is `None` because the root page
///   could not be fetched, [`DEFAULT_SECTION_PATHS`] is used.
///
/// Order is preserved: document order for heuristic roots, list order for
/// fallbacks.
pub fn find_blog_sections(html: Option<&str>, base: &Url, config: &DiscoveryConfig) -> Vec<String> {
    let limit = config.max_blog_sections;

    if let Some(paths) = &config.blog_section_paths {
        return paths.iter().take(limit).cloned().collect();
    }

    let mut roots = match html {
        Some(html) => heuristic_roots(html, base),
        None => IndexSet::new(),
    };

    if roots.is_empty() {
        tracing::debug!(base = %base, "No section links found, using default section paths");
        roots.extend(DEFAULT_SECTION_PATHS.iter().map(|p| (*p).to_owned()));
    }

    roots.into_iter().take(limit).collect()
}

fn heuristic_roots(html: &str, base: &Url) -> IndexSet<String> {
    let mut roots = IndexSet::new();
    let mut seen: IndexSet<String> = IndexSet::new();

    for (path, text) in same_origin_links(html, base) {
        if seen.contains(&path) {
            continue;
        }
        if !mentions_section_keyword(&text) && !mentions_section_keyword(&path.to_lowercase()) {
            continue;
        }

        let segments = path_segments(&path);
        if segments.is_empty() || segments.len() > MAX_LINK_DEPTH {
            continue;
        }

        let root = format!("/{}", segments[0]);
        seen.insert(root.clone());
        seen.insert(path.clone());
        roots.insert(root);
    }

    roots
}

/// Path and lower-cased anchor text of each same-origin link, first occurrence per path.
fn same_origin_links(html: &str, base: &Url) -> IndexMap<String, String> {
    let mut links = IndexMap::new();
    let Ok(selector) = Selector::parse("a[href]") else {
        return links;
    };
    let document = Html::parse_document(html);

    for el in document.select(&selector) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base.join(href.trim()) else {
            continue;
        };
        if !is_same_origin(&resolved, base) {
            continue;
        }

        let text = el.text().collect::<String>().trim().to_lowercase();
        links.entry(resolved.path().to_owned()).or_insert(text);
    }

    links
}

fn mentions_section_keyword(haystack: &str) -> bool {
    SECTION_KEYWORDS.iter().any(|kw| haystack.contains(kw))
}
