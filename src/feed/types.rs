use indexmap::IndexMap;
use serde::Serialize;
use url::Url;

/// Syndication format of a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Rss,
    Atom,
    Unknown,
}

impl FeedKind {
    /// Infers the kind from a declared MIME type or a file path: anything
    /// mentioning "atom" is Atom, everything else is RSS.
    pub fn infer(hint: &str) -> Self {
        if hint.to_ascii_lowercase().contains("atom") {
            FeedKind::Atom
        } else {
            FeedKind::Rss
        }
    }
}

/// A feed location plus the metadata known about it without parsing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feed {
    /// Absolute URL of the feed; unique within any result.
    pub url: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: FeedKind,
}

/// Feeds keyed by URL, iterated in insertion order.
///
/// Inserting a URL that is already present leaves the existing entry alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSet {
    feeds: IndexMap<String, Feed>,
}

impl FeedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `feed` unless its URL was seen before. Returns true if added.
    pub fn insert(&mut self, feed: Feed) -> bool {
        if self.feeds.contains_key(&feed.url) {
            return false;
        }
        self.feeds.insert(feed.url.clone(), feed);
        true
    }

    /// Adds every feed from `other`, keeping entries already present.
    pub fn merge(&mut self, other: FeedSet) {
        for feed in other.into_vec() {
            self.insert(feed);
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.feeds.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feed> {
        self.feeds.values()
    }

    pub fn into_vec(self) -> Vec<Feed> {
        self.feeds.into_values().collect()
    }
}

impl FromIterator<Feed> for FeedSet {
    fn from_iter<I: IntoIterator<Item = Feed>>(iter: I) -> Self {
        let mut set = FeedSet::new();
        for feed in iter {
            set.insert(feed);
        }
        set
    }
}

/// Result of visiting one page.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Page body, or `None` when the page could not be fetched.
    pub html: Option<String>,
    /// URL the body was served from after redirects; set whenever `html` is.
    pub final_url: Option<Url>,
    /// Validated feeds, unique by URL.
    pub feeds: FeedSet,
    /// Swallowed failures, collected only in verbose mode.
    pub diagnostics: Vec<String>,
}

/// Discovery result for one input URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteResult {
    /// The input URL as given.
    pub url: String,
    pub feeds: Vec<Feed>,
    /// `"Timeout"` on deadline expiry, otherwise the failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

impl SiteResult {
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            feeds: Vec::new(),
            error: Some(error.into()),
            diagnostics: Vec::new(),
        }
    }
}

/// Process exit status derived from a [`RunReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// At least one feed was found.
    FeedsFound,
    /// Nothing found and nothing failed.
    NoFeeds,
    /// Nothing found and at least one site failed (also used for usage errors).
    Failed,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::FeedsFound => 0,
            ExitStatus::NoFeeds => 1,
            ExitStatus::Failed => 2,
        }
    }
}

/// Top-level output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// True iff no site result carries an error.
    pub success: bool,
    /// Present (and true) only when some site failed but feeds were still found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_results: Option<bool>,
    /// One entry per input URL, in input order.
    pub results: Vec<SiteResult>,
}

impl RunReport {
    pub fn from_results(results: Vec<SiteResult>) -> Self {
        let success = results.iter().all(|r| r.error.is_none());
        let total: usize = results.iter().map(|r| r.feeds.len()).sum();
        let partial_results = (!success && total > 0).then_some(true);

        Self {
            success,
            partial_results,
            results,
        }
    }

    pub fn total_feeds(&self) -> usize {
        self.results.iter().map(|r| r.feeds.len()).sum()
    }

    pub fn exit_status(&self) -> ExitStatus {
        if self.total_feeds() > 0 {
            ExitStatus::FeedsFound
        } else if self.success {
            ExitStatus::NoFeeds
        } else {
            ExitStatus::Failed
        }
    }
}
