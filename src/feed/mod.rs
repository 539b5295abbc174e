//! Feed discovery pipeline.
//!
//! Given a site URL, finds RSS/Atom feeds through three strategies and
//! confirms each candidate by fetching it:
//!
//! - **Declared links**: `<link type="application/rss+xml">` and friends
//! - **Guessed paths**: conventional locations such as `/feed.xml`
//! - **Blog sections**: same-site sub-paths like `/blog` scanned one hop deep
//!
//! # Architecture
//!
//! - [`candidates`] - Candidate feed URLs from page HTML (no network)
//! - [`sections`] - Blog/news section roots from page HTML (no network)
//! - [`validator`] - Decides whether a fetched body is a feed
//! - [`scanner`] - Fetches one page and validates its candidates
//! - [`discovery`] - Per-URL deadline, section fan-out, and merging
//!
//! # Example
//!
//! ```ignore
//! use feedscout::config::DiscoveryConfig;
//! use feedscout::feed::{build_client, discover_all};
//!
//! let client = build_client()?;
//! let urls = vec!["https://example.com".to_string()];
//! let report = discover_all(&client, &urls, &DiscoveryConfig::default()).await;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```

pub mod candidates;
pub mod discovery;
pub mod scanner;
pub mod sections;
pub mod types;
pub mod validator;

pub use candidates::{resolve_candidates, Candidates};
pub use discovery::{discover_all, discover_site, DiscoveryError};
pub use scanner::{build_client, fetch_page, scan_site, FetchError, FetchedPage, USER_AGENT};
pub use sections::find_blog_sections;
pub use types::{ExitStatus, Feed, FeedKind, FeedSet, RunReport, ScanOutcome, SiteResult};
pub use validator::is_feed_document;
