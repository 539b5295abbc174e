//! Discovers RSS/Atom feeds for websites.
//!
//! The [`feed`] module holds the discovery pipeline, [`config`] the settings
//! threaded through it, and [`util`] the URL and text helpers it shares.

pub mod config;
pub mod feed;
pub mod util;
