//! Discovery configuration and the optional TOML config file.
//!
//! The config file is optional — callers that never pass `--config` get
//! `DiscoveryConfig::default()`. Unknown keys are ignored by serde, though
//! we log a warning when the file contains potential typos. Command-line
//! flags are applied on top of whatever the file provides.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// A value parsed but is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Settings for one discovery run, fixed before any scanning starts.
///
/// The value is passed explicitly into every coordinator call; nothing
/// reads it from global state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Per-URL deadline in milliseconds, covering the root scan and every
    /// section scan combined.
    pub timeout_ms: u64,

    /// Maximum number of blog sections probed per input URL.
    pub max_blog_sections: usize,

    /// Explicit section paths; replaces the link heuristics when set.
    pub blog_section_paths: Option<Vec<String>>,

    /// Only scan the input URL itself.
    pub skip_blog_sections: bool,

    /// Collect swallowed failures into `SiteResult::diagnostics`.
    pub verbose_diagnostics: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
            max_blog_sections: Self::DEFAULT_MAX_BLOG_SECTIONS,
            blog_section_paths: None,
            skip_blog_sections: false,
            verbose_diagnostics: false,
        }
    }
}

impl DiscoveryConfig {
    pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
    pub const DEFAULT_MAX_BLOG_SECTIONS: usize = 5;

    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 5] = [
        "timeout_ms",
        "max_blog_sections",
        "blog_section_paths",
        "skip_blog_sections",
        "verbose_diagnostics",
    ];

    /// The per-URL deadline as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(DiscoveryConfig::default())`
    /// - Empty file → `Ok(DiscoveryConfig::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Out-of-range values → `Err(ConfigError::Invalid)`
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text, applying the same rules as [`Self::load`].
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: DiscoveryConfig = toml::from_str(content)?;
        config.validate()?;
        tracing::debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be positive".into()));
        }
        if self.max_blog_sections == 0 {
            return Err(ConfigError::Invalid(
                "max_blog_sections must be positive".into(),
            ));
        }
        if let Some(paths) = &self.blog_section_paths {
            if paths.iter().all(|p| p.trim().is_empty()) {
                return Err(ConfigError::Invalid(
                    "blog_section_paths must contain at least one path".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Splits a `--blog-paths` value on commas and pipes.
///
/// Entries are trimmed and empty entries dropped; a list with nothing left
/// is rejected.
///
/// ```
/// use feedscout::config::parse_blog_paths;
///
/// assert_eq!(parse_blog_paths("/a,/b|/c").unwrap(), vec!["/a", "/b", "/c"]);
/// assert!(parse_blog_paths(" , | ").is_err());
/// ```
pub fn parse_blog_paths(raw: &str) -> Result<Vec<String>, ConfigError> {
    let paths: Vec<String> = raw
        .split([',', '|'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect();

    if paths.is_empty() {
        return Err(ConfigError::Invalid(
            "--blog-paths requires at least one path".into(),
        ));
    }
    Ok(paths)
}

// ============================================================================
// Tests
// ============================================================================
