use thiserror::Error;
use url::Url;

/// Errors that can occur when validating a site URL supplied by the caller.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed as an absolute URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL has no host component.
    #[error("URL has no host: {0}")]
    MissingHost(String),
}

/// Validates a URL string as a site to scan.
///
/// Accepts only absolute `http://` or `https://` URLs that carry a host.
///
/// # Errors
///
/// Returns [`UrlValidationError`] if:
/// - The URL cannot be parsed ([`UrlValidationError::InvalidUrl`])
/// - The scheme is not `http` or `https` ([`UrlValidationError::UnsupportedScheme`])
/// - The host is missing ([`UrlValidationError::MissingHost`])
///
/// # Examples
///
/// ```
/// use feedscout::util::validate_url;
///
/// let url = validate_url("https://example.com/blog").unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
///
/// assert!(validate_url("example.com").is_err());
/// assert!(validate_url("file:///etc/passwd").is_err());
/// ```
pub fn validate_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlValidationError::MissingHost(url_str.to_owned()));
    }

    Ok(url)
}

/// Returns true when both URLs share scheme, host, and port.
pub fn is_same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

/// Non-empty path segments of a URL path (`"/blog/2024/"` -> `["blog", "2024"]`).
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert!(validate_url("https://example.com/feed.xml").is_ok());
        assert!(validate_url("http://news.example.org").is_ok());
        assert!(validate_url("http://127.0.0.1:8080").is_ok());
    }

    #[test]
    fn test_invalid_schemes() {
        assert!(matches!(
            validate_url("file:///etc/passwd"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            validate_url("ftp://example.com"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_relative_url_rejected() {
        assert!(matches!(
            validate_url("example.com/blog"),
            Err(UrlValidationError::InvalidUrl(_))
        ));
        assert!(validate_url("/blog").is_err());
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        let url = validate_url("  https://example.com  ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_same_origin() {
        let a = Url::parse("https://example.com/blog").unwrap();
        let b = Url::parse("https://example.com/news?page=2").unwrap();
        let other_host = Url::parse("https://cdn.example.com/blog").unwrap();
        let other_scheme = Url::parse("http://example.com/blog").unwrap();
        let other_port = Url::parse("https://example.com:8443/blog").unwrap();

        assert!(is_same_origin(&a, &b));
        assert!(!is_same_origin(&a, &other_host));
        assert!(!is_same_origin(&a, &other_scheme));
        assert!(!is_same_origin(&a, &other_port));
    }

    #[test]
    fn test_path_segments() {
        assert_eq!(path_segments("/"), Vec::<&str>::new());
        assert_eq!(path_segments("/blog"), vec!["blog"]);
        assert_eq!(path_segments("/blog/2024/"), vec!["blog", "2024"]);
        assert_eq!(path_segments("//a//b"), vec!["a", "b"]);
    }
}
