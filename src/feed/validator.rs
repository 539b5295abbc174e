/// Decides whether a fetched candidate is an RSS/Atom document.
///
/// All of the following must hold:
/// - the body contains `<rss` or `<feed` (case-sensitive substring; this is
///   a presence check, not an XML parse),
/// - the body carries an `<?xml` declaration or the content type mentions
///   `xml`, `rss`, or `atom`,
/// - the content type is not `text/html`.
///
/// This rejects ordinary HTML pages that merely talk about feeds.
pub fn is_feed_document(body: &str, content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();

    if content_type.contains("text/html") {
        return false;
    }

    let has_root_marker = body.contains("<rss") || body.contains("<feed");
    if !has_root_marker {
        return false;
    }

    body.contains("<?xml")
        || content_type.contains("xml")
        || content_type.contains("rss")
        || content_type.contains("atom")
}
