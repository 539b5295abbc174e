use std::borrow::Cow;

/// Normalizes a title taken from page markup for machine-readable output.
///
/// Runs of whitespace (including newlines and tabs) collapse to a single
/// space, other control characters (ESC, DEL, C0/C1) are dropped, and the
/// result is trimmed. Clean input is returned borrowed.
///
/// # Examples
///
/// ```
/// use feedscout::util::clean_title;
///
/// assert_eq!(clean_title("  Example\n   Blog "), "Example Blog");
/// assert_eq!(clean_title("Evil\x1b Feed"), "Evil Feed");
/// ```
pub fn clean_title(s: &str) -> Cow<'_, str> {
    let trimmed = s.trim();
    let needs_rewrite = trimmed.chars().any(char::is_control)
        || trimmed
            .as_bytes()
            .windows(2)
            .any(|w| w[0].is_ascii_whitespace() && w[1].is_ascii_whitespace());

    if !needs_rewrite {
        return Cow::Borrowed(trimmed);
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut pending_space = false;

    for c in trimmed.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if c.is_control() {
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }

    Cow::Owned(out)
}
