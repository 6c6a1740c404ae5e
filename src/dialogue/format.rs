//! Cleanup of generated text before it is stored or sent.

use regex::Regex;

/// Strip heading markers and HTML line breaks, collapse runs of blank lines
/// and trim.
pub fn sanitize_reply(text: &str) -> String {
    let mut out = text.to_owned();
    for (pattern, replacement) in [
        (r"(?m)^[ \t]*#{1,6}[ \t]*", ""),
        (r"(?i)\s*<br\s*/?>\s*", "\n"),
        (r"(?i)</?p\s*/?>", "\n"),
        (r"\n{3,}", "\n\n"),
    ] {
        if let Ok(regex) = Regex::new(pattern) {
            out = regex.replace_all(&out, replacement).into_owned();
        }
    }
    out.trim().to_owned()
}
