//! Title extraction from the watcher's notification text.

/// Prefix the watcher puts in front of the item title.
pub const TITLE_MARKER: &str = "🆕 Title : ";
pub const DEFAULT_TITLE: &str = "New Vinted Item";

/// Returns the text between [`TITLE_MARKER`] and the end of its line, or
/// [`DEFAULT_TITLE`] when the marker, the line break or the title itself is
/// missing. Never panics.
pub fn extract_title(content: &str) -> &str {
    content
        .split_once(TITLE_MARKER)
        .and_then(|(_, rest)| rest.split_once('\n'))
        .map(|(line, _)| line.trim_end_matches('\r'))
        .filter(|title| !title.trim().is_empty())
        .unwrap_or(DEFAULT_TITLE)
}
