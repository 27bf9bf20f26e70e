//! Keyword search over extension and history fields

/// Multi-field keyword match.
///
/// A record matches when any present field contains the trimmed search word,
/// case-insensitive. An empty or whitespace-only word matches everything, so
/// clearing the search box restores the full list.
pub fn is_match(fields: &[Option<&str>], word: &str) -> bool {
    let needle = word.trim();
    if needle.is_empty() {
        return true;
    }
    let needle = needle.to_lowercase();
    fields
        .iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}
