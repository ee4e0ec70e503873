//! Parts list extraction.

use super::patterns::PARTS_FIELD;

/// Extract the parts list from a service block.
///
/// The value is split on commas and line breaks. Items are trimmed and
/// empty items dropped; a missing marker yields an empty list.
pub fn extract_parts(text: &str) -> Vec<String> {
    PARTS_FIELD
        .find(text)
        .map(|value| split_parts(&value))
        .unwrap_or_default()
}

/// Split a raw parts value into items.
pub fn split_parts(value: &str) -> Vec<String> {
    value
        .split([',', '\n'])
        .map(strip_bullet)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trim an item and drop a list bullet. A bullet must stand alone, so
/// "-40 Antifreeze" keeps its sign.
fn strip_bullet(item: &str) -> &str {
    let item = item.trim();
    for bullet in ['-', '*', '•'] {
        if let Some(rest) = item.strip_prefix(bullet) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return rest.trim();
            }
        }
    }
    item
}
