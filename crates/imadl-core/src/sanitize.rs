//! Filename sanitization for item titles.

/// Characters that are illegal in a filename on at least one common filesystem.
const ILLEGAL: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Replaces each of `/ \ : * ? " < > |` with `_`. Everything else is kept as-is.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if ILLEGAL.contains(&c) { '_' } else { c })
        .collect()
}

/// Local filename for an item: its sanitized title, or the sanitized media id
/// when the title is blank.
pub fn item_filename(title: &str, media_id: &str) -> String {
    let name = sanitize_filename(title);
    if name.trim().is_empty() || name == "." || name == ".." {
        sanitize_filename(media_id)
    } else {
        name
    }
}
