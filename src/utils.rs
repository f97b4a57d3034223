/// Upper-cases the first character of `value` if it is a lowercase letter.
///
/// Returns `None` when nothing would change.
pub fn capitalize_first(value: &str) -> Option<String> {
    let mut chars = value.chars();
    let first = chars.next()?;
    if !first.is_alphabetic() || !first.is_lowercase() {
        return None;
    }
    let mut result: String = first.to_uppercase().collect();
    result.push_str(chars.as_str());
    Some(result)
}

/// Removes surrounding whitespace and one pair of enclosing braces or quotes.
///
/// # Arguments
///
/// * `value` - The string to shave, typically a citation key
pub fn shave_string(value: &str) -> &str {
    let trimmed = value.trim();
    let shaved = trimmed
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .or_else(|| {
            trimmed
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
        });
    match shaved {
        Some(inner) => inner.trim(),
        None => trimmed,
    }
}

/// Splits a keyword list on `,` and `;`, dropping empty items.
pub fn split_keywords(keywords: &str) -> Vec<String> {
    keywords
        .split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// 1-based line number of the byte `offset` within `text`.
pub fn line_number_at(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Whether the value consists only of whitespace.
#[cfg_attr(not(feature = "csv"), allow(dead_code))]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
