//! Formatting of single field values into BibTeX syntax.

use crate::{BibError, Result};

/// One piece of a field value: braced text or a bare string reference.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Reference(&'a str),
}

/// Formats field values the way they are written inside an entry.
///
/// Text is wrapped in braces. Parts enclosed in `#` are string references (for example
/// `#mar#` is written as the bare `mar`), and the pieces are joined with ` # `. A hash
/// escaped as `\#` stays literal text.
///
/// # Examples
///
/// ```
/// use bibcanon::LatexFieldFormatter;
///
/// let formatter = LatexFieldFormatter::new();
/// assert_eq!(formatter.format("Foo Bar", "author").unwrap(), "{Foo Bar}");
/// assert_eq!(formatter.format("#mar#", "month").unwrap(), "mar");
/// assert_eq!(formatter.format("#jan# 1st", "month").unwrap(), "jan # { 1st}");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LatexFieldFormatter;

impl LatexFieldFormatter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Formats `content` for the field `field_name`.
    ///
    /// # Errors
    ///
    /// Returns [`BibError::InvalidFieldValue`] if braces are unbalanced or a `#` is left
    /// unmatched.
    pub fn format(&self, content: &str, field_name: &str) -> Result<String> {
        check_braces(content, field_name)?;
        let segments = split_segments(content, field_name)?;
        if segments.is_empty() {
            return Ok("{}".to_string());
        }

        let parts: Vec<String> = segments
            .into_iter()
            .map(|segment| match segment {
                Segment::Text(text) => format!("{{{text}}}"),
                Segment::Reference(name) => name.to_string(),
            })
            .collect();
        Ok(parts.join(" # "))
    }
}

fn invalid(field_name: &str, message: &str) -> BibError {
    BibError::InvalidFieldValue {
        field: field_name.to_string(),
        message: message.to_string(),
    }
}

/// Brace depth must never go negative and must end at zero; `\{` and `\}` are ignored.
fn check_braces(content: &str, field_name: &str) -> Result<()> {
    let mut depth: usize = 0;
    let mut escaped = false;
    for c in content.chars() {
        match c {
            '\\' if !escaped => {
                escaped = true;
                continue;
            }
            '{' if !escaped => depth += 1,
            '}' if !escaped => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| invalid(field_name, "Curly braces { and } must be balanced."))?;
            }
            _ => {}
        }
        escaped = false;
    }
    if depth != 0 {
        return Err(invalid(field_name, "Curly braces { and } must be balanced."));
    }
    Ok(())
}

fn split_segments<'a>(content: &'a str, field_name: &str) -> Result<Vec<Segment<'a>>> {
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut escaped = false;
    let mut reference_start: Option<usize> = None;

    for (index, c) in content.char_indices() {
        if c == '\\' && !escaped {
            escaped = true;
            continue;
        }
        if c == '#' && !escaped {
            match reference_start.take() {
                None => {
                    if index > text_start {
                        segments.push(Segment::Text(&content[text_start..index]));
                    }
                    reference_start = Some(index + 1);
                }
                Some(start) => {
                    if index > start {
                        segments.push(Segment::Reference(&content[start..index]));
                    }
                    text_start = index + 1;
                }
            }
        }
        escaped = false;
    }

    if reference_start.is_some() {
        return Err(invalid(
            field_name,
            "The # character is not allowed in BibTeX strings unless escaped as in '\\#'.",
        ));
    }
    if text_start < content.len() {
        segments.push(Segment::Text(&content[text_start..]));
    }
    Ok(segments)
}
