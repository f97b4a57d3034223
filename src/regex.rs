//! Regex engine selection and the `#name#` string-reference pattern.
//!
//! `regex_lite` is used when the `lite` feature is on, `regex` otherwise.

use std::sync::LazyLock;

#[cfg(feature = "lite")]
use regex_lite::{Captures, Regex};
#[cfg(all(feature = "regex", not(feature = "lite")))]
use regex::{Captures, Regex};

#[cfg(not(any(feature = "regex", feature = "lite")))]
compile_error!("bibcanon requires the \"regex\" or \"lite\" feature to be enabled");

static STRING_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([^#\s]+)#").unwrap());

/// Replaces every `#name#` segment for which `lookup` returns a definition.
///
/// Unknown references are kept as they are.
pub(crate) fn replace_string_references<'a>(
    text: &str,
    lookup: impl Fn(&str) -> Option<&'a str>,
) -> String {
    STRING_REFERENCE
        .replace_all(text, |caps: &Captures| match lookup(&caps[1]) {
            Some(definition) => definition.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_replace_string_references() {
        let lookup = |name: &str| (name == "acm").then_some("ACM");
        assert_eq!(replace_string_references("#acm# Press", lookup), "ACM Press");
        assert_eq!(replace_string_references("#ieee# and #acm#", lookup), "#ieee# and ACM");
        assert_eq!(replace_string_references("C# and F#", lookup), "C# and F#");
    }
}
