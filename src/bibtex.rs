//! BibTeX parser preserving the source text of every entry.
//!
//! Entries read by [`BibtexParser`] remember the exact text they came from, including
//! any comments before them and one trailing line break. Combined with
//! [`BibEntryWriter`](crate::BibEntryWriter), a file parsed and written back without
//! edits is reproduced byte for byte.
//!
//! # Example
//!
//! ```
//! use bibcanon::BibtexParser;
//!
//! let input = r#"@String{acm = "ACM"}
//! @Article{key,
//!   author = {Foo Bar},
//!   publisher = acm # { Press},
//!   month = mar
//! }
//! "#;
//!
//! let result = BibtexParser::new().parse_database(input).unwrap();
//! let entry = &result.entries[0];
//! assert_eq!(entry.citation_key(), Some("key"));
//! assert_eq!(entry.field("publisher"), Some("#acm# Press"));
//! assert_eq!(entry.field("month"), Some("#mar#"));
//! assert_eq!(result.strings["acm"], "ACM");
//! ```

mod parse;
mod structure;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::database::BibDatabase;
use crate::entry::BibEntry;
use crate::{EntryImporter, Result};
use parse::bibtex_parse;
use structure::RawItem;

/// A recoverable problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// 1-based line where the problem starts
    pub line: usize,
    pub message: String,
}

impl ParseWarning {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Everything read from one BibTeX file.
#[derive(Debug, Clone, Default)]
pub struct ParserResult {
    pub entries: Vec<BibEntry>,
    /// `@String` definitions by name
    pub strings: BTreeMap<String, String>,
    pub preamble: Option<String>,
    /// Text found before `@String` and `@Preamble` definitions
    pub prolog: String,
    /// Text after the last entry
    pub epilog: String,
    pub warnings: Vec<ParseWarning>,
}

impl ParserResult {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Moves the parsed content into a [`BibDatabase`].
    ///
    /// # Errors
    ///
    /// Returns [`BibError::DuplicateId`](crate::BibError::DuplicateId) if two entries
    /// share an id, which cannot happen for freshly parsed entries.
    pub fn into_database(self) -> Result<BibDatabase> {
        let mut database = BibDatabase::new();
        for (name, value) in self.strings {
            database.set_string(&name, &value);
        }
        database.set_preamble(self.preamble);
        database.set_prolog(self.prolog);
        database.set_epilog(self.epilog);
        for entry in self.entries {
            database.insert_entry(entry)?;
        }
        Ok(database)
    }
}

/// Parser for BibTeX files.
#[derive(Debug, Default, Clone)]
pub struct BibtexParser;

impl BibtexParser {
    /// Creates a new parser instance.
    ///
    /// # Examples
    ///
    /// ```
    /// use bibcanon::BibtexParser;
    /// let parser = BibtexParser::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parses a whole file.
    ///
    /// Malformed entries are skipped and reported in [`ParserResult::warnings`].
    ///
    /// # Errors
    ///
    /// Fails only if a parsed entry cannot be built, e.g. because of an empty field name.
    pub fn parse_database(&self, input: &str) -> Result<ParserResult> {
        let scanned = bibtex_parse(input);
        let mut result = ParserResult {
            prolog: scanned.prolog,
            epilog: scanned.epilog,
            warnings: scanned.warnings,
            ..ParserResult::default()
        };

        let mut keys: HashSet<String> = HashSet::new();
        for item in scanned.items {
            match item {
                RawItem::Entry(raw) => {
                    let line = raw.line;
                    let entry = raw.into_entry(&mut result.warnings)?;
                    if let Some(key) = entry.citation_key() {
                        if !keys.insert(key.to_string()) {
                            result
                                .warnings
                                .push(ParseWarning::new(line, format!("duplicate citation key '{key}'")));
                        }
                    }
                    result.entries.push(entry);
                }
                RawItem::String { name, value } => {
                    result.strings.insert(name, value);
                }
                RawItem::Preamble(value) => result.preamble = Some(value),
                RawItem::Comment => {}
            }
        }

        tracing::debug!(
            entries = result.entries.len(),
            warnings = result.warnings.len(),
            "parsed BibTeX input"
        );
        Ok(result)
    }
}

impl EntryImporter for BibtexParser {
    fn import(&self, input: &str) -> Result<Vec<BibEntry>> {
        Ok(self.parse_database(input)?.entries)
    }

    fn format_name(&self) -> &'static str {
        "BibTeX"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["bib"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_round_trip_entry() {
        let input = "@Article{test,\n  Author                   = {Foo Bar},\n  Journal                  = {International Journal of Something},\n  Note                     = {some note},\n  Number                   = {1}\n}";
        let result = BibtexParser::new().parse_database(input).unwrap();
        let entry = &result.entries[0];

        assert_eq!(entry.entry_type(), "article");
        assert_eq!(entry.field_count(), 5);
        assert_eq!(entry.field("journal"), Some("International Journal of Something"));
        assert_eq!(entry.parsed_serialization(), Some(input));
        assert!(!entry.has_changed());
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_entry_after_comment_block() {
        let input = "@comment{keep me}\n@Misc{k,\n  title = {T}\n}";
        let result = BibtexParser::new().parse_database(input).unwrap();
        let entry = &result.entries[0];
        assert_eq!(entry.parsed_serialization(), Some(input));
        assert_eq!(entry.user_comments(), "@comment{keep me}");
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_duplicate_keys_are_reported() {
        let input = "@misc{a, title = {x}}\n@misc{a, title = {y}}\n";
        let result = BibtexParser::new().parse_database(input).unwrap();
        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].line, 2);
        assert_eq!(
            result.warnings[0].to_string(),
            "line 2: duplicate citation key 'a'"
        );
    }

    #[test]
    fn test_into_database() {
        let input = "% top\n@preamble{\"p\"}\n@string{s = {v}}\n@misc{a, note = s}\nend";
        let database = BibtexParser::new()
            .parse_database(input)
            .unwrap()
            .into_database()
            .unwrap();
        assert_eq!(database.len(), 1);
        assert_eq!(database.preamble(), Some("p"));
        assert_eq!(database.string("s"), Some("v"));
        assert_eq!(database.prolog(), "% top\n");
        assert_eq!(database.epilog(), "end");
        let entry = database.entry_by_key("a").unwrap();
        assert_eq!(database.resolved_field("note", entry).as_deref(), Some("v"));
    }

    #[test]
    fn test_importer() {
        let parser = BibtexParser::new();
        let entries = parser.import("@book{b, title = {T}}").unwrap();
        assert_eq!(entries[0].entry_type(), "book");
        assert_eq!(parser.format_name(), "BibTeX");
        assert_eq!(parser.extensions(), &["bib"]);
    }

    #[test]
    fn test_empty_input() {
        let result = BibtexParser::new().parse_database("").unwrap();
        assert!(result.entries.is_empty());
        assert_eq!(result.epilog, "");
    }
}
