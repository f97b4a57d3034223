//! Intermediate structures produced by the BibTeX scanner.

use crate::bibtex::ParseWarning;
use crate::entry::{BibEntry, ID_FIELD};
use crate::Result;

/// Top-level item found after an `@`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawItem {
    Entry(RawBibtexEntry),
    String { name: String, value: String },
    Preamble(String),
    Comment,
}

/// An entry as scanned, before field names are normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RawBibtexEntry {
    pub(crate) entry_type: String,
    pub(crate) key: String,
    /// Fields in source order with their original spelling
    pub(crate) fields: Vec<(String, String)>,
    /// Source text from the end of the previous item through this entry
    pub(crate) serialization: String,
    /// Offset of this entry's `@` within `serialization`
    pub(crate) header_offset: usize,
    pub(crate) line: usize,
}

impl RawBibtexEntry {
    /// Builds the entry and attaches the serialization, leaving it unchanged.
    ///
    /// Repeated `author` or `editor` fields are joined with `and`; any other repeated
    /// field keeps its first value.
    pub(crate) fn into_entry(self, warnings: &mut Vec<ParseWarning>) -> Result<BibEntry> {
        let mut entry = BibEntry::with_type(&self.entry_type);
        if !self.key.is_empty() {
            entry.set_citation_key(&self.key)?;
        }

        for (name, value) in self.fields {
            let lower = name.to_lowercase();
            if lower == ID_FIELD {
                warnings.push(ParseWarning::new(
                    self.line,
                    format!("field '{name}' is reserved and was dropped"),
                ));
                continue;
            }
            match entry.field(&lower) {
                Some(existing) if lower == "author" || lower == "editor" => {
                    let joined = format!("{existing} and {value}");
                    entry.set_field(&lower, &joined)?;
                }
                Some(_) => warnings.push(ParseWarning::new(
                    self.line,
                    format!("duplicate field '{name}' ignored"),
                )),
                None => entry.set_field(&lower, &value)?,
            }
        }

        entry.set_parsed_serialization_at(self.serialization, self.header_offset);
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(fields: &[(&str, &str)]) -> RawBibtexEntry {
        RawBibtexEntry {
            entry_type: "Article".to_string(),
            key: "k".to_string(),
            fields: fields
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            serialization: "% note\n@Article{k}".to_string(),
            header_offset: 7,
            line: 3,
        }
    }

    #[test]
    fn test_into_entry() {
        let mut warnings = Vec::new();
        let entry = raw(&[("Title", "T"), ("Year", "2001")])
            .into_entry(&mut warnings)
            .unwrap();
        assert_eq!(entry.entry_type(), "article");
        assert_eq!(entry.citation_key(), Some("k"));
        assert_eq!(entry.field("title"), Some("T"));
        assert_eq!(entry.parsed_serialization(), Some("% note\n@Article{k}"));
        assert_eq!(entry.user_comments(), "% note");
        assert!(!entry.has_changed());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_duplicate_authors_are_joined() {
        let mut warnings = Vec::new();
        let entry = raw(&[("author", "A"), ("Author", "B"), ("editor", "E")])
            .into_entry(&mut warnings)
            .unwrap();
        assert_eq!(entry.field("author"), Some("A and B"));
        assert_eq!(entry.field("editor"), Some("E"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_duplicate_field_keeps_first() {
        let mut warnings = Vec::new();
        let entry = raw(&[("title", "First"), ("TITLE", "Second"), ("id", "x")])
            .into_entry(&mut warnings)
            .unwrap();
        assert_eq!(entry.field("title"), Some("First"));
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].line, 3);
    }
}
