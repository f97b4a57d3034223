//! A collection of entries together with `@String` definitions, preamble, prolog and
//! epilog.
//!
//! # Example
//!
//! ```
//! use bibcanon::{BibDatabase, BibEntry};
//!
//! let mut database = BibDatabase::new();
//! database.set_string("acm", "ACM");
//!
//! let mut entry = BibEntry::with_id("1");
//! entry.set_citation_key("doe").unwrap();
//! entry.set_field("publisher", "#acm# Press").unwrap();
//! database.insert_entry(entry).unwrap();
//!
//! let entry = database.entry_by_key("doe").unwrap();
//! assert_eq!(
//!     database.resolved_field("publisher", entry).as_deref(),
//!     Some("ACM Press")
//! );
//! ```

use std::collections::BTreeMap;

use crate::entry::{BibEntry, KEY_FIELD};
use crate::regex::replace_string_references;
use crate::{BibError, Result};

/// Field naming the parent entry whose fields are inherited.
pub const CROSSREF_FIELD: &str = "crossref";

/// Nested string definitions are expanded at most this many times.
const MAX_STRING_DEPTH: usize = 10;

/// An ordered set of entries.
#[derive(Debug, Clone, Default)]
pub struct BibDatabase {
    entries: Vec<BibEntry>,
    strings: BTreeMap<String, String>,
    preamble: Option<String>,
    prolog: String,
    epilog: String,
}

impl BibDatabase {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[BibEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends an entry.
    ///
    /// # Errors
    ///
    /// Returns [`BibError::DuplicateId`] if an entry with the same id is already present.
    pub fn insert_entry(&mut self, entry: BibEntry) -> Result<()> {
        if self.entry_by_id(entry.id()).is_some() {
            return Err(BibError::DuplicateId(entry.id().to_string()));
        }
        if let Some(key) = entry.citation_key() {
            if self.is_key_in_use(key, None) {
                tracing::warn!(key, "citation key used by more than one entry");
            }
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Removes and returns the entry with the given id.
    pub fn remove_entry(&mut self, id: &str) -> Option<BibEntry> {
        let index = self.entries.iter().position(|e| e.id() == id)?;
        Some(self.entries.remove(index))
    }

    pub fn entry_by_id(&self, id: &str) -> Option<&BibEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    /// First entry carrying the citation key.
    pub fn entry_by_key(&self, key: &str) -> Option<&BibEntry> {
        self.entries.iter().find(|e| e.citation_key() == Some(key))
    }

    /// Whether an entry other than `except_id` uses the citation key.
    pub fn is_key_in_use(&self, key: &str, except_id: Option<&str>) -> bool {
        self.entries
            .iter()
            .any(|e| e.citation_key() == Some(key) && Some(e.id()) != except_id)
    }

    /// Sets a field on the entry with the given id.
    ///
    /// # Errors
    ///
    /// - [`BibError::UnknownEntry`] if no entry has the id
    /// - [`BibError::DuplicateKey`] if the citation key is taken by another entry
    /// - any error of [`BibEntry::set_field`]
    pub fn set_entry_field(&mut self, id: &str, name: &str, value: &str) -> Result<()> {
        if name.eq_ignore_ascii_case(KEY_FIELD)
            && !value.is_empty()
            && self.is_key_in_use(value, Some(id))
        {
            return Err(BibError::DuplicateKey(value.to_string()));
        }
        self.entry_mut(id)?.set_field(name, value)
    }

    pub fn clear_entry_field(&mut self, id: &str, name: &str) -> Result<()> {
        self.entry_mut(id)?.clear_field(name)
    }

    fn entry_mut(&mut self, id: &str) -> Result<&mut BibEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or_else(|| BibError::UnknownEntry(id.to_string()))
    }

    /// Value of `name` for `entry`, inherited through `crossref` when missing and with
    /// string references expanded.
    pub fn resolved_field(&self, name: &str, entry: &BibEntry) -> Option<String> {
        let value = entry.field(name).or_else(|| {
            let parent = self.entry_by_key(entry.field(CROSSREF_FIELD)?)?;
            parent.field(name)
        })?;
        Some(self.resolve_strings(value))
    }

    /// Replaces `#name#` references with their `@String` definitions.
    ///
    /// Unknown references, such as month abbreviations, are kept as they are.
    pub fn resolve_strings(&self, value: &str) -> String {
        let mut resolved = value.to_string();
        for _ in 0..MAX_STRING_DEPTH {
            let next = replace_string_references(&resolved, |name| self.string(name));
            if next == resolved {
                break;
            }
            resolved = next;
        }
        resolved
    }

    /// Definition of a string, looked up case-insensitively.
    pub fn string(&self, name: &str) -> Option<&str> {
        self.strings
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Defines a string, replacing any definition with the same name in another case.
    pub fn set_string(&mut self, name: &str, value: &str) {
        self.strings.retain(|key, _| !key.eq_ignore_ascii_case(name));
        self.strings.insert(name.to_string(), value.to_string());
    }

    pub fn remove_string(&mut self, name: &str) {
        self.strings.retain(|key, _| !key.eq_ignore_ascii_case(name));
    }

    /// All string definitions, sorted by name.
    pub fn strings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.strings.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn preamble(&self) -> Option<&str> {
        self.preamble.as_deref()
    }

    pub fn set_preamble(&mut self, preamble: Option<String>) {
        self.preamble = preamble;
    }

    /// Text written before the preamble and string definitions.
    pub fn prolog(&self) -> &str {
        &self.prolog
    }

    pub fn set_prolog(&mut self, prolog: impl Into<String>) {
        self.prolog = prolog.into();
    }

    /// Text written after the last entry.
    pub fn epilog(&self) -> &str {
        &self.epilog
    }

    pub fn set_epilog(&mut self, epilog: impl Into<String>) {
        self.epilog = epilog.into();
    }
}
