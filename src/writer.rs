//! Canonical BibTeX serialization of entries and databases.
//!
//! An entry that is unchanged since it was parsed is written back verbatim, so a file
//! read and written without edits stays byte-identical. Every other entry is regenerated
//! in a fixed layout:
//!
//! - required fields of the entry type, then optional fields, in declared order
//! - remaining fields alphabetically, except the internal bookkeeping fields
//!   (`comment`, `review`, `owner`, `timestamp`, `groups`) which always come last
//! - field names padded to the longest name of the entry
//! - blank values skipped and values trimmed
//!
//! # Example
//!
//! ```
//! use bibcanon::{BibDatabaseMode, BibEntry, BibEntryWriter};
//!
//! let mut entry = BibEntry::with_type("article");
//! entry.set_citation_key("test").unwrap();
//! entry.set_field("author", "Foo Bar").unwrap();
//! entry.set_field("journal", "International Journal of Something").unwrap();
//!
//! let text = BibEntryWriter::new().serialize(&entry, BibDatabaseMode::Bibtex).unwrap();
//! assert_eq!(
//!     text,
//!     "\n@Article{test,\n  author  = {Foo Bar},\n  journal = {International Journal of Something},\n}\n"
//! );
//! ```

mod formatter;

pub use formatter::LatexFieldFormatter;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{self, Write as _};

use crate::Result;
use crate::database::BibDatabase;
use crate::entry::types::BibDatabaseMode;
use crate::entry::{BibEntry, KEY_FIELD};
use crate::utils::shave_string;

/// Internal bookkeeping fields, written after all others in this order.
pub const TRAILING_FIELDS: &[&str] = &["comment", "review", "owner", "timestamp", "groups"];

/// Line separator used for regenerated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Newline {
    #[default]
    Lf,
    CrLf,
}

impl Newline {
    pub fn as_str(self) -> &'static str {
        match self {
            Newline::Lf => "\n",
            Newline::CrLf => "\r\n",
        }
    }
}

/// Configuration for [`BibEntryWriter`].
///
/// # Examples
///
/// ```
/// use bibcanon::{Newline, WriterConfig};
///
/// let mut config = WriterConfig::new();
/// config.set_newline(Newline::CrLf).set_reformat(true);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriterConfig {
    pub(crate) newline: Newline,
    /// Regenerate unchanged entries instead of echoing their parsed text
    pub(crate) reformat: bool,
}

impl WriterConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_newline(&mut self, newline: Newline) -> &mut Self {
        self.newline = newline;
        self
    }

    pub fn set_reformat(&mut self, reformat: bool) -> &mut Self {
        self.reformat = reformat;
        self
    }
}

/// Writes entries in canonical BibTeX form.
#[derive(Debug, Clone, Default)]
pub struct BibEntryWriter {
    config: WriterConfig,
    formatter: LatexFieldFormatter,
}

impl BibEntryWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(mut self, config: WriterConfig) -> Self {
        self.config = config;
        self
    }

    /// Writes one entry to `out`.
    ///
    /// Nothing is written if a field value cannot be formatted.
    ///
    /// # Errors
    ///
    /// Returns [`BibError::InvalidFieldValue`](crate::BibError::InvalidFieldValue) for
    /// unbalanced braces or stray `#` characters, or a formatting error from `out`.
    pub fn write<W: fmt::Write>(
        &self,
        entry: &BibEntry,
        out: &mut W,
        mode: BibDatabaseMode,
    ) -> Result<()> {
        if !self.config.reformat && !entry.has_changed() {
            if let Some(serialization) = entry.parsed_serialization() {
                out.write_str(serialization)?;
                return Ok(());
            }
        }

        let newline = self.config.newline.as_str();
        let body = self.regenerate(entry, mode)?;

        let comments = entry.user_comments();
        if !comments.is_empty() {
            out.write_str(comments)?;
            out.write_str(newline)?;
        }
        out.write_str(newline)?;
        out.write_str(&body)?;
        Ok(())
    }

    /// Serializes one entry into a new string.
    pub fn serialize(&self, entry: &BibEntry, mode: BibDatabaseMode) -> Result<String> {
        let mut out = String::new();
        self.write(entry, &mut out, mode)?;
        Ok(out)
    }

    /// Writes a whole database: prolog, preamble, string definitions, entries and epilog.
    pub fn write_database<W: fmt::Write>(
        &self,
        database: &BibDatabase,
        out: &mut W,
        mode: BibDatabaseMode,
    ) -> Result<()> {
        let newline = self.config.newline.as_str();

        out.write_str(database.prolog())?;
        if let Some(preamble) = database.preamble() {
            let formatted = self.formatter.format(preamble, "preamble")?;
            write!(out, "@Preamble{{{formatted}}}{newline}")?;
        }
        for (name, value) in database.strings() {
            let formatted = self.formatter.format(value, name)?;
            write!(out, "@String{{{name} = {formatted}}}{newline}")?;
        }
        for entry in database.entries() {
            self.write(entry, out, mode)?;
        }
        out.write_str(database.epilog())?;
        Ok(())
    }

    pub fn serialize_database(
        &self,
        database: &BibDatabase,
        mode: BibDatabaseMode,
    ) -> Result<String> {
        let mut out = String::new();
        self.write_database(database, &mut out, mode)?;
        Ok(out)
    }

    fn regenerate(&self, entry: &BibEntry, mode: BibDatabaseMode) -> Result<String> {
        let newline = self.config.newline.as_str();
        let key = entry.citation_key().map(shave_string).unwrap_or_default();

        let mut text = String::new();
        write!(
            text,
            "@{}{{{key},{newline}",
            mode.display_name(entry.entry_type())
        )?;

        let indentation = entry
            .field_names()
            .filter(|name| is_writable(name))
            .map(|name| name.chars().count())
            .max()
            .unwrap_or(0);

        for name in field_order(entry, mode) {
            let Some(value) = entry.field(name) else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let formatted = self.formatter.format(value, name)?;
            write!(text, "  {name:<indentation$} = {formatted},{newline}")?;
        }

        text.push('}');
        text.push_str(newline);
        Ok(text)
    }
}

fn is_writable(name: &str) -> bool {
    name != KEY_FIELD && !name.starts_with("__")
}

/// Order in which the fields of `entry` are written.
fn field_order<'a>(entry: &'a BibEntry, mode: BibDatabaseMode) -> Vec<&'a str> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut order = Vec::new();

    if let Some(entry_type) = mode.entry_type(entry.entry_type()) {
        for name in entry_type
            .required_fields_flat()
            .chain(entry_type.optional_fields_flat())
        {
            if seen.insert(name) {
                order.push(name);
            }
        }
    }

    for name in entry.field_names() {
        if is_writable(name) && !TRAILING_FIELDS.contains(&name) && seen.insert(name) {
            order.push(name);
        }
    }

    for &name in TRAILING_FIELDS {
        if seen.insert(name) {
            order.push(name);
        }
    }
    order
}
