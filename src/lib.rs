//! A library for the BibTeX entry model and its canonical serialization.
//!
//! `bibcanon` keeps bibliographic entries as flat, case-insensitive field maps and writes
//! them back out in a deterministic layout. Entries read from BibTeX text remember the
//! exact text they came from, so untouched entries are written back byte for byte.
//!
//! # Key Features
//!
//! - **Entry model**: lowercase field storage, change tracking and vetoable change
//!   notification through [`FieldChangeListener`]
//! - **Canonical writer**: required fields first, aligned `=` signs, trimmed values and
//!   verbatim output for unmodified entries
//! - **Parsing**: BibTeX entries, `@string` definitions and `@preamble`
//! - **Importing**: simple `year,author,title,publisher` CSV lines
//! - **Validation**: explicit year, citation key and capitalization checks
//!
//! # Basic Usage
//!
//! ```rust
//! use bibcanon::{BibDatabaseMode, BibEntryWriter, BibtexParser};
//!
//! let input = "@Article{test,\n  Author = {Foo Bar},\n  Number = {1}\n}";
//! let mut result = BibtexParser::new().parse_database(input).unwrap();
//! let entry = &mut result.entries[0];
//!
//! // Untouched entries are written back verbatim
//! let writer = BibEntryWriter::new();
//! assert_eq!(writer.serialize(entry, BibDatabaseMode::Bibtex).unwrap(), input);
//!
//! // Modified entries are regenerated
//! entry.set_field("author", "BlaBla").unwrap();
//! let text = writer.serialize(entry, BibDatabaseMode::Bibtex).unwrap();
//! assert!(text.contains("  author = {BlaBla},"));
//! ```
//!
//! # Error Handling
//!
//! The library uses a custom [`Result`] type that wraps [`BibError`]:
//!
//! ```rust
//! use bibcanon::{BibEntry, BibError};
//!
//! let mut entry = BibEntry::new();
//! match entry.set_field("id", "other") {
//!     Err(BibError::ReservedField(name)) => assert_eq!(name, "id"),
//!     _ => unreachable!(),
//! }
//! ```

use thiserror::Error;

#[cfg(feature = "csv")]
extern crate csv as csv_crate;

pub mod bibtex;
#[cfg(feature = "csv")]
pub mod csv;
pub mod database;
pub mod entry;
mod regex;
mod utils;
pub mod validation;
pub mod writer;

// Reexports
pub use bibtex::{BibtexParser, ParseWarning, ParserResult};
#[cfg(feature = "csv")]
pub use crate::csv::CsvContentImporter;
pub use database::BibDatabase;
pub use entry::change::{FieldChange, FieldChangeListener, Veto};
pub use entry::month::Month;
pub use entry::types::{BibDatabaseMode, EntryType};
pub use entry::BibEntry;
pub use validation::{EntryValidator, IssueKind, ValidationConfig, ValidationIssue};
pub use writer::{BibEntryWriter, LatexFieldFormatter, Newline, WriterConfig};

/// A specialized Result type for entry operations.
pub type Result<T> = std::result::Result<T, BibError>;

/// Represents errors that can occur while building, importing or writing entries.
#[derive(Error, Debug)]
pub enum BibError {
    #[error("Parse error: {0}")]
    InvalidFormat(String),

    #[error("Invalid field name: '{0}'")]
    InvalidFieldName(String),

    #[error("The field name '{0}' is reserved")]
    ReservedField(String),

    #[error("Change rejected for field {field}: {reason}")]
    ChangeRejected { field: String, reason: String },

    #[error("Invalid field value: {field} - {message}")]
    InvalidFieldValue { field: String, message: String },

    #[error("Malformed input: {message} at line {line}")]
    MalformedInput { message: String, line: usize },

    #[error("Citation key already in use: {0}")]
    DuplicateKey(String),

    #[error("Entry id already in use: {0}")]
    DuplicateId(String),

    #[error("No entry with id: {0}")]
    UnknownEntry(String),

    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

#[cfg(feature = "csv")]
impl From<csv_crate::Error> for BibError {
    fn from(err: csv_crate::Error) -> Self {
        BibError::InvalidFormat(err.to_string())
    }
}

/// Trait for implementing entry importers.
pub trait EntryImporter {
    /// Import a string containing zero or more entries.
    ///
    /// # Errors
    ///
    /// Returns `BibError` if the input is malformed
    fn import(&self, input: &str) -> Result<Vec<BibEntry>>;

    /// Human readable name of the import format.
    fn format_name(&self) -> &'static str;

    /// File extensions usually carrying this format, without the leading dot.
    fn extensions(&self) -> &'static [&'static str];
}
