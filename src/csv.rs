//! CSV importer for simple positional bibliography lists.
//!
//! Every non-blank line is one entry; its columns are mapped by position to fields.
//! The default mapping is `year, author, title, publisher` on a `book` entry.
//!
//! # Example
//!
//! ```
//! use bibcanon::{CsvContentImporter, EntryImporter};
//!
//! let input = "1999,Jane Doe,My Title,Acme Press";
//!
//! let importer = CsvContentImporter::new();
//! let entries = importer.import(input).unwrap();
//! assert_eq!(entries[0].entry_type(), "book");
//! assert_eq!(entries[0].field("author"), Some("Jane Doe"));
//! assert_eq!(entries[0].field("publisher"), Some("Acme Press"));
//! ```

mod structure;

use csv::{ReaderBuilder, Trim};

use crate::utils::is_blank;
use crate::{BibEntry, EntryImporter, Result};
use structure::RawCsvRow;

/// Default positional column mapping
const DEFAULT_COLUMNS: &[&str] = &["year", "author", "title", "publisher"];

const DEFAULT_ENTRY_TYPE: &str = "book";

/// Configuration for CSV importing.
///
/// Columns are positional: the first column fills the first configured field, and so
/// on. Values are split on the delimiter only; quotes have no special meaning.
///
/// # Examples
///
/// ```
/// use bibcanon::csv::CsvConfig;
///
/// let mut config = CsvConfig::new();
/// config
///     .set_columns(&["title", "year"])
///     .set_delimiter(b';')
///     .set_entry_type("misc");
/// ```
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Field names in column order
    pub(crate) columns: Vec<String>,
    /// Delimiter to use for splitting lines
    pub(crate) delimiter: u8,
    /// Whether to trim whitespace around values
    pub(crate) trim: bool,
    /// Type of the created entries
    pub(crate) entry_type: String,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvConfig {
    /// Creates a new CSV configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            columns: DEFAULT_COLUMNS.iter().map(|s| s.to_string()).collect(),
            delimiter: b',',
            trim: false,
            entry_type: DEFAULT_ENTRY_TYPE.to_string(),
        }
    }

    /// Sets the field names in column order
    pub fn set_columns<S: AsRef<str>>(&mut self, columns: &[S]) -> &mut Self {
        self.columns = columns.iter().map(|c| c.as_ref().to_lowercase()).collect();
        self
    }

    /// Sets the delimiter character
    pub fn set_delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    pub fn set_trim(&mut self, trim: bool) -> &mut Self {
        self.trim = trim;
        self
    }

    pub fn set_entry_type(&mut self, entry_type: &str) -> &mut Self {
        self.entry_type = entry_type.to_string();
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Importer for positional CSV lines.
///
/// # Examples
///
/// With custom configuration:
/// ```
/// use bibcanon::EntryImporter;
/// use bibcanon::csv::{CsvConfig, CsvContentImporter};
///
/// let mut config = CsvConfig::new();
/// config.set_delimiter(b';').set_trim(true);
///
/// let importer = CsvContentImporter::new().with_config(config);
/// let entries = importer.import("2001 ; Doe ; Title ; Press").unwrap();
/// assert_eq!(entries[0].field("year"), Some("2001"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CsvContentImporter {
    config: CsvConfig,
}

impl CsvContentImporter {
    /// Creates a new importer with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: CsvConfig::new(),
        }
    }

    /// Creates a new importer with custom configuration
    #[must_use]
    pub fn with_config(mut self, config: CsvConfig) -> Self {
        self.config = config;
        self
    }
}

impl EntryImporter for CsvContentImporter {
    /// Imports every non-blank line as one entry.
    ///
    /// # Errors
    ///
    /// Returns [`BibError::MalformedInput`](crate::BibError::MalformedInput) for a line
    /// with fewer columns than configured.
    fn import(&self, input: &str) -> Result<Vec<BibEntry>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .trim(if self.config.trim { Trim::All } else { Trim::None })
            .from_reader(input.as_bytes());

        let mut entries = Vec::new();
        for result in reader.records() {
            let record = result?;
            if record.iter().all(is_blank) {
                continue;
            }
            let line = record.position().map_or(0, |p| p.line() as usize);
            let row = RawCsvRow::from_record(&record, &self.config, line)?;
            entries.push(row.into_entry(&self.config)?);
        }

        tracing::debug!(entries = entries.len(), "imported CSV input");
        Ok(entries)
    }

    fn format_name(&self) -> &'static str {
        "CSV"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["csv"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BibError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_basic_csv() {
        let entries = CsvContentImporter::new()
            .import("1999,Jane Doe,My Title,Acme Press")
            .unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.entry_type(), "book");
        assert_eq!(entry.field("year"), Some("1999"));
        assert_eq!(entry.field("author"), Some("Jane Doe"));
        assert_eq!(entry.field("title"), Some("My Title"));
        assert_eq!(entry.field("publisher"), Some("Acme Press"));
        assert_eq!(entry.field_count(), 4);
    }

    #[test]
    fn test_every_line_is_imported() {
        let input = "\
1999,Jane Doe,First,Acme
2000,John Roe,Second,Acme

2001,Max Moe,Third,Acme
";
        let entries = CsvContentImporter::new().import(input).unwrap();
        let titles: Vec<_> = entries.iter().filter_map(|e| e.field("title")).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_short_row_is_malformed() {
        let input = "1999,Jane Doe,Title,Acme\n2000,John Roe";
        let err = CsvContentImporter::new().import(input).unwrap_err();
        match err {
            BibError::MalformedInput { line, message } => {
                assert_eq!(line, 2);
                assert_eq!(message, "expected 4 columns but found 2");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let entries = CsvContentImporter::new()
            .import("1999,Jane Doe,Title,Acme,extra,more")
            .unwrap();
        assert_eq!(entries[0].field_count(), 4);
        assert_eq!(entries[0].field("publisher"), Some("Acme"));
    }

    #[test]
    fn test_quotes_are_literal() {
        let entries = CsvContentImporter::new()
            .import("2001,\"Jane Doe\",Title,Press")
            .unwrap();
        assert_eq!(entries[0].field("author"), Some("\"Jane Doe\""));
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let entries = CsvContentImporter::new()
            .import("2001,,Title,Press")
            .unwrap();
        assert!(!entries[0].has_field("author"));
        assert_eq!(entries[0].field_count(), 3);
    }

    #[test]
    fn test_custom_config() {
        let mut config = CsvConfig::new();
        config
            .set_columns(&["Title", "Year"])
            .set_delimiter(b'\t')
            .set_trim(true)
            .set_entry_type("misc");

        let entries = CsvContentImporter::new()
            .with_config(config)
            .import(" Some Title \t 2004 ")
            .unwrap();
        assert_eq!(entries[0].entry_type(), "misc");
        assert_eq!(entries[0].field("title"), Some("Some Title"));
        assert_eq!(entries[0].field("year"), Some("2004"));
    }

    #[test]
    fn test_untrimmed_by_default() {
        let entries = CsvContentImporter::new()
            .import("1999, Jane Doe,Title,Press")
            .unwrap();
        assert_eq!(entries[0].field("author"), Some(" Jane Doe"));
    }

    #[test]
    fn test_blank_input() {
        let importer = CsvContentImporter::new();
        assert!(importer.import("").unwrap().is_empty());
        assert!(importer.import("   \n\n").unwrap().is_empty());
        assert_eq!(importer.format_name(), "CSV");
        assert_eq!(importer.extensions(), &["csv"]);
    }

    #[test]
    fn test_entries_are_new() {
        let entries = CsvContentImporter::new()
            .import("1999,Jane Doe,Title,Acme\n1999,Jane Doe,Title,Acme")
            .unwrap();
        assert!(entries[0].has_changed());
        assert_ne!(entries[0].id(), entries[1].id());
        assert_eq!(entries[0], entries[1]);
    }
}
