//! Explicit checks for year, citation key and capitalization.
//!
//! Validation never changes an entry by itself. [`EntryValidator::validate_entry`]
//! reports [`ValidationIssue`]s, some of which carry a suggested replacement value, and
//! [`EntryValidator::apply_suggestions`] writes those suggestions back through the
//! regular field API so listeners still see every change.
//!
//! # Example
//!
//! ```
//! use bibcanon::{BibEntry, EntryValidator};
//!
//! let mut entry = BibEntry::with_id_and_type("42", "article");
//! entry.set_field("title", "lowercase title").unwrap();
//! entry.set_citation_key("1").unwrap();
//!
//! let validator = EntryValidator::new();
//! let issues = validator.validate_entry(&entry);
//! assert_eq!(issues.len(), 2);
//!
//! validator.apply_suggestions(&mut entry, &issues).unwrap();
//! assert_eq!(entry.citation_key(), Some("Art42"));
//! assert_eq!(entry.field("title"), Some("Lowercase title"));
//! ```

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entry::types::BibDatabaseMode;
use crate::entry::{BibEntry, KEY_FIELD};
use crate::utils::capitalize_first;
use crate::Result;

const DEFAULT_TYPES: &[&str] = &["article", "book"];
const DEFAULT_MIN_YEAR: i64 = 1970;
const DEFAULT_CAPITALIZED_FIELDS: &[&str] = &["title", "publisher", "author", "editor", "journal"];

/// Which entries and fields are checked.
///
/// # Examples
///
/// ```
/// use bibcanon::ValidationConfig;
///
/// let mut config = ValidationConfig::new();
/// config
///     .set_types(&["article", "book", "inproceedings"])
///     .set_year_range(1900, Some(2030));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Entry types that are validated; others pass unchecked
    types: Vec<String>,
    min_year: i64,
    /// Latest accepted year, the current year when unset
    max_year: Option<i64>,
    capitalized_fields: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: DEFAULT_TYPES.iter().map(|s| s.to_string()).collect(),
            min_year: DEFAULT_MIN_YEAR,
            max_year: None,
            capitalized_fields: DEFAULT_CAPITALIZED_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn set_types<S: AsRef<str>>(&mut self, types: &[S]) -> &mut Self {
        self.types = types.iter().map(|t| t.as_ref().to_lowercase()).collect();
        self
    }

    pub fn set_year_range(&mut self, min_year: i64, max_year: Option<i64>) -> &mut Self {
        self.min_year = min_year;
        self.max_year = max_year;
        self
    }

    pub fn set_capitalized_fields<S: AsRef<str>>(&mut self, fields: &[S]) -> &mut Self {
        self.capitalized_fields = fields.iter().map(|f| f.as_ref().to_lowercase()).collect();
        self
    }

    /// Accepted year range, inclusive.
    pub fn year_range(&self) -> (i64, i64) {
        let max_year = self
            .max_year
            .unwrap_or_else(|| i64::from(Local::now().year()));
        (self.min_year, max_year)
    }
}

/// Kind of problem found in a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    YearNotNumeric,
    YearOutOfRange,
    InvalidCitationKey,
    LowercaseStart,
}

/// A problem found in one field, optionally with a replacement value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub kind: IssueKind,
    pub message: String,
    pub suggestion: Option<String>,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (suggested: {suggestion})")?;
        }
        Ok(())
    }
}

/// Key offered for an entry whose citation key is invalid.
///
/// `Art<id>` for articles, `Book<id>` for books and `<Type><id>` for everything else.
pub fn suggested_citation_key(entry: &BibEntry) -> String {
    let prefix = match entry.entry_type() {
        "article" => "Art".to_string(),
        "book" => "Book".to_string(),
        other => BibDatabaseMode::Bibtex.display_name(other),
    };
    format!("{prefix}{}", entry.id())
}

/// A citation key must start with a letter and have more than one character.
fn is_valid_citation_key(key: &str) -> bool {
    let mut chars = key.chars();
    chars.next().is_some_and(char::is_alphabetic) && chars.next().is_some()
}

#[derive(Debug, Clone, Default)]
pub struct EntryValidator {
    config: ValidationConfig,
}

impl EntryValidator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    /// Whether entries of this type are validated at all.
    pub fn applies_to(&self, entry: &BibEntry) -> bool {
        self.config.types.iter().any(|t| t == entry.entry_type())
    }

    /// Checks every relevant field of the entry.
    pub fn validate_entry(&self, entry: &BibEntry) -> Vec<ValidationIssue> {
        if !self.applies_to(entry) {
            return Vec::new();
        }
        let issues: Vec<ValidationIssue> = entry
            .fields()
            .filter_map(|(name, value)| self.check(entry, name, value))
            .collect();
        if !issues.is_empty() {
            tracing::debug!(entry = entry.id(), issues = issues.len(), "entry has validation issues");
        }
        issues
    }

    /// Checks a value before it is set on the entry.
    pub fn validate_field(
        &self,
        entry: &BibEntry,
        name: &str,
        value: &str,
    ) -> Option<ValidationIssue> {
        if !self.applies_to(entry) {
            return None;
        }
        self.check(entry, &name.to_lowercase(), value)
    }

    /// Sets every suggested value on the entry, returning how many were applied.
    ///
    /// Issues without a suggestion, such as year problems, are left for the caller.
    ///
    /// # Errors
    ///
    /// Stops at the first change rejected by the entry or one of its listeners.
    pub fn apply_suggestions(
        &self,
        entry: &mut BibEntry,
        issues: &[ValidationIssue],
    ) -> Result<usize> {
        let mut applied = 0;
        for issue in issues {
            if let Some(suggestion) = &issue.suggestion {
                entry.set_field(&issue.field, suggestion)?;
                applied += 1;
            }
        }
        Ok(applied)
    }

    fn check(&self, entry: &BibEntry, name: &str, value: &str) -> Option<ValidationIssue> {
        if name == "year" {
            return self.check_year(value);
        }
        if name == KEY_FIELD {
            if is_valid_citation_key(value) {
                return None;
            }
            return Some(ValidationIssue {
                field: KEY_FIELD.to_string(),
                kind: IssueKind::InvalidCitationKey,
                message: format!("citation key '{value}' must start with a letter and have at least two characters"),
                suggestion: Some(suggested_citation_key(entry)),
            });
        }
        if self.config.capitalized_fields.iter().any(|f| f == name) {
            let suggestion = capitalize_first(value)?;
            return Some(ValidationIssue {
                field: name.to_string(),
                kind: IssueKind::LowercaseStart,
                message: format!("{name} should start with an upper case letter"),
                suggestion: Some(suggestion),
            });
        }
        None
    }

    fn check_year(&self, value: &str) -> Option<ValidationIssue> {
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
            return Some(ValidationIssue {
                field: "year".to_string(),
                kind: IssueKind::YearNotNumeric,
                message: format!("year '{value}' is not a number"),
                suggestion: None,
            });
        }
        let (min_year, max_year) = self.config.year_range();
        let in_range = value
            .parse::<i64>()
            .is_ok_and(|year| (min_year..=max_year).contains(&year));
        if in_range {
            return None;
        }
        Some(ValidationIssue {
            field: "year".to_string(),
            kind: IssueKind::YearOutOfRange,
            message: format!("year {value} is outside {min_year}..={max_year}"),
            suggestion: None,
        })
    }
}
