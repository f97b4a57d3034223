//! The bibliographic entry model.
//!
//! A [`BibEntry`] is a type tag plus a map from lowercase field name to value. Field
//! names are case-insensitive on every accessor. Mutations go through
//! [`BibEntry::set_field`] and friends, which consult the registered
//! [`FieldChangeListener`]s and mark the entry as changed.
//!
//! # Example
//!
//! ```
//! use bibcanon::BibEntry;
//!
//! let mut entry = BibEntry::with_type("article");
//! entry.set_field("Author", "Foo Bar").unwrap();
//! entry.set_field("date", "2003-05-21").unwrap();
//!
//! assert_eq!(entry.field("AUTHOR"), Some("Foo Bar"));
//! assert_eq!(entry.field_or_alias("year").as_deref(), Some("2003"));
//! assert_eq!(entry.field_or_alias("month").as_deref(), Some("5"));
//! ```

pub mod change;
pub mod month;
pub mod types;

use chrono::{Datelike, NaiveDate};
use compact_str::CompactString;
use itertools::Itertools;
use nanoid::nanoid;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::database::BibDatabase;
use crate::utils::split_keywords;
use crate::{BibError, Result};
use change::{FieldChange, FieldChangeListener, TYPE_HEADER};
use month::Month;

/// Field holding the citation key.
pub const KEY_FIELD: &str = "bibtexkey";
/// Reserved name of the internal identifier.
pub const ID_FIELD: &str = "id";
pub const DEFAULT_TYPE: &str = "misc";
pub const KEYWORDS_FIELD: &str = "keywords";

/// BibTeX names and their BibLaTeX counterparts, usable in both directions.
const FIELD_ALIASES: &[(&str, &str)] = &[
    ("address", "location"),
    ("annote", "annotation"),
    ("archiveprefix", "eprinttype"),
    ("journal", "journaltitle"),
    ("key", "sortkey"),
    ("pdf", "file"),
    ("primaryclass", "eprintclass"),
    ("school", "institution"),
];

fn alias_for(name: &str) -> Option<&'static str> {
    FIELD_ALIASES.iter().find_map(|&(bibtex, biblatex)| {
        if bibtex == name {
            Some(biblatex)
        } else if biblatex == name {
            Some(bibtex)
        } else {
            None
        }
    })
}

fn normalize_type(entry_type: &str) -> String {
    if entry_type.is_empty() {
        DEFAULT_TYPE.to_string()
    } else {
        entry_type.to_lowercase()
    }
}

fn normalize_field_name(name: &str) -> Result<CompactString> {
    if name.trim().is_empty() {
        return Err(BibError::InvalidFieldName(name.to_string()));
    }
    Ok(CompactString::from(name.to_lowercase()))
}

/// Splits a `date` value into year and, when present, month.
///
/// Tries `YYYY-MM-DD`, then `YYYY-MM`, then a bare four digit year.
fn parse_date(date: &str) -> Option<(i32, Option<u32>)> {
    let date = date.trim();
    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some((parsed.year(), Some(parsed.month())));
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(&format!("{date}-01"), "%Y-%m-%d") {
        return Some((parsed.year(), Some(parsed.month())));
    }
    if date.len() == 4 && date.chars().all(|c| c.is_ascii_digit()) {
        return date.parse().ok().map(|year| (year, None));
    }
    tracing::warn!(date, "could not parse date field");
    None
}

/// Byte offset of the last `@` that opens a line and does not start an `@comment`.
fn find_header_offset(text: &str) -> usize {
    text.match_indices('@')
        .map(|(pos, _)| pos)
        .filter(|&pos| {
            let line_start = text[..pos].rfind('\n').map_or(0, |i| i + 1);
            let opens_comment = text[pos + 1..]
                .get(..7)
                .is_some_and(|word| word.eq_ignore_ascii_case("comment"));
            text[line_start..pos].trim().is_empty() && !opens_comment
        })
        .last()
        .or_else(|| text.find('@'))
        .unwrap_or(0)
}

/// One bibliographic record.
///
/// Equality and hashing consider the type and the fields only; the id, the change flag
/// and the parsed serialization are ignored.
#[derive(Serialize, Deserialize)]
pub struct BibEntry {
    id: String,
    #[serde(rename = "type")]
    entry_type: String,
    fields: BTreeMap<CompactString, String>,
    parsed_serialization: Option<String>,
    /// Byte offset of the entry's own `@` inside the parsed serialization
    #[serde(default)]
    header_offset: usize,
    changed: bool,
    #[serde(skip)]
    listeners: Vec<Arc<dyn FieldChangeListener>>,
}

impl BibEntry {
    /// Creates an empty `misc` entry with a generated id.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(nanoid!())
    }

    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self::with_id_and_type(id, DEFAULT_TYPE)
    }

    /// Creates an empty entry of the given type with a generated id.
    #[must_use]
    pub fn with_type(entry_type: &str) -> Self {
        Self::with_id_and_type(nanoid!(), entry_type)
    }

    #[must_use]
    pub fn with_id_and_type(id: impl Into<String>, entry_type: &str) -> Self {
        Self {
            id: id.into(),
            entry_type: normalize_type(entry_type),
            fields: BTreeMap::new(),
            parsed_serialization: None,
            header_offset: 0,
            changed: true,
            listeners: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Changes the id, unless a listener vetoes it.
    pub fn set_id(&mut self, id: impl Into<String>) -> Result<()> {
        let id = id.into();
        self.notify(ID_FIELD, Some(self.id.as_str()), Some(id.as_str()))?;
        self.id = id;
        self.changed = true;
        Ok(())
    }

    /// Lowercase entry type, e.g. `article`.
    pub fn entry_type(&self) -> &str {
        &self.entry_type
    }

    /// Sets the type; an empty type becomes `misc`.
    pub fn set_type(&mut self, entry_type: &str) -> Result<()> {
        let new_type = normalize_type(entry_type);
        self.notify(
            TYPE_HEADER,
            Some(self.entry_type.as_str()),
            Some(new_type.as_str()),
        )?;
        self.entry_type = new_type;
        self.changed = true;
        Ok(())
    }

    /// Returns the value of the field, looked up case-insensitively.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name.to_lowercase().as_str())
            .map(String::as_str)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name.to_lowercase().as_str())
    }

    /// Names of all set fields, sorted.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(CompactString::as_str)
    }

    /// All fields as `(name, value)` pairs, sorted by name.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Sets a field and notifies listeners about the change.
    ///
    /// An empty value removes the field instead.
    ///
    /// # Errors
    ///
    /// - [`BibError::InvalidFieldName`] for an empty name
    /// - [`BibError::ReservedField`] for the `id` field
    /// - [`BibError::ChangeRejected`] if a listener vetoes; the entry is left untouched
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<()> {
        let field_name = normalize_field_name(name)?;
        if value.is_empty() {
            return self.clear_field(name);
        }
        if field_name.as_str() == ID_FIELD {
            return Err(BibError::ReservedField(name.to_string()));
        }

        let old_value = self.fields.get(&field_name).map(String::as_str);
        self.notify(&field_name, old_value, Some(value))?;

        self.fields.insert(field_name, value.to_string());
        self.changed = true;
        Ok(())
    }

    /// Removes a field and notifies listeners about the change.
    ///
    /// Clearing a field that is not set is a no-op.
    pub fn clear_field(&mut self, name: &str) -> Result<()> {
        let field_name = normalize_field_name(name)?;
        if field_name.as_str() == ID_FIELD {
            return Err(BibError::ReservedField(name.to_string()));
        }

        let Some(old_value) = self.fields.get(&field_name) else {
            return Ok(());
        };
        self.notify(&field_name, Some(old_value), None)?;

        self.fields.remove(&field_name);
        self.changed = true;
        Ok(())
    }

    /// Sets several fields, stopping at the first failure.
    pub fn set_fields<I, K, V>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in fields {
            self.set_field(name.as_ref(), value.as_ref())?;
        }
        Ok(())
    }

    /// Returns the field, or the value of its BibTeX/BibLaTeX alias.
    ///
    /// Dates get special treatment: `date` is composed from `year` and `month` when
    /// missing, and `year`/`month` are extracted from `date` when missing. An unparsable
    /// `date` yields `None`.
    pub fn field_or_alias(&self, name: &str) -> Option<String> {
        let name = name.to_lowercase();
        if let Some(value) = self.field(&name).filter(|v| !v.is_empty()) {
            return Some(value.to_string());
        }

        if let Some(alias) = alias_for(&name) {
            return self.field(alias).map(String::from);
        }

        match name.as_str() {
            "date" => {
                let year = self.field("year")?;
                match self.field("month").and_then(Month::parse) {
                    Some(month) => Some(format!("{year}-{}", month.two_digit_number())),
                    None => Some(year.to_string()),
                }
            }
            "year" => {
                let (year, _) = parse_date(self.field("date")?)?;
                Some(year.to_string())
            }
            "month" => {
                let (_, month) = parse_date(self.field("date")?)?;
                month.map(|m| m.to_string())
            }
            _ => None,
        }
    }

    pub fn citation_key(&self) -> Option<&str> {
        self.fields.get(KEY_FIELD).map(String::as_str)
    }

    pub fn set_citation_key(&mut self, key: &str) -> Result<()> {
        self.set_field(KEY_FIELD, key)
    }

    pub fn has_citation_key(&self) -> bool {
        self.citation_key().is_some_and(|key| !key.is_empty())
    }

    /// Publication date as `YYYY` or `YYYY-MM`, if a year is set.
    pub fn publication_date(&self) -> Option<String> {
        let year = self.field("year")?;
        match self.field("month").and_then(Month::parse) {
            Some(month) => Some(format!("{year}-{}", month.two_digit_number())),
            None => Some(year.to_string()),
        }
    }

    /// Short description in the form `Author: "Title" (Year)`.
    ///
    /// Missing parts are shown as `N/A`. With a non-zero `max_chars`, longer texts are
    /// cut and suffixed with `...`.
    pub fn author_title_year(&self, max_chars: usize) -> String {
        let text = format!(
            "{}: \"{}\" ({})",
            self.field("author").unwrap_or("N/A"),
            self.field("title").unwrap_or("N/A"),
            self.field("year").unwrap_or("N/A")
        );
        if max_chars == 0 || text.chars().count() <= max_chars {
            return text;
        }
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }

    /// Attaches the verbatim text this entry was parsed from and marks it unchanged.
    ///
    /// The entry's header is taken to be the last `@` that opens a line and does not
    /// start an `@comment`. Everything before it counts as user comments.
    pub fn set_parsed_serialization(&mut self, serialization: impl Into<String>) {
        let serialization = serialization.into();
        let offset = find_header_offset(&serialization);
        self.set_parsed_serialization_at(serialization, offset);
    }

    /// Like [`set_parsed_serialization`](Self::set_parsed_serialization), with the byte
    /// offset of the entry's `@` already known.
    pub fn set_parsed_serialization_at(
        &mut self,
        serialization: impl Into<String>,
        header_offset: usize,
    ) {
        let serialization = serialization.into();
        self.header_offset = if serialization.is_char_boundary(header_offset) {
            header_offset
        } else {
            find_header_offset(&serialization)
        };
        self.parsed_serialization = Some(serialization);
        self.changed = false;
    }

    pub fn parsed_serialization(&self) -> Option<&str> {
        self.parsed_serialization.as_deref()
    }

    /// Whether the entry was modified since its serialization was attached.
    pub fn has_changed(&self) -> bool {
        self.changed
    }

    pub fn set_changed(&mut self, changed: bool) {
        self.changed = changed;
    }

    /// Non-whitespace text that preceded the entry in its parsed serialization.
    pub fn user_comments(&self) -> &str {
        self.parsed_serialization
            .as_deref()
            .and_then(|text| text.get(..self.header_offset))
            .map_or("", str::trim)
    }

    pub fn separated_keywords(&self) -> Vec<String> {
        self.field(KEYWORDS_FIELD)
            .map(split_keywords)
            .unwrap_or_default()
    }

    /// Replaces the keyword list; an empty list removes the field.
    pub fn put_keywords<S: AsRef<str>>(&mut self, keywords: &[S]) -> Result<()> {
        let new_value = keywords.iter().map(AsRef::as_ref).join(", ");
        if new_value.is_empty() {
            return self.clear_field(KEYWORDS_FIELD);
        }
        if self.field(KEYWORDS_FIELD) == Some(new_value.as_str()) {
            return Ok(());
        }
        self.set_field(KEYWORDS_FIELD, &new_value)
    }

    /// Adds a keyword unless it is already present (case-insensitive).
    pub fn add_keyword(&mut self, keyword: &str) -> Result<()> {
        if keyword.is_empty() {
            return Ok(());
        }
        let mut keywords = self.separated_keywords();
        if keywords.iter().any(|k| k.eq_ignore_ascii_case(keyword)) {
            return Ok(());
        }
        keywords.push(keyword.to_string());
        self.put_keywords(&keywords)
    }

    pub fn add_keywords<S: AsRef<str>>(&mut self, keywords: &[S]) -> Result<()> {
        for keyword in keywords {
            self.add_keyword(keyword.as_ref())?;
        }
        Ok(())
    }

    /// Whether every listed field is set, following crossrefs when a database is given.
    ///
    /// A name like `author/editor` is satisfied by any one of its alternatives.
    pub fn all_fields_present(&self, fields: &[&str], database: Option<&BibDatabase>) -> bool {
        fields.iter().all(|field| {
            field.split('/').any(|alternative| {
                let value = match database {
                    Some(database) => database.resolved_field(alternative, self),
                    None => self.field(alternative).map(String::from),
                };
                value.is_some_and(|v| !v.is_empty())
            })
        })
    }

    /// Registers a listener consulted before every mutation.
    pub fn add_change_listener(&mut self, listener: Arc<dyn FieldChangeListener>) {
        self.listeners.push(listener);
    }

    pub fn remove_change_listeners(&mut self) {
        self.listeners.clear();
    }

    fn notify(&self, field: &str, old_value: Option<&str>, new_value: Option<&str>) -> Result<()> {
        let change = FieldChange {
            entry_id: &self.id,
            field,
            old_value,
            new_value,
        };
        for listener in &self.listeners {
            if let Err(veto) = listener.vetoable_change(&change) {
                tracing::debug!(entry = %self.id, field, reason = veto.reason(), "change vetoed");
                return Err(BibError::ChangeRejected {
                    field: field.to_string(),
                    reason: veto.reason().to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for BibEntry {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies id, type, fields and serialization state; listeners are not carried over.
impl Clone for BibEntry {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            entry_type: self.entry_type.clone(),
            fields: self.fields.clone(),
            parsed_serialization: self.parsed_serialization.clone(),
            header_offset: self.header_offset,
            changed: self.changed,
            listeners: Vec::new(),
        }
    }
}

impl fmt::Debug for BibEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BibEntry")
            .field("id", &self.id)
            .field("entry_type", &self.entry_type)
            .field("fields", &self.fields)
            .field("changed", &self.changed)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl PartialEq for BibEntry {
    fn eq(&self, other: &Self) -> bool {
        self.entry_type == other.entry_type && self.fields == other.fields
    }
}

impl Eq for BibEntry {}

impl Hash for BibEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entry_type.hash(state);
        self.fields.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::change::Veto;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn veto_everything(_: &FieldChange<'_>) -> std::result::Result<(), Veto> {
        Err(Veto::new("read only"))
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    impl FieldChangeListener for Recorder {
        fn vetoable_change(&self, change: &FieldChange<'_>) -> std::result::Result<(), Veto> {
            let mut seen = self.seen.lock().unwrap();
            seen.push(format!(
                "{}:{}->{}",
                change.field,
                change.old_value.unwrap_or("-"),
                change.new_value.unwrap_or("-")
            ));
            Ok(())
        }
    }

    #[test]
    fn test_new_entry_defaults() {
        let entry = BibEntry::new();
        assert_eq!(entry.entry_type(), "misc");
        assert!(!entry.id().is_empty());
        assert!(entry.has_changed());
        assert_eq!(entry.field_count(), 0);
    }

    #[test]
    fn test_type_is_lowercased_and_defaulted() {
        let mut entry = BibEntry::with_id_and_type("1", "ARTICLE");
        assert_eq!(entry.entry_type(), "article");
        entry.set_type("").unwrap();
        assert_eq!(entry.entry_type(), "misc");
    }

    #[test]
    fn test_field_names_are_case_insensitive() {
        let mut entry = BibEntry::new();
        entry.set_field("HowPublished", "asdf").unwrap();
        assert_eq!(entry.field("howpublished"), Some("asdf"));
        assert_eq!(entry.field("HOWPUBLISHED"), Some("asdf"));
        assert_eq!(entry.field_names().collect::<Vec<_>>(), vec!["howpublished"]);
    }

    #[test]
    fn test_empty_value_removes_field() {
        let mut entry = BibEntry::new();
        entry.set_field("note", "some note").unwrap();
        entry.set_field("note", "").unwrap();
        assert!(!entry.has_field("note"));
    }

    #[test]
    fn test_whitespace_value_is_stored() {
        let mut entry = BibEntry::new();
        entry.set_field("author", "  ").unwrap();
        assert_eq!(entry.field("author"), Some("  "));
    }

    #[rstest]
    #[case("id")]
    #[case("ID")]
    fn test_reserved_id_field(#[case] name: &str) {
        let mut entry = BibEntry::new();
        assert!(matches!(
            entry.set_field(name, "x"),
            Err(BibError::ReservedField(_))
        ));
        assert!(matches!(
            entry.clear_field(name),
            Err(BibError::ReservedField(_))
        ));
    }

    #[test]
    fn test_empty_field_name_is_rejected() {
        let mut entry = BibEntry::new();
        assert!(matches!(
            entry.set_field("", "x"),
            Err(BibError::InvalidFieldName(_))
        ));
    }

    #[test]
    fn test_veto_rolls_back() {
        let mut entry = BibEntry::with_id("1");
        entry.set_field("author", "Foo Bar").unwrap();
        entry.set_parsed_serialization("@Misc{,\n  author = {Foo Bar}\n}");
        entry.add_change_listener(Arc::new(veto_everything));

        let result = entry.set_field("author", "BlaBla");
        assert!(matches!(result, Err(BibError::ChangeRejected { .. })));
        assert_eq!(entry.field("author"), Some("Foo Bar"));
        assert!(!entry.has_changed());

        assert!(entry.clear_field("author").is_err());
        assert!(entry.set_type("book").is_err());
        assert!(entry.set_id("2").is_err());
        assert_eq!(entry.field("author"), Some("Foo Bar"));
        assert_eq!(entry.entry_type(), "misc");
        assert_eq!(entry.id(), "1");
    }

    #[test]
    fn test_listeners_see_changes() {
        let recorder = Arc::new(Recorder::default());
        let mut entry = BibEntry::with_id("1");
        entry.add_change_listener(recorder.clone());

        entry.set_field("Title", "Nice Book").unwrap();
        entry.set_field("title", "Other Book").unwrap();
        entry.clear_field("title").unwrap();
        entry.clear_field("title").unwrap();
        entry.set_type("book").unwrap();

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                "title:-->Nice Book",
                "title:Nice Book->Other Book",
                "title:Other Book->-",
                "entrytype:misc->book",
            ]
        );
    }

    #[test]
    fn test_clone_drops_listeners() {
        let mut entry = BibEntry::new();
        entry.add_change_listener(Arc::new(veto_everything));
        let mut copy = entry.clone();
        assert!(copy.set_field("title", "Free").is_ok());
        assert_eq!(copy.id(), entry.id());
    }

    #[test]
    fn test_mutation_marks_changed() {
        let mut entry = BibEntry::new();
        entry.set_parsed_serialization("@Misc{,\n}");
        assert!(!entry.has_changed());
        entry.set_field("note", "x").unwrap();
        assert!(entry.has_changed());
    }

    #[test]
    fn test_equality_ignores_id() {
        let mut a = BibEntry::with_id_and_type("1", "article");
        let mut b = BibEntry::with_id_and_type("2", "article");
        a.set_field("title", "Same").unwrap();
        b.set_field("TITLE", "Same").unwrap();
        assert_eq!(a, b);

        let set: HashSet<BibEntry> = [a.clone(), b].into_iter().collect();
        assert_eq!(set.len(), 1);

        let c = BibEntry::with_id_and_type("1", "book");
        assert_ne!(a, c);
    }

    #[test]
    fn test_set_fields() {
        let mut entry = BibEntry::new();
        entry
            .set_fields([("author", "Foo Bar"), ("year", "2001")])
            .unwrap();
        assert_eq!(entry.field_count(), 2);
        assert!(entry.set_fields([("title", "T"), ("id", "x")]).is_err());
        assert_eq!(entry.field("title"), Some("T"));
    }

    #[rstest]
    #[case("location", "address", "Berlin")]
    #[case("address", "location", "Berlin")]
    #[case("journaltitle", "journal", "Nature")]
    #[case("institution", "school", "MIT")]
    fn test_field_alias(#[case] set: &str, #[case] requested: &str, #[case] value: &str) {
        let mut entry = BibEntry::new();
        entry.set_field(set, value).unwrap();
        assert_eq!(entry.field_or_alias(requested).as_deref(), Some(value));
    }

    #[rstest]
    #[case("2003-05-21", Some("2003"), Some("5"))]
    #[case("2003-05", Some("2003"), Some("5"))]
    #[case("2003", Some("2003"), None)]
    #[case("May 2003", None, None)]
    #[case("2003-13", None, None)]
    fn test_year_and_month_from_date(
        #[case] date: &str,
        #[case] year: Option<&str>,
        #[case] month: Option<&str>,
    ) {
        let mut entry = BibEntry::new();
        entry.set_field("date", date).unwrap();
        assert_eq!(entry.field_or_alias("year").as_deref(), year);
        assert_eq!(entry.field_or_alias("month").as_deref(), month);
    }

    #[test]
    fn test_date_from_year_and_month() {
        let mut entry = BibEntry::new();
        assert_eq!(entry.field_or_alias("date"), None);
        entry.set_field("year", "2003").unwrap();
        assert_eq!(entry.field_or_alias("date").as_deref(), Some("2003"));
        entry.set_field("month", "#mar#").unwrap();
        assert_eq!(entry.field_or_alias("date").as_deref(), Some("2003-03"));
        assert_eq!(entry.publication_date().as_deref(), Some("2003-03"));
    }

    #[test]
    fn test_explicit_year_wins_over_date() {
        let mut entry = BibEntry::new();
        entry.set_field("year", "1999").unwrap();
        entry.set_field("date", "2003-05").unwrap();
        assert_eq!(entry.field_or_alias("year").as_deref(), Some("1999"));
    }

    #[test]
    fn test_citation_key() {
        let mut entry = BibEntry::new();
        assert!(!entry.has_citation_key());
        entry.set_citation_key("Doe1999").unwrap();
        assert_eq!(entry.citation_key(), Some("Doe1999"));
        assert_eq!(entry.field("bibtexkey"), Some("Doe1999"));
    }

    #[test]
    fn test_author_title_year() {
        let mut entry = BibEntry::new();
        assert_eq!(entry.author_title_year(0), "N/A: \"N/A\" (N/A)");
        entry
            .set_fields([("author", "Doe"), ("title", "Title"), ("year", "1999")])
            .unwrap();
        assert_eq!(entry.author_title_year(0), "Doe: \"Title\" (1999)");
        assert_eq!(entry.author_title_year(5), "Doe: ...");
    }

    #[test]
    fn test_keywords() {
        let mut entry = BibEntry::new();
        entry.add_keyword("rust").unwrap();
        entry.add_keywords(&["Parsing", "RUST", ""]).unwrap();
        assert_eq!(entry.field("keywords"), Some("rust, Parsing"));
        assert_eq!(entry.separated_keywords(), vec!["rust", "Parsing"]);

        entry.put_keywords::<&str>(&[]).unwrap();
        assert!(!entry.has_field("keywords"));
    }

    #[test]
    fn test_all_fields_present() {
        let mut entry = BibEntry::with_type("book");
        entry
            .set_fields([("title", "T"), ("editor", "E"), ("year", "2000")])
            .unwrap();
        assert!(entry.all_fields_present(&["title", "author/editor", "year"], None));
        assert!(!entry.all_fields_present(&["title", "publisher"], None));
    }

    #[test]
    fn test_user_comments() {
        let mut entry = BibEntry::new();
        assert_eq!(entry.user_comments(), "");
        entry.set_parsed_serialization("\n% imported\n\n@Misc{x,\n}");
        assert_eq!(entry.user_comments(), "% imported");
    }

    #[rstest]
    #[case("% mail me@example.org\n@Misc{x,\n}", "% mail me@example.org")]
    #[case("@comment{keep me}\n@Misc{x,\n}", "@comment{keep me}")]
    #[case("@Misc{x,\n  email = {a@b.org}\n}", "")]
    fn test_user_comments_stop_at_own_header(#[case] text: &str, #[case] expected: &str) {
        let mut entry = BibEntry::new();
        entry.set_parsed_serialization(text);
        assert_eq!(entry.user_comments(), expected);
    }

    #[test]
    fn test_user_comments_with_known_offset() {
        let mut entry = BibEntry::new();
        entry.set_parsed_serialization_at("x@y\n  @Misc{x,\n}", 6);
        assert_eq!(entry.user_comments(), "x@y");
        assert!(!entry.has_changed());

        // An offset past the text falls back to searching for the header.
        entry.set_parsed_serialization_at("% c\n@Misc{x,\n}", 100);
        assert_eq!(entry.user_comments(), "% c");
    }
}
