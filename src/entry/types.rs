//! Entry type declarations for the BibTeX and BibLaTeX dialects.
//!
//! The canonical writer uses these declarations to decide field order: required fields
//! first, then optional fields, both in the order declared here. Alternatives such as
//! `author/editor` are flattened in place.

use serde::{Deserialize, Serialize};

/// The dialect an entry is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BibDatabaseMode {
    #[default]
    Bibtex,
    Biblatex,
}

/// Field declarations of one entry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryType {
    name: &'static str,
    display_name: &'static str,
    required: &'static [&'static str],
    optional: &'static [&'static str],
}

impl EntryType {
    const fn new(
        name: &'static str,
        display_name: &'static str,
        required: &'static [&'static str],
        optional: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            display_name,
            required,
            optional,
        }
    }

    /// Lowercase type name, e.g. `inproceedings`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Name used in the `@Type{` header, e.g. `InProceedings`.
    pub fn display_name(&self) -> &'static str {
        self.display_name
    }

    /// Required fields, with alternatives joined by `/`.
    pub fn required_fields(&self) -> &'static [&'static str] {
        self.required
    }

    pub fn optional_fields(&self) -> &'static [&'static str] {
        self.optional
    }

    /// Required fields with alternatives split into separate names.
    pub fn required_fields_flat(&self) -> impl Iterator<Item = &'static str> {
        self.required.iter().flat_map(|field| field.split('/'))
    }

    pub fn optional_fields_flat(&self) -> impl Iterator<Item = &'static str> {
        self.optional.iter().flat_map(|field| field.split('/'))
    }
}

const BIBTEX_TYPES: &[EntryType] = &[
    EntryType::new(
        "article",
        "Article",
        &["author", "title", "journal", "year"],
        &["volume", "number", "pages", "month", "note"],
    ),
    EntryType::new(
        "book",
        "Book",
        &["title", "publisher", "year", "author/editor"],
        &["volume/number", "series", "address", "edition", "month", "note"],
    ),
    EntryType::new(
        "booklet",
        "Booklet",
        &["title"],
        &["author", "howpublished", "address", "month", "year", "note"],
    ),
    EntryType::new(
        "conference",
        "Conference",
        &["author", "title", "booktitle", "year"],
        &[
            "editor",
            "volume/number",
            "series",
            "pages",
            "address",
            "month",
            "organization",
            "publisher",
            "note",
        ],
    ),
    EntryType::new(
        "inbook",
        "InBook",
        &["chapter/pages", "title", "publisher", "year", "author/editor"],
        &["volume/number", "series", "type", "address", "edition", "month", "note"],
    ),
    EntryType::new(
        "incollection",
        "InCollection",
        &["author", "title", "booktitle", "publisher", "year"],
        &[
            "editor",
            "volume/number",
            "series",
            "type",
            "chapter",
            "pages",
            "address",
            "edition",
            "month",
            "note",
        ],
    ),
    EntryType::new(
        "inproceedings",
        "InProceedings",
        &["author", "title", "booktitle", "year"],
        &[
            "editor",
            "volume/number",
            "series",
            "pages",
            "address",
            "month",
            "organization",
            "publisher",
            "note",
        ],
    ),
    EntryType::new(
        "manual",
        "Manual",
        &["title"],
        &["author", "organization", "address", "edition", "month", "year", "note"],
    ),
    EntryType::new(
        "mastersthesis",
        "MastersThesis",
        &["author", "title", "school", "year"],
        &["type", "address", "month", "note"],
    ),
    EntryType::new(
        "misc",
        "Misc",
        &[],
        &["author", "title", "howpublished", "month", "year", "note"],
    ),
    EntryType::new(
        "phdthesis",
        "PhdThesis",
        &["author", "title", "school", "year"],
        &["type", "address", "month", "note"],
    ),
    EntryType::new(
        "proceedings",
        "Proceedings",
        &["title", "year"],
        &[
            "editor",
            "volume/number",
            "series",
            "address",
            "publisher",
            "note",
            "month",
            "organization",
        ],
    ),
    EntryType::new(
        "techreport",
        "TechReport",
        &["author", "title", "institution", "year"],
        &["type", "number", "address", "month", "note"],
    ),
    EntryType::new(
        "unpublished",
        "Unpublished",
        &["author", "title", "note"],
        &["month", "year"],
    ),
];

const BIBLATEX_TYPES: &[EntryType] = &[
    EntryType::new(
        "article",
        "Article",
        &["author", "title", "journaltitle", "year/date"],
        &[
            "translator",
            "subtitle",
            "titleaddon",
            "editor",
            "journalsubtitle",
            "issuetitle",
            "language",
            "series",
            "volume",
            "number",
            "eid",
            "issue",
            "month",
            "pages",
            "version",
            "note",
            "issn",
            "addendum",
            "pubstate",
            "doi",
            "eprint",
            "eprintclass",
            "eprinttype",
            "url",
            "urldate",
        ],
    ),
    EntryType::new(
        "book",
        "Book",
        &["author", "title", "year/date"],
        &[
            "editor",
            "translator",
            "subtitle",
            "titleaddon",
            "language",
            "volume",
            "part",
            "edition",
            "volumes",
            "series",
            "number",
            "note",
            "publisher",
            "location",
            "isbn",
            "chapter",
            "pages",
            "pagetotal",
            "addendum",
            "pubstate",
            "doi",
            "eprint",
            "eprintclass",
            "eprinttype",
            "url",
            "urldate",
        ],
    ),
    EntryType::new(
        "inproceedings",
        "InProceedings",
        &["author", "title", "booktitle", "year/date"],
        &[
            "editor",
            "subtitle",
            "titleaddon",
            "eventtitle",
            "eventdate",
            "venue",
            "language",
            "volume",
            "series",
            "number",
            "note",
            "organization",
            "publisher",
            "location",
            "isbn",
            "pages",
            "addendum",
            "doi",
            "eprint",
            "url",
            "urldate",
        ],
    ),
    EntryType::new(
        "misc",
        "Misc",
        &["author/editor", "title", "year/date"],
        &[
            "subtitle",
            "titleaddon",
            "language",
            "howpublished",
            "type",
            "version",
            "note",
            "organization",
            "location",
            "month",
            "addendum",
            "pubstate",
            "doi",
            "eprint",
            "url",
            "urldate",
        ],
    ),
    EntryType::new(
        "online",
        "Online",
        &["author/editor", "title", "year/date", "url"],
        &[
            "subtitle",
            "titleaddon",
            "language",
            "version",
            "note",
            "organization",
            "month",
            "addendum",
            "pubstate",
            "urldate",
        ],
    ),
    EntryType::new(
        "report",
        "Report",
        &["author", "title", "type", "institution", "year/date"],
        &[
            "subtitle",
            "titleaddon",
            "language",
            "number",
            "version",
            "note",
            "location",
            "month",
            "isrn",
            "pages",
            "pagetotal",
            "addendum",
            "doi",
            "url",
            "urldate",
        ],
    ),
    EntryType::new(
        "thesis",
        "Thesis",
        &["author", "title", "type", "institution", "year/date"],
        &[
            "subtitle",
            "titleaddon",
            "language",
            "note",
            "location",
            "month",
            "isbn",
            "pages",
            "pagetotal",
            "addendum",
            "doi",
            "url",
            "urldate",
        ],
    ),
    EntryType::new(
        "unpublished",
        "Unpublished",
        &["author", "title", "year/date"],
        &[
            "subtitle",
            "titleaddon",
            "language",
            "howpublished",
            "note",
            "location",
            "month",
            "addendum",
            "pubstate",
            "url",
            "urldate",
        ],
    ),
];

impl BibDatabaseMode {
    /// All entry types declared for this dialect.
    pub fn entry_types(self) -> &'static [EntryType] {
        match self {
            BibDatabaseMode::Bibtex => BIBTEX_TYPES,
            BibDatabaseMode::Biblatex => BIBLATEX_TYPES,
        }
    }

    /// Looks up an entry type by name (case-insensitive).
    pub fn entry_type(self, name: &str) -> Option<&'static EntryType> {
        self.entry_types()
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Header name for `type_name`: the declared display name, or the name with its first
    /// letter upper-cased for undeclared types.
    pub fn display_name(self, type_name: &str) -> String {
        if let Some(entry_type) = self.entry_type(type_name) {
            return entry_type.display_name.to_string();
        }
        let mut chars = type_name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
