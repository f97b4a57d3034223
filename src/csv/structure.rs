//! CSV format data structures.
//!
//! This module defines the intermediate row structure used during CSV importing.

use csv::StringRecord;

use crate::csv::CsvConfig;
use crate::{BibEntry, BibError, Result};

/// One CSV line with its values paired to field names.
#[derive(Debug, Clone)]
pub(crate) struct RawCsvRow {
    /// `(field, value)` pairs in column order, empty values dropped
    pub(crate) fields: Vec<(String, String)>,
    /// Line number for error reporting
    pub(crate) line_number: usize,
}

impl RawCsvRow {
    /// Pairs the record's values with the configured columns.
    pub(crate) fn from_record(
        record: &StringRecord,
        config: &CsvConfig,
        line_number: usize,
    ) -> Result<Self> {
        let expected = config.columns.len();
        if record.len() < expected {
            return Err(BibError::MalformedInput {
                message: format!("expected {expected} columns but found {}", record.len()),
                line: line_number,
            });
        }
        if record.len() > expected {
            tracing::debug!(
                line = line_number,
                extra = record.len() - expected,
                "ignoring extra CSV columns"
            );
        }

        let fields = config
            .columns
            .iter()
            .zip(record.iter())
            .filter(|(_, value)| !value.is_empty())
            .map(|(column, value)| (column.clone(), value.to_string()))
            .collect();

        Ok(RawCsvRow {
            fields,
            line_number,
        })
    }

    pub(crate) fn into_entry(self, config: &CsvConfig) -> Result<BibEntry> {
        let mut entry = BibEntry::with_type(&config.entry_type);
        entry.set_fields(self.fields).map_err(|err| match err {
            BibError::InvalidFieldName(name) | BibError::ReservedField(name) => {
                BibError::MalformedInput {
                    message: format!("column '{name}' cannot be imported"),
                    line: self.line_number,
                }
            }
            other => other,
        })?;
        Ok(entry)
    }
}
