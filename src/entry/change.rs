//! Vetoable change notification for entries.
//!
//! Listeners registered on a [`BibEntry`](crate::BibEntry) are consulted before every
//! field, type or id mutation is committed. Returning a [`Veto`] aborts the mutation and
//! surfaces as [`BibError::ChangeRejected`](crate::BibError::ChangeRejected).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use bibcanon::{BibEntry, FieldChange, Veto};
//!
//! fn reserve_taken(change: &FieldChange<'_>) -> Result<(), Veto> {
//!     if change.field == "bibtexkey" && change.new_value == Some("taken") {
//!         return Err(Veto::new("key already used"));
//!     }
//!     Ok(())
//! }
//!
//! let mut entry = BibEntry::new();
//! entry.add_change_listener(Arc::new(reserve_taken));
//!
//! assert!(entry.set_citation_key("taken").is_err());
//! assert!(entry.set_citation_key("free").is_ok());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pseudo field name used when the entry type changes.
pub const TYPE_HEADER: &str = "entrytype";

/// A pending change to one property of an entry.
///
/// A `None` old value means the field is being added, a `None` new value means it is
/// being removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldChange<'a> {
    /// Id of the entry being changed
    pub entry_id: &'a str,
    /// Lowercase field name, [`TYPE_HEADER`] for type changes or `id` for id changes
    pub field: &'a str,
    pub old_value: Option<&'a str>,
    pub new_value: Option<&'a str>,
}

/// Rejection of a pending change, carrying a human readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Veto {
    reason: String,
}

impl Veto {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for Veto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Observer consulted before an entry mutation is committed.
pub trait FieldChangeListener: Send + Sync {
    /// Inspect the pending change and either accept it or veto it.
    fn vetoable_change(&self, change: &FieldChange<'_>) -> Result<(), Veto>;
}

impl<F> FieldChangeListener for F
where
    F: Fn(&FieldChange<'_>) -> Result<(), Veto> + Send + Sync,
{
    fn vetoable_change(&self, change: &FieldChange<'_>) -> Result<(), Veto> {
        self(change)
    }
}
