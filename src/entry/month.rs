//! Month values as they appear in BibTeX `month` fields.

use serde::{Deserialize, Serialize};

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Month {
    January = 1,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Month number, 1 for January.
    pub fn number(self) -> u32 {
        self as u32
    }

    /// Month number padded to two digits, e.g. `03`.
    pub fn two_digit_number(self) -> String {
        format!("{:02}", self.number())
    }

    /// Three letter BibTeX abbreviation, e.g. `mar`.
    pub fn short_name(self) -> &'static str {
        match self {
            Month::January => "jan",
            Month::February => "feb",
            Month::March => "mar",
            Month::April => "apr",
            Month::May => "may",
            Month::June => "jun",
            Month::July => "jul",
            Month::August => "aug",
            Month::September => "sep",
            Month::October => "oct",
            Month::November => "nov",
            Month::December => "dec",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// The unquoted string reference form stored in fields, e.g. `#mar#`.
    pub fn bibtex_format(self) -> String {
        format!("#{}#", self.short_name())
    }

    pub fn from_number(number: u32) -> Option<Month> {
        Month::ALL.get(number.checked_sub(1)? as usize).copied()
    }

    /// Parses `#mar#`, `mar`, `March` or `3` (case-insensitive).
    pub fn parse(value: &str) -> Option<Month> {
        let value = value.trim();
        let value = value
            .strip_prefix('#')
            .and_then(|v| v.strip_suffix('#'))
            .unwrap_or(value)
            .trim();

        if let Ok(number) = value.parse::<u32>() {
            return Month::from_number(number);
        }

        Month::ALL.into_iter().find(|month| {
            month.short_name().eq_ignore_ascii_case(value)
                || month.full_name().eq_ignore_ascii_case(value)
        })
    }
}
