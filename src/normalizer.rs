//! Row normalization
//!
//! This module converts one raw export row into typed values:
//! - header-synonym resolution across export format variants
//! - permissive date parsing over the formats seen in real exports
//! - best-effort numeric coercion that never blocks the pipeline
//!
//! Malformed nutrition data degrades to zero and a warning rather than an
//! error; maximal data extraction beats strict validation here.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::schema::{NutrientField, RawRow, DATE_COLUMN};

/// Datetime formats attempted before falling back to bare dates.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Bare-date formats seen across export variants; parsed as midnight.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%Y/%m/%d",
    "%d-%b-%y",
    "%B %d, %Y",
];

/// Stateless normalizer for raw export rows.
pub struct RowNormalizer;

impl RowNormalizer {
    /// Create a normalizer, verifying the synonym table's fixed priority
    /// order: every multi-synonym nutrient lists its space-delimited unit
    /// form before the no-space form.
    pub fn new() -> Self {
        for field in crate::schema::NUTRIENT_FIELDS {
            let synonyms = field.synonyms();
            debug_assert!(!synonyms.is_empty());
            debug_assert!(
                synonyms.len() == 1 || synonyms[0].contains(" ("),
                "synonym priority order violated for {field:?}"
            );
        }
        Self
    }

    /// Resolve a canonical nutrient field against the row's headers.
    ///
    /// Synonyms are tried in the table's fixed order and the first header
    /// *present in the file* wins, even when its value for this row is
    /// empty. The no-space form is only consulted when the space form is
    /// entirely absent.
    pub fn resolve_field<'a>(&self, row: &RawRow<'a>, field: NutrientField) -> Option<&'a str> {
        field
            .synonyms()
            .iter()
            .find_map(|synonym| row.field(synonym))
    }

    /// Parse the row's date column into a timestamp.
    ///
    /// A missing or empty date column drops the row silently (the caller
    /// counts it); a non-empty value that fails every known format drops
    /// the row with a warning. Bare dates yield midnight.
    pub fn resolve_date(&self, row: &RawRow<'_>) -> Option<NaiveDateTime> {
        let raw = row.non_empty_field(DATE_COLUMN)?;

        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Some(dt);
            }
        }
        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
                return Some(date.and_time(chrono::NaiveTime::MIN));
            }
        }

        warn!("could not parse date \"{raw}\", skipping row");
        None
    }

    /// Coerce a resolved field value to a number. Total function: `None`,
    /// empty text, and unparseable text all yield `0.0`; commas used as
    /// thousands separators are stripped first.
    pub fn parse_number(&self, value: Option<&str>) -> f64 {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return 0.0;
        };

        match raw.replace(',', "").parse::<f64>() {
            Ok(n) => n,
            Err(_) => {
                warn!("could not parse numeric value \"{raw}\", defaulting to 0");
                0.0
            }
        }
    }
}

impl Default for RowNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
