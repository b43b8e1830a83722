//! Export column schema
//!
//! Diet-tracker exports have shipped with at least two header-naming
//! conventions over the years: with and without a space before the
//! parenthesized unit ("Protein (g)" vs "Protein(g)"). This module pins the
//! canonical nutrient fields to a fixed-priority synonym table so the lookup
//! order lives in one typed constant instead of inline fallback chains.

use csv::StringRecord;
use std::collections::HashMap;

/// Header of the date column, present in every known export variant.
pub const DATE_COLUMN: &str = "Date";

/// Header of the weigh-in column.
pub const WEIGHT_COLUMN: &str = "Weight";

/// Headers that may carry the food name, in priority order.
pub const FOOD_NAME_COLUMNS: &[&str] = &["Name", "Food"];

/// Headers that may carry the free-form quantity text, in priority order.
pub const QUANTITY_COLUMNS: &[&str] = &["Quantity", "Units"];

/// Canonical nutrient fields tracked per day and per food entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NutrientField {
    Calories,
    Protein,
    Carbs,
    Fat,
    Sodium,
    Sugar,
    Fiber,
}

/// All nutrient fields, in the order they are accumulated.
pub const NUTRIENT_FIELDS: [NutrientField; 7] = [
    NutrientField::Calories,
    NutrientField::Protein,
    NutrientField::Carbs,
    NutrientField::Fat,
    NutrientField::Sodium,
    NutrientField::Sugar,
    NutrientField::Fiber,
];

impl NutrientField {
    /// Known header spellings for this field, in resolution priority order.
    ///
    /// The space-delimited unit form always precedes the no-space form; the
    /// first *present* header wins even when its value is empty.
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            NutrientField::Calories => &["Calories"],
            NutrientField::Protein => &["Protein (g)", "Protein(g)"],
            NutrientField::Carbs => &["Carbohydrates (g)", "Carbohydrates(g)"],
            NutrientField::Fat => &["Fat (g)", "Fat(g)"],
            NutrientField::Sodium => &["Sodium (mg)", "Sodium(mg)"],
            NutrientField::Sugar => &["Sugars (g)", "Sugars(g)"],
            NutrientField::Fiber => &["Fiber (g)", "Fiber(g)"],
        }
    }
}

/// One export row, viewed through the file's header row.
///
/// `field` mirrors dictionary-style CSV access: a column is *present* when
/// the header exists in the file, in which case every row has a value for it
/// (possibly empty). Absent headers return `None`.
#[derive(Debug)]
pub struct RawRow<'a> {
    headers: &'a HashMap<String, usize>,
    record: &'a StringRecord,
}

impl<'a> RawRow<'a> {
    pub fn new(headers: &'a HashMap<String, usize>, record: &'a StringRecord) -> Self {
        Self { headers, record }
    }

    /// Value under `name`, or `None` when the file has no such column.
    ///
    /// A record shorter than the header row (ragged CSV) yields an empty
    /// value rather than `None`, matching presence-by-header semantics.
    pub fn field(&self, name: &str) -> Option<&'a str> {
        let idx = *self.headers.get(name)?;
        Some(self.record.get(idx).unwrap_or(""))
    }

    /// Like [`field`](Self::field), but treats an empty value as absent.
    pub fn non_empty_field(&self, name: &str) -> Option<&'a str> {
        self.field(name).map(str::trim).filter(|v| !v.is_empty())
    }
}

/// Build a header-name → column-index map from a CSV header row.
///
/// Headers are matched case-sensitively as exported; only a UTF-8 BOM on the
/// first header is stripped, since spreadsheet tools prepend one and it would
/// otherwise make the `Date` column invisible.
pub fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim_start_matches('\u{feff}').to_string(), idx))
        .collect()
}
