//! Core types for the nutrisync pipeline
//!
//! This module defines the data structures that flow through each stage of
//! the pipeline: per-day nutrition aggregates, per-row food entries, the
//! single-file batch result, and the cross-file merge result.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Food name used when an export row carries calories but no name column.
pub const UNKNOWN_FOOD: &str = "Unknown";

/// Aggregated nutrition-and-weight record for one calendar day.
///
/// Nutrition fields are the sum of every contributing export row for the
/// date; `weight_lbs` is the last non-empty weight observation in input
/// order. A day that appears in an export with no usable values still gets
/// an all-zero record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyNutrition {
    /// Calendar date this record aggregates (the unique key)
    pub date: NaiveDate,
    /// Total calories consumed
    pub calories: f64,
    /// Total protein (grams)
    pub protein_g: f64,
    /// Total carbohydrates (grams)
    pub carbs_g: f64,
    /// Total fat (grams)
    pub fat_g: f64,
    /// Total sodium (milligrams)
    pub sodium_mg: f64,
    /// Total sugars (grams)
    pub sugar_g: f64,
    /// Total fiber (grams)
    pub fiber_g: f64,
    /// Last weigh-in of the day (pounds), if any row carried one
    pub weight_lbs: Option<f64>,
}

impl DailyNutrition {
    /// Create an empty record for `date` with all accumulators at zero.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            calories: 0.0,
            protein_g: 0.0,
            carbs_g: 0.0,
            fat_g: 0.0,
            sodium_mg: 0.0,
            sugar_g: 0.0,
            fiber_g: 0.0,
            weight_lbs: None,
        }
    }
}

/// A single food-log line item, normalized but never aggregated.
///
/// Two entries logged on the same day stay distinct; the consuming store
/// keys them by timestamp and food name. Duplicates across overlapping
/// export batches are expected and are the store's concern, not ours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    /// When the food was logged. Date-only exports yield midnight.
    pub logged_at: NaiveDateTime,
    /// Food name as exported, or [`UNKNOWN_FOOD`] when the column is absent
    pub food_name: String,
    /// Free-form quantity text, passed through untouched
    pub quantity: String,
    /// Calories for this single entry
    pub calories: f64,
    /// Protein (grams)
    pub protein_g: f64,
    /// Carbohydrates (grams)
    pub carbs_g: f64,
    /// Fat (grams)
    pub fat_g: f64,
    /// Sodium (milligrams)
    pub sodium_mg: f64,
    /// Sugars (grams)
    pub sugar_g: f64,
    /// Fiber (grams)
    pub fiber_g: f64,
}

/// Aggregation result of one export file, prior to cross-file merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyBatch {
    /// One record per distinct date, sorted ascending
    pub days: Vec<DailyNutrition>,
    /// One record per calorie-bearing row, in encounter order
    pub food_entries: Vec<FoodEntry>,
    /// Rows consumed from the file, header excluded
    pub rows_read: usize,
    /// Rows dropped for a missing or unparseable date
    pub rows_skipped: usize,
}

/// Result of merging one or more batches across export files.
///
/// Merge semantics: nutrition sums across batches that touched a date,
/// weight is overwritten only by batches that actually observed one, and
/// food entries concatenate in batch order with no deduplication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedExport {
    /// One record per distinct date across all batches, sorted ascending
    pub days: Vec<DailyNutrition>,
    /// Food entries from all batches, in batch order
    pub food_entries: Vec<FoodEntry>,
    /// Total rows consumed across batches
    pub rows_read: usize,
    /// Total rows dropped across batches
    pub rows_skipped: usize,
}

impl MergedExport {
    /// Number of distinct calendar days in the merged result.
    pub fn unique_days(&self) -> usize {
        self.days.len()
    }

    /// Total number of individual food entries across all batches.
    pub fn food_entry_count(&self) -> usize {
        self.food_entries.len()
    }

    /// First and last date covered, if any day was aggregated.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.days.first(), self.days.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_daily_record_is_all_zero() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let day = DailyNutrition::new(date);

        assert_eq!(day.date, date);
        assert_eq!(day.calories, 0.0);
        assert_eq!(day.fiber_g, 0.0);
        assert_eq!(day.weight_lbs, None);
    }

    #[test]
    fn test_date_range_on_sorted_days() {
        let first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let last = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let merged = MergedExport {
            days: vec![DailyNutrition::new(first), DailyNutrition::new(last)],
            ..Default::default()
        };

        assert_eq!(merged.date_range(), Some((first, last)));
        assert_eq!(merged.unique_days(), 2);
    }

    #[test]
    fn test_date_range_empty() {
        assert_eq!(MergedExport::default().date_range(), None);
    }
}
