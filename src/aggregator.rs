//! Per-day aggregation and cross-file merge
//!
//! Rows are bucketed by calendar day as they arrive: nutrition fields sum,
//! the weight column overwrites (a day may have several weigh-ins, the last
//! one defines daily weight), and calorie-bearing rows optionally produce
//! one food entry each. Batches from separate export files merge with the
//! same arithmetic, because each file may hold only a subset of a day's log
//! rather than a full-day snapshot.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::warn;

use crate::normalizer::RowNormalizer;
use crate::schema::{
    NutrientField, RawRow, FOOD_NAME_COLUMNS, NUTRIENT_FIELDS, QUANTITY_COLUMNS, WEIGHT_COLUMN,
};
use crate::types::{DailyBatch, DailyNutrition, FoodEntry, MergedExport, UNKNOWN_FOOD};

/// Accumulates one export file's rows into daily buckets and food entries.
///
/// Feed rows in encounter order with [`push_row`](Self::push_row), then call
/// [`finish`](Self::finish) for the date-sorted batch.
pub struct DayAggregator {
    normalizer: RowNormalizer,
    extract_food_entries: bool,
    days: BTreeMap<NaiveDate, DailyNutrition>,
    food_entries: Vec<FoodEntry>,
    rows_read: usize,
    rows_skipped: usize,
}

impl DayAggregator {
    pub fn new(extract_food_entries: bool) -> Self {
        Self {
            normalizer: RowNormalizer::new(),
            extract_food_entries,
            days: BTreeMap::new(),
            food_entries: Vec::new(),
            rows_read: 0,
            rows_skipped: 0,
        }
    }

    /// Consume one raw row.
    ///
    /// A row without a resolvable date is dropped and counted. Any row with
    /// a date creates its day bucket, even when it carries no nutrition and
    /// no weight; a day present in the export appears in the output.
    pub fn push_row(&mut self, row: &RawRow<'_>) {
        self.rows_read += 1;

        let Some(logged_at) = self.normalizer.resolve_date(row) else {
            self.rows_skipped += 1;
            return;
        };
        let date = logged_at.date();

        // A non-empty calories value marks a food row; its seven nutrient
        // fields accumulate into the bucket. Each field coerces
        // independently, so one malformed value never discards the rest.
        let has_calories = self
            .normalizer
            .resolve_field(row, NutrientField::Calories)
            .map(str::trim)
            .is_some_and(|v| !v.is_empty());
        let nutrients =
            has_calories.then(|| NUTRIENT_FIELDS.map(|field| self.nutrient_value(row, field)));
        let weight = row
            .non_empty_field(WEIGHT_COLUMN)
            .map(|raw| self.normalizer.parse_number(Some(raw)));
        let entry =
            (self.extract_food_entries && has_calories).then(|| self.food_entry(row, logged_at));

        let bucket = self
            .days
            .entry(date)
            .or_insert_with(|| DailyNutrition::new(date));
        if let Some(values) = nutrients {
            for (field, value) in NUTRIENT_FIELDS.into_iter().zip(values) {
                *field_accumulator(bucket, field) += value;
            }
        }
        if let Some(observed) = weight {
            bucket.weight_lbs = Some(observed);
        }
        if let Some(entry) = entry {
            self.food_entries.push(entry);
        }
    }

    /// Finish the batch: days sorted ascending, food entries in encounter
    /// order, plus the row counters.
    pub fn finish(self) -> DailyBatch {
        if self.rows_skipped > 0 {
            warn!(
                "skipped {} of {} rows with missing or unparseable dates",
                self.rows_skipped, self.rows_read
            );
        }

        DailyBatch {
            days: self.days.into_values().collect(),
            food_entries: self.food_entries,
            rows_read: self.rows_read,
            rows_skipped: self.rows_skipped,
        }
    }

    fn nutrient_value(&self, row: &RawRow<'_>, field: NutrientField) -> f64 {
        self.normalizer
            .parse_number(self.normalizer.resolve_field(row, field))
    }

    fn food_entry(&self, row: &RawRow<'_>, logged_at: chrono::NaiveDateTime) -> FoodEntry {
        let food_name = FOOD_NAME_COLUMNS
            .iter()
            .find_map(|column| row.non_empty_field(column))
            .unwrap_or(UNKNOWN_FOOD)
            .to_string();
        let quantity = QUANTITY_COLUMNS
            .iter()
            .find_map(|column| row.field(column))
            .unwrap_or("")
            .to_string();

        FoodEntry {
            logged_at,
            food_name,
            quantity,
            calories: self.nutrient_value(row, NutrientField::Calories),
            protein_g: self.nutrient_value(row, NutrientField::Protein),
            carbs_g: self.nutrient_value(row, NutrientField::Carbs),
            fat_g: self.nutrient_value(row, NutrientField::Fat),
            sodium_mg: self.nutrient_value(row, NutrientField::Sodium),
            sugar_g: self.nutrient_value(row, NutrientField::Sugar),
            fiber_g: self.nutrient_value(row, NutrientField::Fiber),
        }
    }
}

fn field_accumulator(day: &mut DailyNutrition, field: NutrientField) -> &mut f64 {
    match field {
        NutrientField::Calories => &mut day.calories,
        NutrientField::Protein => &mut day.protein_g,
        NutrientField::Carbs => &mut day.carbs_g,
        NutrientField::Fat => &mut day.fat_g,
        NutrientField::Sodium => &mut day.sodium_mg,
        NutrientField::Sugar => &mut day.sugar_g,
        NutrientField::Fiber => &mut day.fiber_g,
    }
}

/// Merge independently aggregated batches into one deduplicated result.
///
/// Export files each carry a subset of a day's log, so nutrition fields sum
/// across every batch that touched a date. Weight is overwritten only by a
/// batch that actually observed one; a batch with no weigh-in for a date
/// never erases a previously merged weight. Food entries concatenate in
/// batch order with no deduplication.
pub fn merge_batches<I>(batches: I) -> MergedExport
where
    I: IntoIterator<Item = DailyBatch>,
{
    let mut days: BTreeMap<NaiveDate, DailyNutrition> = BTreeMap::new();
    let mut food_entries = Vec::new();
    let mut rows_read = 0;
    let mut rows_skipped = 0;

    for batch in batches {
        for day in batch.days {
            match days.get_mut(&day.date) {
                Some(merged) => {
                    merged.calories += day.calories;
                    merged.protein_g += day.protein_g;
                    merged.carbs_g += day.carbs_g;
                    merged.fat_g += day.fat_g;
                    merged.sodium_mg += day.sodium_mg;
                    merged.sugar_g += day.sugar_g;
                    merged.fiber_g += day.fiber_g;
                    if day.weight_lbs.is_some() {
                        merged.weight_lbs = day.weight_lbs;
                    }
                }
                None => {
                    days.insert(day.date, day);
                }
            }
        }
        food_entries.extend(batch.food_entries);
        rows_read += batch.rows_read;
        rows_skipped += batch.rows_skipped;
    }

    MergedExport {
        days: days.into_values().collect(),
        food_entries,
        rows_read,
        rows_skipped,
    }
}
