//! Pipeline orchestration
//!
//! This module provides the public API for nutrisync. It wires the stages
//! together: UTF-8 decode → CSV rows → row normalization → per-day
//! aggregation → cross-file merge.
//!
//! Decoding is the only step that fails hard, and only for the file it was
//! given; whether to skip that file or abort the run is the caller's call.

use crate::aggregator::{merge_batches, DayAggregator};
use crate::error::IngestError;
use crate::schema::{build_header_map, RawRow};
use crate::types::{DailyBatch, MergedExport};

/// Construction-time configuration for the ingestion engine.
///
/// The core takes no ambient configuration; everything a caller can vary is
/// an explicit field here.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestConfig {
    /// Also emit one [`FoodEntry`](crate::FoodEntry) per calorie-bearing row
    pub extract_food_entries: bool,
}

/// Parse one export file's bytes into a single aggregated batch.
///
/// # Arguments
/// * `bytes` - Full file content, UTF-8 CSV with a header row
/// * `config` - Explicit engine configuration
///
/// # Returns
/// The file's daily aggregates sorted by date, its food entries in row
/// order (when extraction is enabled), and row counters.
///
/// # Example
/// ```
/// use nutrisync::{parse_export, IngestConfig};
///
/// let csv = "Date,Calories,Protein (g)\n2024-01-01,500,30\n";
/// let batch = parse_export(csv.as_bytes(), &IngestConfig::default()).unwrap();
/// assert_eq!(batch.days.len(), 1);
/// ```
pub fn parse_export(bytes: &[u8], config: &IngestConfig) -> Result<DailyBatch, IngestError> {
    let text = std::str::from_utf8(bytes)?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();
    let header_map = build_header_map(&headers);

    let mut aggregator = DayAggregator::new(config.extract_food_entries);
    for result in reader.records() {
        let record = result?;
        aggregator.push_row(&RawRow::new(&header_map, &record));
    }

    Ok(aggregator.finish())
}

/// Parse several export files and merge them into one deduplicated result.
///
/// Files are aggregated independently and merged in the given order; see
/// [`merge_batches`](crate::aggregator::merge_batches) for the per-date
/// conflict rules. The first undecodable file aborts with its error.
pub fn parse_exports<B>(files: &[B], config: &IngestConfig) -> Result<MergedExport, IngestError>
where
    B: AsRef<[u8]>,
{
    let mut batches = Vec::with_capacity(files.len());
    for file in files {
        batches.push(parse_export(file.as_ref(), config)?);
    }
    Ok(merge_batches(batches))
}

/// Stateful processor for feeding export files as they arrive.
///
/// Useful when files come one at a time (e.g. per email attachment): each
/// [`process`](Self::process) call aggregates one file, and
/// [`finish`](Self::finish) merges everything with the same semantics as
/// [`parse_exports`]. A decode failure leaves previously processed batches
/// intact, so the caller can skip the bad file and keep going.
#[derive(Debug, Default)]
pub struct ExportProcessor {
    config: IngestConfig,
    batches: Vec<DailyBatch>,
}

impl ExportProcessor {
    pub fn new(config: IngestConfig) -> Self {
        Self {
            config,
            batches: Vec::new(),
        }
    }

    /// Aggregate one export file into the processor.
    pub fn process(&mut self, bytes: &[u8]) -> Result<(), IngestError> {
        let batch = parse_export(bytes, &self.config)?;
        self.batches.push(batch);
        Ok(())
    }

    /// Batches accepted so far, in processing order.
    pub fn batches(&self) -> &[DailyBatch] {
        &self.batches
    }

    /// Merge all accepted batches into the final result.
    pub fn finish(self) -> MergedExport {
        merge_batches(self.batches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn foods_config() -> IngestConfig {
        IngestConfig {
            extract_food_entries: true,
        }
    }

    fn sample_export() -> &'static str {
        "Date,Name,Quantity,Calories,Protein (g),Carbohydrates (g),Fat (g),Sodium (mg),Sugars (g),Fiber (g),Weight\n\
         2024-01-01,Oatmeal,1 cup,150,5,27,3,0,1,4,\n\
         2024-01-01,Chicken breast,6 oz,280,52,0,6,120,0,0,182\n\
         2024-01-02,Banana,1 medium,105,1.3,27,0.4,1,14,3.1,\n"
    }

    #[test]
    fn test_parse_export_end_to_end() {
        let merged = parse_export(sample_export().as_bytes(), &foods_config()).unwrap();

        assert_eq!(merged.days.len(), 2);
        let first = &merged.days[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(first.calories, 430.0);
        assert_eq!(first.protein_g, 57.0);
        assert_eq!(first.sodium_mg, 120.0);
        assert_eq!(first.weight_lbs, Some(182.0));

        let second = &merged.days[1];
        assert_eq!(second.calories, 105.0);
        assert_eq!(second.weight_lbs, None);

        assert_eq!(merged.food_entries.len(), 3);
        assert_eq!(merged.food_entries[1].food_name, "Chicken breast");
        assert_eq!(merged.food_entries[1].quantity, "6 oz");
    }

    #[test]
    fn test_synonym_priority_across_mixed_header_file() {
        // A file carrying both protein spellings: the space form wins by key
        // presence, so a row that only filled the no-space column
        // contributes zero protein.
        let csv = "Date,Calories,Protein (g),Protein(g),Weight\n\
                   2024-01-01,500,30,,\n\
                   2024-01-01,700,,40,180\n";
        let batch = parse_export(csv.as_bytes(), &IngestConfig::default()).unwrap();

        assert_eq!(batch.days.len(), 1);
        assert_eq!(batch.days[0].calories, 1200.0);
        assert_eq!(batch.days[0].protein_g, 30.0);
        assert_eq!(batch.days[0].weight_lbs, Some(180.0));
    }

    #[test]
    fn test_no_space_headers_parse_on_their_own() {
        let csv = "Date,Calories,Protein(g),Carbohydrates(g),Fat(g)\n\
                   2024-01-01,500,30,45,12\n";
        let batch = parse_export(csv.as_bytes(), &IngestConfig::default()).unwrap();

        assert_eq!(batch.days[0].protein_g, 30.0);
        assert_eq!(batch.days[0].carbs_g, 45.0);
        assert_eq!(batch.days[0].fat_g, 12.0);
    }

    #[test]
    fn test_invalid_utf8_is_fatal_for_that_file() {
        let result = parse_export(&[0xff, 0xfe, 0x00], &IngestConfig::default());

        assert!(matches!(result, Err(IngestError::Decode(_))));
    }

    #[test]
    fn test_parse_exports_merges_overlapping_files() {
        let january = "Date,Calories,Weight\n2024-01-31,400,175\n2024-01-30,600,\n";
        let february = "Date,Calories,Weight\n2024-01-31,300,\n2024-02-01,500,174\n";

        let merged = parse_exports(&[january, february], &IngestConfig::default()).unwrap();

        assert_eq!(merged.unique_days(), 3);
        let overlap = &merged.days[1];
        assert_eq!(overlap.date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(overlap.calories, 700.0);
        // The February file had no weigh-in for Jan 31; January's stands.
        assert_eq!(overlap.weight_lbs, Some(175.0));
        assert_eq!(
            merged.date_range(),
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 30).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
            ))
        );
    }

    #[test]
    fn test_reaggregation_doubles_only_nutrition_sums() {
        let csv = "Date,Calories,Protein (g),Weight\n2024-01-01,500,30,180\n";
        let config = IngestConfig::default();

        let once = parse_export(csv.as_bytes(), &config).unwrap();
        let twice = parse_exports(&[csv, csv], &config).unwrap();

        assert_eq!(twice.days[0].calories, once.days[0].calories * 2.0);
        assert_eq!(twice.days[0].protein_g, once.days[0].protein_g * 2.0);
        // Weight is an observation, not a sum.
        assert_eq!(twice.days[0].weight_lbs, once.days[0].weight_lbs);
    }

    #[test]
    fn test_processor_matches_batch_api() {
        let january = "Date,Calories\n2024-01-01,500\n";
        let february = "Date,Calories\n2024-02-01,700\n";
        let config = IngestConfig::default();

        let mut processor = ExportProcessor::new(config);
        processor.process(january.as_bytes()).unwrap();
        processor.process(february.as_bytes()).unwrap();
        assert_eq!(processor.batches().len(), 2);

        let from_processor = processor.finish();
        let from_batch = parse_exports(&[january, february], &config).unwrap();
        assert_eq!(from_processor, from_batch);
    }

    #[test]
    fn test_processor_survives_a_bad_file() {
        let mut processor = ExportProcessor::new(IngestConfig::default());
        processor
            .process("Date,Calories\n2024-01-01,500\n".as_bytes())
            .unwrap();
        assert!(processor.process(&[0xff, 0xfe]).is_err());

        let merged = processor.finish();
        assert_eq!(merged.unique_days(), 1);
        assert_eq!(merged.days[0].calories, 500.0);
    }
}
