use crate::error::{AnalysisError, Result};
use crate::models::{Dataset, DateDerivation, RawRecord, TelemetryRecord, TimePeriod};
use crate::utils::constants::*;
use crate::utils::stats::median;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnNulls {
    pub column: String,
    pub count: usize,
}

/// What preprocessing changed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreprocessReport {
    pub input_records: usize,
    pub duplicates_removed: usize,
    /// Columns with at least one null, in file order
    pub null_counts: Vec<ColumnNulls>,
    pub battery_fill_value: Option<f64>,
    pub date_derivation: DateDerivation,
    pub output_records: usize,
}

impl PreprocessReport {
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str(&format!("Records loaded: {}\n", self.input_records));
        if self.duplicates_removed > 0 {
            summary.push_str(&format!(
                "Removed {} duplicate records\n",
                self.duplicates_removed
            ));
        }
        if !self.null_counts.is_empty() {
            summary.push_str("Missing values found:\n");
            let rows = self.input_records - self.duplicates_removed;
            for nulls in &self.null_counts {
                summary.push_str(&format!(
                    "  - {}: {} missing ({:.1}%)\n",
                    nulls.column,
                    nulls.count,
                    100.0 * nulls.count as f64 / rows.max(1) as f64
                ));
            }
        }
        if let Some(fill) = self.battery_fill_value {
            summary.push_str(&format!(
                "Filled missing battery charges with median: {:.1}%\n",
                fill
            ));
        }
        match self.date_derivation {
            DateDerivation::Derived => summary.push_str("Created date column for time analysis\n"),
            DateDerivation::Skipped => summary.push_str("Could not create date column\n"),
        }
        summary.push_str(&format!("Records after preprocessing: {}", self.output_records));
        summary
    }
}

/// Cleans raw rows into an immutable [`Dataset`]
pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Run every cleaning step in order
    pub fn process(&self, raw: Vec<RawRecord>) -> Result<(Dataset, PreprocessReport)> {
        let input_records = raw.len();

        let (deduped, duplicates_removed) = Self::remove_duplicates(raw);
        if duplicates_removed > 0 {
            info!("Removed {} duplicate records", duplicates_removed);
        }

        let null_counts = Self::count_nulls(&deduped);
        for nulls in &null_counts {
            warn!("{}: {} missing values", nulls.column, nulls.count);
        }

        let (filled, battery_fill_value) = Self::fill_battery_median(deduped)?;
        if let Some(fill) = battery_fill_value {
            info!("Filled missing battery charges with median: {:.1}%", fill);
        }

        let dates = Self::derive_dates(&filled);
        let date_derivation = if dates.is_some() {
            info!("Created date column for time analysis");
            DateDerivation::Derived
        } else {
            warn!("Could not create date column; continuing without dates");
            DateDerivation::Skipped
        };

        let records = Self::build_records(filled, dates);
        let output_records = records.len();
        info!("Data preprocessing completed: {} records", output_records);

        Ok((
            Dataset::new(records, date_derivation),
            PreprocessReport {
                input_records,
                duplicates_removed,
                null_counts,
                battery_fill_value,
                date_derivation,
                output_records,
            },
        ))
    }

    /// Drop exact duplicate rows, keeping the first occurrence in order
    pub fn remove_duplicates(records: Vec<RawRecord>) -> (Vec<RawRecord>, usize) {
        let before = records.len();
        let mut seen = HashSet::with_capacity(before);
        let unique: Vec<RawRecord> = records
            .into_iter()
            .filter(|record| seen.insert(record.key()))
            .collect();
        let removed = before - unique.len();
        (unique, removed)
    }

    /// Null count for each column that has any
    pub fn count_nulls(records: &[RawRecord]) -> Vec<ColumnNulls> {
        let nullable: [(&str, fn(&RawRecord) -> bool); 9] = [
            (COL_VIN, |r| r.vin.is_none()),
            (COL_YEAR, |r| r.year.is_none()),
            (COL_MONTH, |r| r.month.is_none()),
            (COL_DAY, |r| r.day.is_none()),
            (COL_HOUR, |r| r.hour.is_none()),
            (COL_HALF_HOUR, |r| r.half_hour.is_none()),
            (COL_LAT, |r| r.latitude.is_none()),
            (COL_LONG, |r| r.longitude.is_none()),
            (COL_BATTERY, |r| r.battery_charge.is_none()),
        ];

        nullable
            .iter()
            .map(|(column, is_null)| ColumnNulls {
                column: column.to_string(),
                count: records.iter().filter(|r| is_null(r)).count(),
            })
            .filter(|nulls| nulls.count > 0)
            .collect()
    }

    /// Replace null battery charges with the median of the non-null ones.
    ///
    /// Returns the fill value when any row was filled.
    pub fn fill_battery_median(records: Vec<RawRecord>) -> Result<(Vec<RawRecord>, Option<f64>)> {
        if records.iter().all(|r| r.battery_charge.is_some()) {
            return Ok((records, None));
        }

        let present: Vec<f64> = records.iter().filter_map(|r| r.battery_charge).collect();
        let fill = median(&present).ok_or_else(|| {
            AnalysisError::MissingData(format!("every '{}' value is missing", COL_BATTERY))
        })?;

        let filled = records
            .into_iter()
            .map(|mut record| {
                record.battery_charge.get_or_insert(fill);
                record
            })
            .collect();
        Ok((filled, Some(fill)))
    }

    /// Composite date per row, or `None` if any row lacks a valid calendar date
    pub fn derive_dates(records: &[RawRecord]) -> Option<Vec<NaiveDate>> {
        records.iter().map(RawRecord::calendar_date).collect()
    }

    fn build_records(records: Vec<RawRecord>, dates: Option<Vec<NaiveDate>>) -> Vec<TelemetryRecord> {
        let mut dates = dates.map(|d| d.into_iter());
        records
            .into_iter()
            .map(|raw| TelemetryRecord {
                date: dates.as_mut().and_then(|d| d.next()),
                time_period: raw.hour.and_then(TimePeriod::from_hour),
                battery_charge: raw.battery_charge.unwrap_or_default(),
                vin: raw.vin,
                year: raw.year,
                month: raw.month,
                day: raw.day,
                hour: raw.hour,
                half_hour: raw.half_hour,
                latitude: raw.latitude,
                longitude: raw.longitude,
            })
            .collect()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}
