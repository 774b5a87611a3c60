use crate::error::{AnalysisError, Result};
use crate::models::RawRecord;
use crate::utils::constants::*;
use crate::utils::parsing::{null_if_missing, parse_f64_field, parse_integral};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;
use tracing::{debug, info};

/// Positions of the required columns in the header, plus any extra columns
struct ColumnLayout {
    required: [usize; REQUIRED_COLUMNS.len()],
    extra: Vec<usize>,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let missing = TelemetryReader::missing_columns(headers);
        if !missing.is_empty() {
            return Err(AnalysisError::Schema { missing });
        }

        let mut required = [0; REQUIRED_COLUMNS.len()];
        for (slot, column) in required.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers.iter().position(|h| h == column).unwrap_or_default();
        }
        let extra = (0..headers.len())
            .filter(|index| !required.contains(index))
            .collect();

        Ok(Self { required, extra })
    }

    fn field<'r>(&self, row: &'r StringRecord, column: &str) -> Option<&'r str> {
        let slot = REQUIRED_COLUMNS.iter().position(|c| *c == column)?;
        row.get(self.required[slot])
    }
}

pub struct TelemetryReader {
    delimiter: u8,
}

impl TelemetryReader {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Read every row of a telemetry file.
    ///
    /// Fails with `FileNotFound` when the path does not exist, `Schema` when
    /// required columns are absent and `Load` when a present value cannot be
    /// parsed. Blank fields and null markers become `None` in every column.
    pub fn read_records(&self, path: &Path) -> Result<Vec<RawRecord>> {
        info!("Attempting to load: {}", path.display());
        if !path.exists() {
            return Err(AnalysisError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(Trim::All)
            .from_path(path)
            .map_err(|e| AnalysisError::load(e.to_string()))?;

        let headers = reader
            .headers()
            .map_err(|e| AnalysisError::load(e.to_string()))?
            .clone();
        debug!("Columns: {:?}", headers.iter().collect::<Vec<_>>());
        let layout = ColumnLayout::from_headers(&headers)?;
        if !layout.extra.is_empty() {
            debug!("{} extra columns kept for duplicate detection", layout.extra.len());
        }

        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row_number = index + 1;
            let row = row.map_err(|e| AnalysisError::load(format!("row {}: {}", row_number, e)))?;
            records.push(Self::parse_row(&layout, &row, row_number)?);
        }

        info!("Dataset loaded successfully: {} records", records.len());
        Ok(records)
    }

    /// Names of required columns absent from a header row
    pub fn missing_columns(headers: &StringRecord) -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .filter(|col| !headers.iter().any(|h| h == **col))
            .map(|col| col.to_string())
            .collect()
    }

    fn parse_row(layout: &ColumnLayout, row: &StringRecord, row_number: usize) -> Result<RawRecord> {
        let key = |column: &str| Self::parse_key(layout.field(row, column), column, row_number);
        let measure = |column: &str| Self::parse_measure(layout.field(row, column), column, row_number);

        Ok(RawRecord {
            vin: null_if_missing(layout.field(row, COL_VIN)).map(str::to_string),
            year: key(COL_YEAR)?,
            month: key(COL_MONTH)?,
            day: key(COL_DAY)?,
            hour: key(COL_HOUR)?,
            half_hour: measure(COL_HALF_HOUR)?,
            latitude: measure(COL_LAT)?,
            longitude: measure(COL_LONG)?,
            battery_charge: measure(COL_BATTERY)?,
            extra: layout
                .extra
                .iter()
                .map(|&index| null_if_missing(row.get(index)).map(str::to_string))
                .collect(),
        })
    }

    /// Nullable integer field; a present value must be integral and fit `i32`
    fn parse_key(field: Option<&str>, column: &str, row_number: usize) -> Result<Option<i32>> {
        let Some(text) = null_if_missing(field) else {
            return Ok(None);
        };
        let value = parse_integral(text).ok_or_else(|| {
            AnalysisError::load(format!(
                "row {}: invalid integer '{}' in column '{}'",
                row_number, text, column
            ))
        })?;
        Self::narrow(value, column, row_number).map(Some)
    }

    fn narrow<T: TryFrom<i64>>(value: i64, column: &str, row_number: usize) -> Result<T> {
        T::try_from(value).map_err(|_| {
            AnalysisError::load(format!(
                "row {}: value {} out of range for column '{}'",
                row_number, value, column
            ))
        })
    }

    fn parse_measure(field: Option<&str>, column: &str, row_number: usize) -> Result<Option<f64>> {
        parse_f64_field(field).map_err(|text| {
            AnalysisError::load(format!(
                "row {}: invalid number '{}' in column '{}'",
                row_number, text, column
            ))
        })
    }
}

impl Default for TelemetryReader {
    fn default() -> Self {
        Self::new()
    }
}
