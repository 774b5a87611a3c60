use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::TimePeriod;

/// One row as read from the input file, before cleaning. Any field may be null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub vin: Option<String>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
    pub hour: Option<i32>,
    pub half_hour: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub battery_charge: Option<f64>,
    /// Values of columns beyond the required ones, in header order
    #[serde(default)]
    pub extra: Vec<Option<String>>,
}

/// Hashable full-row identity used for duplicate removal
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    vin: Option<String>,
    year: Option<i32>,
    month: Option<i32>,
    day: Option<i32>,
    hour: Option<i32>,
    half_hour: Option<u64>,
    latitude: Option<u64>,
    longitude: Option<u64>,
    battery_charge: Option<u64>,
    extra: Vec<Option<String>>,
}

fn float_key(value: Option<f64>) -> Option<u64> {
    // Adding 0.0 folds -0.0 into 0.0 so both compare equal
    value.map(|v| (v + 0.0).to_bits())
}

impl RawRecord {
    /// A row with every key field present and no extra columns
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        vin: impl Into<String>,
        year: i32,
        month: i32,
        day: i32,
        hour: i32,
        half_hour: Option<f64>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        battery_charge: Option<f64>,
    ) -> Self {
        Self {
            vin: Some(vin.into()),
            year: Some(year),
            month: Some(month),
            day: Some(day),
            hour: Some(hour),
            half_hour,
            latitude,
            longitude,
            battery_charge,
            extra: Vec::new(),
        }
    }

    pub fn key(&self) -> RecordKey {
        RecordKey {
            vin: self.vin.clone(),
            year: self.year,
            month: self.month,
            day: self.day,
            hour: self.hour,
            half_hour: float_key(self.half_hour),
            latitude: float_key(self.latitude),
            longitude: float_key(self.longitude),
            battery_charge: float_key(self.battery_charge),
            extra: self.extra.clone(),
        }
    }

    /// Calendar date for the year/month/day fields, if all are present and form one
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        let month = u32::try_from(self.month?).ok()?;
        let day = u32::try_from(self.day?).ok()?;
        NaiveDate::from_ymd_opt(self.year?, month, day)
    }
}

/// A cleaned telemetry row with derived fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub vin: Option<String>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
    pub hour: Option<i32>,
    pub half_hour: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub battery_charge: f64,
    pub date: Option<NaiveDate>,
    pub time_period: Option<TimePeriod>,
}

impl TelemetryRecord {
    /// Both coordinates, when present
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    pub fn is_low_battery(&self, threshold: f64) -> bool {
        self.battery_charge < threshold
    }
}
