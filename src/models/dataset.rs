use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::TelemetryRecord;

/// Outcome of composite date derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateDerivation {
    Derived,
    /// At least one row had a missing or invalid calendar date, so no row got a date
    Skipped,
}

/// Cleaned, immutable telemetry table produced by preprocessing
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<TelemetryRecord>,
    date_derivation: DateDerivation,
}

impl Dataset {
    pub fn new(records: Vec<TelemetryRecord>, date_derivation: DateDerivation) -> Self {
        Self {
            records,
            date_derivation,
        }
    }

    pub fn records(&self) -> &[TelemetryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn date_derivation(&self) -> DateDerivation {
        self.date_derivation
    }

    pub fn battery_charges(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.battery_charge).collect()
    }

    pub fn latitudes(&self) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.latitude).collect()
    }

    pub fn longitudes(&self) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.longitude).collect()
    }

    /// Distinct non-null vins
    pub fn unique_vehicles(&self) -> usize {
        self.records
            .iter()
            .filter_map(|r| r.vin.as_deref())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Whether any row carries a time-period label
    pub fn has_time_periods(&self) -> bool {
        self.records.iter().any(|r| r.time_period.is_some())
    }
}
