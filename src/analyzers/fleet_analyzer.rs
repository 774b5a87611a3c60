use crate::error::{AnalysisError, Result};
use crate::models::Dataset;
use crate::utils::constants::COL_HOUR;
use crate::utils::stats::{max, mean, median, min, sample_std};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct FleetStatistics {
    pub total_records: usize,
    pub unique_vehicles: usize,
    /// `None` when every `yearr` value is null
    pub year_range: Option<(i32, i32)>,
    /// `None` when every `hr` value is null
    pub hour_range: Option<(i32, i32)>,
    pub battery: BatteryStats,
    pub latitude: Option<CoordinateRange>,
    pub longitude: Option<CoordinateRange>,
    pub busiest_hour: HourActivity,
    pub quietest_hour: HourActivity,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatteryStats {
    pub mean: f64,
    pub median: f64,
    /// Undefined for a single record
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoordinateRange {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl CoordinateRange {
    fn from_values(values: &[f64]) -> Option<Self> {
        Some(Self {
            min: min(values)?,
            max: max(values)?,
            mean: mean(values)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourActivity {
    pub hour: i32,
    pub records: usize,
}

/// Record count per hour, in hour order; rows without an hour are left out
pub fn hourly_counts(dataset: &Dataset) -> BTreeMap<i32, usize> {
    let mut counts = BTreeMap::new();
    for hour in dataset.records().iter().filter_map(|r| r.hour) {
        *counts.entry(hour).or_insert(0) += 1;
    }
    counts
}

/// Busiest and quietest hours, or `MissingData` when no row has an hour
pub fn required_activity_extremes(dataset: &Dataset) -> Result<(HourActivity, HourActivity)> {
    if dataset.is_empty() {
        return Err(AnalysisError::EmptyDataset);
    }
    activity_extremes(&hourly_counts(dataset))
        .ok_or_else(|| AnalysisError::MissingData(format!("every '{}' value is missing", COL_HOUR)))
}

fn value_range(values: impl Iterator<Item = i32>) -> Option<(i32, i32)> {
    values.fold(None, |range, v| match range {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Busiest and quietest hours; ties go to the earliest hour
pub fn activity_extremes(counts: &BTreeMap<i32, usize>) -> Option<(HourActivity, HourActivity)> {
    let mut busiest: Option<HourActivity> = None;
    let mut quietest: Option<HourActivity> = None;

    for (&hour, &records) in counts {
        let current = HourActivity { hour, records };
        if busiest.map_or(true, |b| records > b.records) {
            busiest = Some(current);
        }
        if quietest.map_or(true, |q| records < q.records) {
            quietest = Some(current);
        }
    }

    Some((busiest?, quietest?))
}

/// Dataset-wide overview statistics
pub struct FleetAnalyzer;

impl FleetAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate_statistics(&self, dataset: &Dataset) -> Result<FleetStatistics> {
        let records = dataset.records();
        if records.is_empty() {
            return Err(AnalysisError::EmptyDataset);
        }

        let charges = dataset.battery_charges();
        let battery = BatteryStats {
            mean: mean(&charges).ok_or(AnalysisError::EmptyDataset)?,
            median: median(&charges).ok_or(AnalysisError::EmptyDataset)?,
            std: sample_std(&charges),
            min: min(&charges).ok_or(AnalysisError::EmptyDataset)?,
            max: max(&charges).ok_or(AnalysisError::EmptyDataset)?,
        };

        let (busiest_hour, quietest_hour) = required_activity_extremes(dataset)?;

        Ok(FleetStatistics {
            total_records: records.len(),
            unique_vehicles: dataset.unique_vehicles(),
            year_range: value_range(records.iter().filter_map(|r| r.year)),
            hour_range: value_range(records.iter().filter_map(|r| r.hour)),
            battery,
            latitude: CoordinateRange::from_values(&dataset.latitudes()),
            longitude: CoordinateRange::from_values(&dataset.longitudes()),
            busiest_hour,
            quietest_hour,
        })
    }
}

impl Default for FleetAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl FleetStatistics {
    pub fn summary(&self) -> String {
        let std = self
            .battery
            .std
            .map_or_else(|| "n/a".to_string(), |s| format!("{:.1}%", s));

        let coverage = match (&self.latitude, &self.longitude) {
            (Some(lat), Some(lon)) => format!(
                "- Latitude range: {:.4}° to {:.4}°\n\
                - Longitude range: {:.4}° to {:.4}°\n\
                - Geographic center: ({:.4}°, {:.4}°)",
                lat.min, lat.max, lon.min, lon.max, lat.mean, lon.mean
            ),
            _ => "- No complete coordinates recorded".to_string(),
        };
        let years = self
            .year_range
            .map_or_else(|| "n/a".to_string(), |(lo, hi)| format!("{}-{}", lo, hi));
        let hours = self
            .hour_range
            .map_or_else(|| "n/a".to_string(), |(lo, hi)| format!("{}:00 - {}:00", lo, hi));

        format!(
            "Dataset Overview:\n\
            - Total records: {}\n\
            - Unique vehicles (VINs): {}\n\
            - Year range: {}\n\
            - Time span: {}\n\n\
            Battery Statistics:\n\
            - Mean charge: {:.1}%\n\
            - Median charge: {:.1}%\n\
            - Standard deviation: {}\n\
            - Min charge: {:.1}%\n\
            - Max charge: {:.1}%\n\n\
            Geographic Coverage:\n\
            {}\n\n\
            Temporal Patterns:\n\
            - Peak activity hour: {}:00 ({} records)\n\
            - Lowest activity hour: {}:00 ({} records)",
            self.total_records,
            self.unique_vehicles,
            years,
            hours,
            self.battery.mean,
            self.battery.median,
            std,
            self.battery.min,
            self.battery.max,
            coverage,
            self.busiest_hour.hour,
            self.busiest_hour.records,
            self.quietest_hour.hour,
            self.quietest_hour.records,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRecord;
    use crate::processors::Preprocessor;

    fn dataset(rows: &[(&str, i32, f64)]) -> Dataset {
        let raw = rows
            .iter()
            .enumerate()
            .map(|(i, (vin, hour, charge))| {
                RawRecord::new(
                    *vin,
                    2023 + (i % 2) as i32,
                    5,
                    1,
                    *hour,
                    Some(0.0),
                    Some(12.0 + i as f64),
                    Some(77.0 + i as f64),
                    Some(*charge),
                )
            })
            .collect();
        Preprocessor::new().process(raw).unwrap().0
    }

    #[test]
    fn test_basic_statistics() {
        let ds = dataset(&[("V1", 1, 10.0), ("V1", 13, 50.0), ("V2", 13, 90.0)]);
        let stats = FleetAnalyzer::new().calculate_statistics(&ds).unwrap();

        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.unique_vehicles, 2);
        assert_eq!(stats.year_range, Some((2023, 2024)));
        assert_eq!(stats.hour_range, Some((1, 13)));
        assert_eq!(stats.battery.mean, 50.0);
        assert_eq!(stats.battery.median, 50.0);
        assert!((stats.battery.std.unwrap() - 40.0).abs() < 1e-9);
        assert_eq!(stats.busiest_hour, HourActivity { hour: 13, records: 2 });
        assert_eq!(stats.quietest_hour, HourActivity { hour: 1, records: 1 });

        let lat = stats.latitude.unwrap();
        assert_eq!((lat.min, lat.max, lat.mean), (12.0, 14.0, 13.0));
    }

    #[test]
    fn test_activity_ties_prefer_earliest_hour() {
        let counts = BTreeMap::from([(3, 2), (7, 2), (9, 1), (11, 1)]);
        let (busiest, quietest) = activity_extremes(&counts).unwrap();
        assert_eq!(busiest.hour, 3);
        assert_eq!(quietest.hour, 9);
    }

    #[test]
    fn test_rows_without_hour_or_vin_are_skipped() {
        let mut raw = vec![
            RawRecord::new("V1", 2024, 5, 1, 4, None, None, None, Some(30.0)),
            RawRecord::new("V1", 2024, 5, 1, 4, None, None, None, Some(40.0)),
            RawRecord::new("V2", 2024, 5, 1, 9, None, None, None, Some(50.0)),
        ];
        raw[1].vin = None;
        raw[2].hour = None;
        raw[2].year = None;
        let ds = Preprocessor::new().process(raw).unwrap().0;
        let stats = FleetAnalyzer::new().calculate_statistics(&ds).unwrap();

        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.unique_vehicles, 2);
        assert_eq!(stats.hour_range, Some((4, 4)));
        assert_eq!(stats.year_range, Some((2024, 2024)));
        assert_eq!(stats.busiest_hour, HourActivity { hour: 4, records: 2 });
    }

    #[test]
    fn test_no_hours_is_missing_data() {
        let mut raw = RawRecord::new("V1", 2024, 5, 1, 4, None, None, None, Some(30.0));
        raw.hour = None;
        let ds = Preprocessor::new().process(vec![raw]).unwrap().0;
        assert!(matches!(
            FleetAnalyzer::new().calculate_statistics(&ds),
            Err(AnalysisError::MissingData(_))
        ));
    }

    #[test]
    fn test_empty_dataset_is_error() {
        let empty = Dataset::new(Vec::new(), crate::models::DateDerivation::Derived);
        assert!(matches!(
            FleetAnalyzer::new().calculate_statistics(&empty),
            Err(AnalysisError::EmptyDataset)
        ));
    }

    #[test]
    fn test_summary_text() {
        let ds = dataset(&[("V1", 1, 10.0), ("V1", 13, 50.0), ("V2", 13, 90.0)]);
        let summary = FleetAnalyzer::new().calculate_statistics(&ds).unwrap().summary();
        assert!(summary.contains("Unique vehicles (VINs): 2"));
        assert!(summary.contains("Mean charge: 50.0%"));
        assert!(summary.contains("Peak activity hour: 13:00 (2 records)"));
    }
}
