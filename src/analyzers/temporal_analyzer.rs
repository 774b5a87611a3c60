use crate::error::{AnalysisError, Result};
use crate::models::{Dataset, TimePeriod};
use crate::utils::constants::{COL_HOUR, TOP_HOURS};
use crate::utils::stats::mean;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Per-hour aggregate row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyStats {
    pub hour: i32,
    pub avg_charge: f64,
    pub records: usize,
    pub unique_vehicles: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodStats {
    pub period: TimePeriod,
    pub records: usize,
    /// `None` when no record falls in the period
    pub avg_charge: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemporalStatistics {
    /// Ordered by hour
    pub hourly: Vec<HourlyStats>,
    pub top_hours: Vec<HourlyStats>,
    /// All four periods in label order
    pub periods: Vec<PeriodStats>,
}

/// Group the dataset by hour of day; rows without an hour are left out
pub fn hourly_summary(dataset: &Dataset) -> Vec<HourlyStats> {
    let mut groups: BTreeMap<i32, (Vec<f64>, HashSet<&str>)> = BTreeMap::new();
    for record in dataset.records() {
        let Some(hour) = record.hour else {
            continue;
        };
        let (charges, vins) = groups.entry(hour).or_default();
        charges.push(record.battery_charge);
        vins.extend(record.vin.as_deref());
    }

    groups
        .into_iter()
        .filter_map(|(hour, (charges, vins))| {
            Some(HourlyStats {
                hour,
                avg_charge: mean(&charges)?,
                records: charges.len(),
                unique_vehicles: vins.len(),
            })
        })
        .collect()
}

/// Group the dataset by time period; unlabelled rows are left out
pub fn period_summary(dataset: &Dataset) -> Vec<PeriodStats> {
    let mut charges: [Vec<f64>; 4] = Default::default();
    for record in dataset.records() {
        if let Some(period) = record.time_period {
            charges[period.index()].push(record.battery_charge);
        }
    }

    TimePeriod::ALL
        .iter()
        .map(|period| {
            let values = &charges[period.index()];
            PeriodStats {
                period: *period,
                records: values.len(),
                avg_charge: mean(values),
            }
        })
        .collect()
}

pub struct TemporalAnalyzer {
    top_n: usize,
}

impl TemporalAnalyzer {
    pub fn new() -> Self {
        Self { top_n: TOP_HOURS }
    }

    pub fn analyze(&self, dataset: &Dataset) -> Result<TemporalStatistics> {
        if dataset.is_empty() {
            return Err(AnalysisError::EmptyDataset);
        }
        let hourly = hourly_summary(dataset);
        if hourly.is_empty() {
            return Err(AnalysisError::MissingData(format!("every '{}' value is missing", COL_HOUR)));
        }

        let mut ranked = hourly.clone();
        // Stable sort keeps earlier hours first among equal counts
        ranked.sort_by(|a, b| b.records.cmp(&a.records));
        ranked.truncate(self.top_n);

        Ok(TemporalStatistics {
            hourly,
            top_hours: ranked,
            periods: period_summary(dataset),
        })
    }
}

impl Default for TemporalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemporalStatistics {
    pub fn summary(&self) -> String {
        let mut summary = String::from("Hourly Patterns:\n");
        for hour in &self.top_hours {
            summary.push_str(&format!(
                "- {}:00 - {} records (avg battery: {:.1}%)\n",
                hour.hour, hour.records, hour.avg_charge
            ));
        }

        summary.push_str("\nTime Period Analysis:\n");
        for period in &self.periods {
            let battery = period
                .avg_charge
                .map_or_else(|| "n/a".to_string(), |c| format!("{:.1}%", c));
            summary.push_str(&format!(
                "- {}: {} records (avg battery: {})\n",
                period.period, period.records, battery
            ));
        }

        summary.trim_end().to_string()
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
                RawRecord::new(*vin, 2024, 1, 10, *hour, Some(i as f64), None, None, Some(*charge))
            })
            .collect();
        Preprocessor::new().process(raw).unwrap().0
    }

    #[test]
    fn test_hourly_summary() {
        let ds = dataset(&[
            ("V1", 8, 40.0),
            ("V2", 8, 60.0),
            ("V1", 8, 50.0),
            ("V1", 2, 90.0),
        ]);
        let hourly = hourly_summary(&ds);

        assert_eq!(hourly.len(), 2);
        assert_eq!(hourly[0].hour, 2);
        assert_eq!(
            hourly[1],
            HourlyStats { hour: 8, avg_charge: 50.0, records: 3, unique_vehicles: 2 }
        );
    }

    #[test]
    fn test_top_hours_ties_keep_hour_order() {
        let ds = dataset(&[
            ("V1", 5, 10.0),
            ("V1", 9, 10.0),
            ("V1", 9, 20.0),
            ("V1", 14, 10.0),
            ("V1", 14, 20.0),
            ("V1", 20, 10.0),
            ("V1", 20, 20.0),
        ]);
        let stats = TemporalAnalyzer::new().analyze(&ds).unwrap();
        let hours: Vec<i32> = stats.top_hours.iter().map(|h| h.hour).collect();
        assert_eq!(hours, vec![9, 14, 20]);
    }

    #[test]
    fn test_rows_without_hour_are_not_grouped() {
        let mut raw = vec![
            RawRecord::new("V1", 2024, 1, 10, 8, None, None, None, Some(40.0)),
            RawRecord::new("V2", 2024, 1, 10, 8, None, None, None, Some(60.0)),
            RawRecord::new("V3", 2024, 1, 10, 8, None, None, None, Some(90.0)),
        ];
        raw[1].vin = None;
        raw[2].hour = None;
        let ds = Preprocessor::new().process(raw).unwrap().0;

        let hourly = hourly_summary(&ds);
        assert_eq!(
            hourly,
            vec![HourlyStats { hour: 8, avg_charge: 50.0, records: 2, unique_vehicles: 1 }]
        );

        let stats = TemporalAnalyzer::new().analyze(&ds).unwrap();
        let labelled: usize = stats.periods.iter().map(|p| p.records).sum();
        assert_eq!(labelled, 2);
    }

    #[test]
    fn test_periods_include_empty_buckets() {
        let ds = dataset(&[("V1", 1, 10.0), ("V1", 13, 50.0), ("V1", 20, 90.0)]);
        let stats = TemporalAnalyzer::new().analyze(&ds).unwrap();

        assert_eq!(stats.periods.len(), 4);
        assert_eq!(stats.periods[0].avg_charge, Some(10.0));
        assert_eq!(stats.periods[1].records, 0);
        assert_eq!(stats.periods[1].avg_charge, None);
        assert_eq!(stats.periods[3].avg_charge, Some(90.0));
        assert!(stats.summary().contains("Morning: 0 records (avg battery: n/a)"));
    }
}
