use crate::analyzers::temporal_analyzer::hourly_summary;
use crate::error::{AnalysisError, Result};
use crate::models::{BatteryRange, Dataset};
use crate::utils::constants::COL_HOUR;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeCount {
    pub range: BatteryRange,
    pub label: String,
    pub records: usize,
    /// Share of all records, including those outside every range
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourCharge {
    pub hour: i32,
    pub avg_charge: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatteryDistribution {
    /// All five ranges in ascending order
    pub ranges: Vec<RangeCount>,
    /// Charges outside 0-100%
    pub uncategorized: usize,
    pub highest_charge_hour: HourCharge,
    pub lowest_charge_hour: HourCharge,
}

pub struct BatteryAnalyzer;

impl BatteryAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, dataset: &Dataset) -> Result<BatteryDistribution> {
        if dataset.is_empty() {
            return Err(AnalysisError::EmptyDataset);
        }

        let mut counts = [0usize; 5];
        let mut uncategorized = 0;
        for record in dataset.records() {
            match BatteryRange::from_charge(record.battery_charge) {
                Some(range) => counts[range.index()] += 1,
                None => uncategorized += 1,
            }
        }

        let total = dataset.len() as f64;
        let ranges = BatteryRange::ALL
            .iter()
            .map(|range| RangeCount {
                range: *range,
                label: range.label().to_string(),
                records: counts[range.index()],
                percentage: counts[range.index()] as f64 / total * 100.0,
            })
            .collect();

        let missing_hours =
            || AnalysisError::MissingData(format!("every '{}' value is missing", COL_HOUR));
        let mut highest: Option<HourCharge> = None;
        let mut lowest: Option<HourCharge> = None;
        for hour in hourly_summary(dataset) {
            let current = HourCharge {
                hour: hour.hour,
                avg_charge: hour.avg_charge,
            };
            if highest.map_or(true, |h| current.avg_charge > h.avg_charge) {
                highest = Some(current);
            }
            if lowest.map_or(true, |l| current.avg_charge < l.avg_charge) {
                lowest = Some(current);
            }
        }

        Ok(BatteryDistribution {
            ranges,
            uncategorized,
            highest_charge_hour: highest.ok_or_else(missing_hours)?,
            lowest_charge_hour: lowest.ok_or_else(missing_hours)?,
        })
    }
}

impl Default for BatteryAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl BatteryDistribution {
    pub fn range(&self, range: BatteryRange) -> &RangeCount {
        &self.ranges[range.index()]
    }

    pub fn summary(&self) -> String {
        // Most populated ranges first
        let mut ordered: Vec<&RangeCount> = self.ranges.iter().collect();
        ordered.sort_by(|a, b| b.records.cmp(&a.records));

        let mut summary = String::from("Battery Charge Distribution:\n");
        for range in ordered {
            summary.push_str(&format!(
                "- {}: {} records ({:.1}%)\n",
                range.label, range.records, range.percentage
            ));
        }
        if self.uncategorized > 0 {
            summary.push_str(&format!(
                "- Outside 0-100%: {} records\n",
                self.uncategorized
            ));
        }

        summary.push_str(&format!(
            "\nBattery Patterns by Time:\n\
            - Highest avg battery at {}:00 ({:.1}%)\n\
            - Lowest avg battery at {}:00 ({:.1}%)",
            self.highest_charge_hour.hour,
            self.highest_charge_hour.avg_charge,
            self.lowest_charge_hour.hour,
            self.lowest_charge_hour.avg_charge
        ));
        summary
    }
}
