use crate::error::{AnalysisError, Result};
use crate::models::{Dataset, TelemetryRecord};
use crate::utils::constants::COL_VIN;
use crate::utils::stats::{max, mean, min, sample_std};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-vehicle aggregate row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleStats {
    pub vin: String,
    pub avg_charge: f64,
    pub charge_std: Option<f64>,
    pub min_charge: f64,
    pub max_charge: f64,
    pub records: usize,
    /// Spread of latitude, a mobility proxy
    pub lat_mobility: Option<f64>,
    /// Spread of longitude, a mobility proxy
    pub long_mobility: Option<f64>,
    pub avg_latitude: Option<f64>,
    pub avg_longitude: Option<f64>,
}

impl VehicleStats {
    fn from_records(vin: &str, records: &[&TelemetryRecord]) -> Option<Self> {
        let charges: Vec<f64> = records.iter().map(|r| r.battery_charge).collect();
        let lats: Vec<f64> = records.iter().filter_map(|r| r.latitude).collect();
        let longs: Vec<f64> = records.iter().filter_map(|r| r.longitude).collect();

        Some(Self {
            vin: vin.to_string(),
            avg_charge: mean(&charges)?,
            charge_std: sample_std(&charges),
            min_charge: min(&charges)?,
            max_charge: max(&charges)?,
            records: records.len(),
            lat_mobility: sample_std(&lats),
            long_mobility: sample_std(&longs),
            avg_latitude: mean(&lats),
            avg_longitude: mean(&longs),
        })
    }
}

/// A vehicle singled out by one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleHighlight {
    pub vin: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleStatistics {
    /// One row per vehicle, ordered by vin
    pub vehicles: Vec<VehicleStats>,
    pub most_active: VehicleHighlight,
    pub least_active: VehicleHighlight,
    pub avg_records_per_vehicle: f64,
    pub highest_avg_charge: VehicleHighlight,
    pub lowest_avg_charge: VehicleHighlight,
    /// Smallest charge spread; `None` when no vehicle has two records
    pub most_consistent: Option<VehicleHighlight>,
}

/// Group records by vin, in vin order; rows without a vin are left out
pub fn group_by_vehicle(dataset: &Dataset) -> BTreeMap<&str, Vec<&TelemetryRecord>> {
    let mut groups: BTreeMap<&str, Vec<&TelemetryRecord>> = BTreeMap::new();
    for record in dataset.records() {
        if let Some(vin) = record.vin.as_deref() {
            groups.entry(vin).or_default().push(record);
        }
    }
    groups
}

/// First vehicle with the extreme value of `metric`; `prefer` decides if a candidate beats the incumbent
fn pick<F, P>(vehicles: &[VehicleStats], metric: F, prefer: P) -> Option<VehicleHighlight>
where
    F: Fn(&VehicleStats) -> Option<f64>,
    P: Fn(f64, f64) -> bool,
{
    let mut best: Option<VehicleHighlight> = None;
    for vehicle in vehicles {
        let Some(value) = metric(vehicle) else {
            continue;
        };
        if best.as_ref().map_or(true, |b| prefer(value, b.value)) {
            best = Some(VehicleHighlight {
                vin: vehicle.vin.clone(),
                value,
            });
        }
    }
    best
}

pub struct VehicleAnalyzer;

impl VehicleAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, dataset: &Dataset) -> Result<VehicleStatistics> {
        let vehicles: Vec<VehicleStats> = group_by_vehicle(dataset)
            .iter()
            .filter_map(|(vin, records)| VehicleStats::from_records(vin, records))
            .collect();

        if dataset.is_empty() {
            return Err(AnalysisError::EmptyDataset);
        }
        if vehicles.is_empty() {
            return Err(AnalysisError::MissingData(format!("every '{}' value is missing", COL_VIN)));
        }

        let larger = |candidate: f64, incumbent: f64| candidate > incumbent;
        let smaller = |candidate: f64, incumbent: f64| candidate < incumbent;
        let count = |v: &VehicleStats| Some(v.records as f64);
        let avg = |v: &VehicleStats| Some(v.avg_charge);

        let most_active = pick(&vehicles, count, larger).ok_or(AnalysisError::EmptyDataset)?;
        let least_active = pick(&vehicles, count, smaller).ok_or(AnalysisError::EmptyDataset)?;
        let highest_avg_charge = pick(&vehicles, avg, larger).ok_or(AnalysisError::EmptyDataset)?;
        let lowest_avg_charge = pick(&vehicles, avg, smaller).ok_or(AnalysisError::EmptyDataset)?;
        let most_consistent = pick(&vehicles, |v| v.charge_std, smaller);

        let grouped: usize = vehicles.iter().map(|v| v.records).sum();
        let avg_records_per_vehicle = grouped as f64 / vehicles.len() as f64;

        Ok(VehicleStatistics {
            vehicles,
            most_active,
            least_active,
            avg_records_per_vehicle,
            highest_avg_charge,
            lowest_avg_charge,
            most_consistent,
        })
    }
}

impl Default for VehicleAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl VehicleStatistics {
    pub fn summary(&self) -> String {
        let consistent = match &self.most_consistent {
            Some(v) => format!("{} (std: {:.1}%)", v.vin, v.value),
            None => "n/a (no vehicle has more than one record)".to_string(),
        };

        format!(
            "Vehicle Activity Summary:\n\
            - Most active vehicle: {} ({} records)\n\
            - Least active vehicle: {} ({} records)\n\
            - Average records per vehicle: {:.0}\n\n\
            Battery Behavior by Vehicle:\n\
            - Vehicle with highest avg charge: {} ({:.1}%)\n\
            - Vehicle with lowest avg charge: {} ({:.1}%)\n\
            - Most consistent battery usage: {}",
            self.most_active.vin,
            self.most_active.value as usize,
            self.least_active.vin,
            self.least_active.value as usize,
            self.avg_records_per_vehicle,
            self.highest_avg_charge.vin,
            self.highest_avg_charge.value,
            self.lowest_avg_charge.vin,
            self.lowest_avg_charge.value,
            consistent,
        )
    }

    /// Vehicles ordered by record count, busiest first
    pub fn by_activity(&self) -> Vec<&VehicleStats> {
        let mut ranked: Vec<&VehicleStats> = self.vehicles.iter().collect();
        ranked.sort_by(|a, b| b.records.cmp(&a.records));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRecord;
    use crate::processors::Preprocessor;

    fn dataset(rows: &[(&str, i32, f64, f64)]) -> Dataset {
        let raw = rows
            .iter()
            .map(|(vin, hour, charge, lat)| {
                RawRecord::new(*vin, 2024, 1, 10, *hour, None, Some(*lat), Some(77.5), Some(*charge))
            })
            .collect();
        Preprocessor::new().process(raw).unwrap().0
    }

    #[test]
    fn test_vehicle_grouping() {
        let ds = dataset(&[
            ("V2", 1, 80.0, 12.0),
            ("V1", 1, 10.0, 12.0),
            ("V1", 2, 30.0, 12.2),
            ("V1", 3, 20.0, 12.4),
            ("V3", 1, 55.0, 13.0),
            ("V3", 2, 55.0, 13.0),
        ]);
        let stats = VehicleAnalyzer::new().analyze(&ds).unwrap();

        let vins: Vec<&str> = stats.vehicles.iter().map(|v| v.vin.as_str()).collect();
        assert_eq!(vins, vec!["V1", "V2", "V3"]);

        let v1 = &stats.vehicles[0];
        assert_eq!(v1.records, 3);
        assert_eq!(v1.avg_charge, 20.0);
        assert_eq!((v1.min_charge, v1.max_charge), (10.0, 30.0));
        assert!((v1.charge_std.unwrap() - 10.0).abs() < 1e-9);
        assert!((v1.lat_mobility.unwrap() - 0.2).abs() < 1e-9);
        assert_eq!(v1.long_mobility, Some(0.0));

        assert_eq!(stats.vehicles[1].charge_std, None);

        assert_eq!(stats.most_active.vin, "V1");
        assert_eq!(stats.least_active.vin, "V2");
        assert_eq!(stats.highest_avg_charge.vin, "V2");
        assert_eq!(stats.lowest_avg_charge.vin, "V1");
        assert_eq!(stats.most_consistent.as_ref().unwrap().vin, "V3");
        assert_eq!(stats.avg_records_per_vehicle, 2.0);
    }

    #[test]
    fn test_record_counts_sum_to_total() {
        let ds = dataset(&[
            ("A", 1, 10.0, 1.0),
            ("B", 2, 20.0, 1.0),
            ("A", 3, 30.0, 1.0),
            ("C", 4, 40.0, 1.0),
            ("B", 5, 50.0, 1.0),
        ]);
        let stats = VehicleAnalyzer::new().analyze(&ds).unwrap();
        let total: usize = stats.vehicles.iter().map(|v| v.records).sum();
        assert_eq!(total, ds.len());
    }

    #[test]
    fn test_by_activity_order() {
        let ds = dataset(&[("A", 1, 10.0, 1.0), ("B", 2, 20.0, 1.0), ("B", 3, 30.0, 1.0)]);
        let stats = VehicleAnalyzer::new().analyze(&ds).unwrap();
        let ranked = stats.by_activity();
        assert_eq!(ranked[0].vin, "B");
        assert!(stats.summary().contains("Most active vehicle: B (2 records)"));
    }
}
