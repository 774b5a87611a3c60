use crate::analyzers::{HourlyStats, VehicleStats};
use crate::error::Result;
use crate::utils::stats::round2;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

fn display_option(value: &Option<f64>) -> String {
    value.map_or_else(String::new, |v| format!("{:.2}", v))
}

/// Exported per-vehicle row
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct VehicleSummaryRow {
    pub vin: String,
    pub avg_battery: f64,
    #[tabled(display_with = "display_option")]
    pub battery_std: Option<f64>,
    pub min_battery: f64,
    pub max_battery: f64,
    pub total_records: usize,
    #[tabled(display_with = "display_option")]
    pub avg_latitude: Option<f64>,
    #[tabled(display_with = "display_option")]
    pub avg_longitude: Option<f64>,
}

impl From<&VehicleStats> for VehicleSummaryRow {
    fn from(stats: &VehicleStats) -> Self {
        Self {
            vin: stats.vin.clone(),
            avg_battery: round2(stats.avg_charge),
            battery_std: stats.charge_std.map(round2),
            min_battery: round2(stats.min_charge),
            max_battery: round2(stats.max_charge),
            total_records: stats.records,
            avg_latitude: stats.avg_latitude.map(round2),
            avg_longitude: stats.avg_longitude.map(round2),
        }
    }
}

/// Exported per-hour row
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct HourlySummaryRow {
    pub hr: i32,
    pub avg_battery: f64,
    pub total_records: usize,
    pub unique_vehicles: usize,
}

impl From<&HourlyStats> for HourlySummaryRow {
    fn from(stats: &HourlyStats) -> Self {
        Self {
            hr: stats.hour,
            avg_battery: round2(stats.avg_charge),
            total_records: stats.records,
            unique_vehicles: stats.unique_vehicles,
        }
    }
}

/// Writes the summary tables as CSV, overwriting existing files
pub struct SummaryWriter;

impl SummaryWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_vehicle_summary(&self, vehicles: &[VehicleStats], path: &Path) -> Result<Vec<VehicleSummaryRow>> {
        let rows: Vec<VehicleSummaryRow> = vehicles.iter().map(VehicleSummaryRow::from).collect();
        self.write_rows(&rows, path)?;
        info!("Vehicle summary exported to {}", path.display());
        Ok(rows)
    }

    pub fn write_hourly_summary(&self, hourly: &[HourlyStats], path: &Path) -> Result<Vec<HourlySummaryRow>> {
        let rows: Vec<HourlySummaryRow> = hourly.iter().map(HourlySummaryRow::from).collect();
        self.write_rows(&rows, path)?;
        info!("Hourly summary exported to {}", path.display());
        Ok(rows)
    }

    fn write_rows<T: Serialize>(&self, rows: &[T], path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Default for SummaryWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Render the first `max_rows` rows as a markdown table
pub fn preview_table<T: Tabled + Clone>(rows: &[T], max_rows: usize) -> String {
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

/// Serialize any report value as pretty JSON
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    info!("Run summary written to {}", path.display());
    Ok(())
}
