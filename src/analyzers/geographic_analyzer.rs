use crate::error::{AnalysisError, Result};
use crate::models::{Dataset, LATITUDE_BANDS, LONGITUDE_BANDS};
use crate::utils::constants::{GEO_BIN_COUNT, TOP_REGIONS};
use crate::utils::stats::{mean, EqualWidthBins};
use serde::Serialize;
use std::collections::HashSet;

/// One cell of the latitude × longitude grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoCell {
    pub lat_band: String,
    pub lon_band: String,
    pub records: usize,
    pub unique_vehicles: usize,
    pub avg_charge: Option<f64>,
}

impl GeoCell {
    pub fn label(&self) -> String {
        format!("{}-{}", self.lat_band, self.lon_band)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GeographicStatistics {
    pub latitude_edges: Vec<f64>,
    pub longitude_edges: Vec<f64>,
    /// Row-major grid, south-west first; empty when either coordinate column is entirely null
    pub cells: Vec<GeoCell>,
    pub top_regions: Vec<GeoCell>,
    /// Rows excluded for a missing coordinate
    pub rows_without_position: usize,
}

#[derive(Default)]
struct CellAccumulator<'a> {
    charges: Vec<f64>,
    vins: HashSet<&'a str>,
}

pub struct GeographicAnalyzer {
    top_n: usize,
}

impl GeographicAnalyzer {
    pub fn new() -> Self {
        Self { top_n: TOP_REGIONS }
    }

    pub fn analyze(&self, dataset: &Dataset) -> Result<GeographicStatistics> {
        if dataset.is_empty() {
            return Err(AnalysisError::EmptyDataset);
        }

        let positioned: Vec<_> = dataset
            .records()
            .iter()
            .filter_map(|r| r.position().map(|pos| (r, pos)))
            .collect();
        let rows_without_position = dataset.len() - positioned.len();

        // Each axis is cut over every non-null value in its own column
        let (Some(lat_bins), Some(lon_bins)) = (
            EqualWidthBins::from_values(&dataset.latitudes(), GEO_BIN_COUNT),
            EqualWidthBins::from_values(&dataset.longitudes(), GEO_BIN_COUNT),
        ) else {
            return Ok(GeographicStatistics {
                latitude_edges: Vec::new(),
                longitude_edges: Vec::new(),
                cells: Vec::new(),
                top_regions: Vec::new(),
                rows_without_position,
            });
        };

        let mut grid: Vec<CellAccumulator> = (0..GEO_BIN_COUNT * GEO_BIN_COUNT)
            .map(|_| CellAccumulator::default())
            .collect();

        for (record, (lat, lon)) in &positioned {
            if let (Some(row), Some(col)) = (lat_bins.bin_of(*lat), lon_bins.bin_of(*lon)) {
                let cell = &mut grid[row * GEO_BIN_COUNT + col];
                cell.charges.push(record.battery_charge);
                cell.vins.extend(record.vin.as_deref());
            }
        }

        let cells: Vec<GeoCell> = grid
            .iter()
            .enumerate()
            .map(|(i, acc)| GeoCell {
                lat_band: LATITUDE_BANDS[i / GEO_BIN_COUNT].to_string(),
                lon_band: LONGITUDE_BANDS[i % GEO_BIN_COUNT].to_string(),
                records: acc.charges.len(),
                unique_vehicles: acc.vins.len(),
                avg_charge: mean(&acc.charges),
            })
            .collect();

        let mut top_regions: Vec<GeoCell> =
            cells.iter().filter(|c| c.records > 0).cloned().collect();
        top_regions.sort_by(|a, b| b.records.cmp(&a.records));
        top_regions.truncate(self.top_n);

        Ok(GeographicStatistics {
            latitude_edges: lat_bins.edges().to_vec(),
            longitude_edges: lon_bins.edges().to_vec(),
            cells,
            top_regions,
            rows_without_position,
        })
    }
}

impl Default for GeographicAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl GeographicStatistics {
    pub fn cell(&self, lat_band: &str, lon_band: &str) -> Option<&GeoCell> {
        self.cells
            .iter()
            .find(|c| c.lat_band == lat_band && c.lon_band == lon_band)
    }

    pub fn summary(&self) -> String {
        if self.cells.is_empty() {
            return "Geographic Distribution:\n- No coordinates recorded".to_string();
        }

        let mut summary = String::from("Geographic Distribution:\n");
        for cell in &self.top_regions {
            summary.push_str(&format!(
                "- {}: {} records, {} vehicles (avg battery: {:.1}%)\n",
                cell.label(),
                cell.records,
                cell.unique_vehicles,
                cell.avg_charge.unwrap_or(f64::NAN)
            ));
        }
        if self.rows_without_position > 0 {
            summary.push_str(&format!(
                "- {} records without coordinates excluded\n",
                self.rows_without_position
            ));
        }
        summary.trim_end().to_string()
    }
}
