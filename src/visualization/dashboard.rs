use crate::analyzers::{TemporalStatistics, VehicleStatistics};
use crate::error::{AnalysisError, Result};
use crate::models::{Dataset, TimePeriod};
use crate::utils::constants::{FONT_FAMILY, FONT_SEARCH_PATTERNS, HISTOGRAM_BINS};
use crate::utils::stats::{histogram, mean};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontStyle;
use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

type Panel<'b> = DrawingArea<BitMapBackend<'b>, Shift>;
type PanelChart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const LIGHT_CORAL: RGBColor = RGBColor(240, 128, 128);
const DARK_GREEN: RGBColor = RGBColor(0, 128, 0);
const ORANGE: RGBColor = RGBColor(255, 165, 0);
const PURPLE: RGBColor = RGBColor(128, 0, 128);
const STEEL_BLUE: RGBColor = RGBColor(70, 130, 180);

// Diverging red-yellow-green ramp
const RAMP_LOW: RGBColor = RGBColor(215, 48, 39);
const RAMP_MID: RGBColor = RGBColor(255, 255, 191);
const RAMP_HIGH: RGBColor = RGBColor(26, 152, 80);

/// Fonts loaded so far, keyed by configured path, plus the one currently
/// registered. Plotters keeps a single global table per family name.
#[derive(Default)]
struct FontRegistry {
    active: Option<Option<PathBuf>>,
    loaded: HashMap<Option<PathBuf>, Option<&'static [u8]>>,
}

static FONTS: Mutex<Option<FontRegistry>> = Mutex::new(None);

/// Colour for a charge level on the red → yellow → green scale
pub fn charge_color(charge: f64) -> RGBColor {
    let t = (charge / 100.0).clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8, f: f64| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
    let (from, to, f) = if t < 0.5 {
        (RAMP_LOW, RAMP_MID, t * 2.0)
    } else {
        (RAMP_MID, RAMP_HIGH, (t - 0.5) * 2.0)
    };
    RGBColor(lerp(from.0, to.0, f), lerp(from.1, to.1, f), lerp(from.2, to.2, f))
}

fn locate_font(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        warn!("Configured font {} not found, searching system fonts", path.display());
    }

    FONT_SEARCH_PATTERNS
        .iter()
        .filter_map(|pattern| glob::glob(pattern).ok())
        .flat_map(|paths| paths.filter_map(|entry| entry.ok()))
        .find(|path| path.is_file())
}

fn register(bytes: &'static [u8]) -> bool {
    plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes).is_ok()
}

fn load_font(configured: Option<&Path>) -> Option<&'static [u8]> {
    let Some(path) = locate_font(configured) else {
        warn!("No TrueType font found; charts will be drawn without text");
        return None;
    };
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to read font {}: {}", path.display(), e);
            return None;
        }
    };
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    if register(bytes) {
        debug!("Registered chart font {}", path.display());
        Some(bytes)
    } else {
        warn!("Font {} could not be parsed", path.display());
        None
    }
}

/// Register the font for `configured`, switching fonts when a different path
/// was used by an earlier render. Each distinct path is read once.
fn prepare_font(configured: Option<&Path>) -> bool {
    let mut guard = FONTS.lock().unwrap_or_else(PoisonError::into_inner);
    let fonts = guard.get_or_insert_with(FontRegistry::default);
    let key = configured.map(Path::to_path_buf);

    if fonts.active.as_ref() == Some(&key) {
        return fonts.loaded.get(&key).copied().flatten().is_some();
    }

    let ready = match fonts.loaded.get(&key).copied() {
        Some(cached) => cached.is_some_and(register),
        None => {
            let loaded = load_font(configured);
            fonts.loaded.insert(key.clone(), loaded);
            loaded.is_some()
        }
    };
    fonts.active = Some(key);
    ready
}

fn padded(lo: f64, hi: f64) -> Range<f64> {
    if !(hi > lo) {
        return (lo - 1.0)..(hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad)..(hi + pad)
}

/// Hour axis covering 0-23 and any hour outside it
fn hour_axis(hours: impl Iterator<Item = f64>) -> Range<f64> {
    let (first, last) = hours.fold((0.0, 23.0), |(lo, hi), h| (f64::min(lo, h), f64::max(hi, h)));
    (first - 0.5)..(last + 0.5)
}

fn period_tick(x: &f64) -> String {
    let nearest = x.round();
    if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
        return String::new();
    }
    TimePeriod::ALL
        .get(nearest as usize)
        .map(|p| p.label().to_string())
        .unwrap_or_default()
}

/// Renders the six-panel fleet dashboard as a PNG
pub struct DashboardRenderer {
    width: u32,
    height: u32,
    font_path: Option<PathBuf>,
}

impl DashboardRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            font_path: None,
        }
    }

    /// Font for titles and labels; `None` searches the system font directories.
    ///
    /// The font is registered process-wide, so concurrent renders with
    /// different fonts may draw with either one.
    pub fn with_font_path(mut self, font_path: Option<PathBuf>) -> Self {
        self.font_path = font_path;
        self
    }

    pub fn render(
        &self,
        dataset: &Dataset,
        temporal: &TemporalStatistics,
        vehicles: &VehicleStatistics,
        path: &Path,
    ) -> Result<()> {
        if dataset.is_empty() {
            return Err(AnalysisError::EmptyDataset);
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let panels = Panels {
            text: prepare_font(self.font_path.as_deref()),
        };

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(AnalysisError::visualization)?;
        let areas = root.split_evenly((2, 3));

        panels.charge_distribution(&areas[0], dataset)?;
        panels.hourly_activity(&areas[1], temporal)?;
        panels.charge_by_hour(&areas[2], temporal)?;
        panels.geographic_scatter(&areas[3], dataset)?;
        panels.vehicle_activity(&areas[4], vehicles)?;
        if dataset.has_time_periods() {
            panels.charge_by_period(&areas[5], temporal)?;
        } else {
            panels.charge_vs_hour(&areas[5], dataset)?;
        }

        root.present().map_err(AnalysisError::visualization)?;
        info!("Visualizations saved to {}", path.display());
        Ok(())
    }
}

struct Panels {
    text: bool,
}

impl Panels {
    fn build<'a, 'b>(
        &self,
        area: &'a Panel<'b>,
        labels: [&str; 3],
        x: Range<f64>,
        y: Range<f64>,
        x_formatter: Option<&dyn Fn(&f64) -> String>,
    ) -> Result<PanelChart<'a, 'b>> {
        let mut builder = ChartBuilder::on(area);
        builder
            .margin(15)
            .x_label_area_size(if self.text { 45 } else { 5 })
            .y_label_area_size(if self.text { 60 } else { 5 });
        if self.text {
            builder.caption(labels[0], (FONT_FAMILY, 24));
        }
        let mut chart = builder
            .build_cartesian_2d(x, y)
            .map_err(AnalysisError::visualization)?;

        let mut mesh = chart.configure_mesh();
        if self.text {
            mesh.x_desc(labels[1])
                .y_desc(labels[2])
                .label_style((FONT_FAMILY, 14))
                .axis_desc_style((FONT_FAMILY, 16));
            if let Some(formatter) = x_formatter {
                mesh.x_labels(TimePeriod::ALL.len()).x_label_formatter(formatter);
            }
        } else {
            mesh.x_labels(0).y_labels(0);
        }
        mesh.draw().map_err(AnalysisError::visualization)?;

        Ok(chart)
    }

    fn draw_histogram(
        chart: &mut PanelChart<'_, '_>,
        bins: &[(f64, f64, usize)],
        color: RGBColor,
    ) -> Result<()> {
        chart
            .draw_series(bins.iter().map(|&(lo, hi, count)| {
                Rectangle::new([(lo, 0.0), (hi, count as f64)], color.mix(0.7).filled())
            }))
            .map_err(AnalysisError::visualization)?;
        chart
            .draw_series(bins.iter().map(|&(lo, hi, count)| {
                Rectangle::new([(lo, 0.0), (hi, count as f64)], BLACK.stroke_width(1))
            }))
            .map_err(AnalysisError::visualization)?;
        Ok(())
    }

    fn charge_distribution(&self, area: &Panel<'_>, dataset: &Dataset) -> Result<()> {
        let charges = dataset.battery_charges();
        let bins = histogram(&charges, HISTOGRAM_BINS);
        let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
            return Ok(());
        };
        let peak = bins.iter().map(|b| b.2).max().unwrap_or(0) as f64;
        let y_max = (peak * 1.1).max(1.0);

        let mut chart = self.build(
            area,
            ["Battery Charge Distribution", "Average Battery Charge (%)", "Frequency"],
            first.0..last.1,
            0.0..y_max,
            None,
        )?;
        Self::draw_histogram(&mut chart, &bins, SKY_BLUE)?;

        if let Some(avg) = mean(&charges) {
            let line = chart
                .draw_series(LineSeries::new(vec![(avg, 0.0), (avg, y_max)], RED.stroke_width(2)))
                .map_err(AnalysisError::visualization)?;
            if self.text {
                line.label(format!("Mean: {:.1}%", avg))
                    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
                chart
                    .configure_series_labels()
                    .label_font((FONT_FAMILY, 14))
                    .background_style(WHITE.mix(0.8))
                    .border_style(BLACK)
                    .draw()
                    .map_err(AnalysisError::visualization)?;
            }
        }
        Ok(())
    }

    fn hourly_activity(&self, area: &Panel<'_>, temporal: &TemporalStatistics) -> Result<()> {
        let hours = hour_axis(temporal.hourly.iter().map(|h| h.hour as f64));
        let peak = temporal.hourly.iter().map(|h| h.records).max().unwrap_or(0) as f64;

        let mut chart = self.build(
            area,
            ["Activity Pattern by Hour", "Hour of Day", "Number of Records"],
            hours,
            0.0..(peak * 1.1).max(1.0),
            None,
        )?;
        chart
            .draw_series(temporal.hourly.iter().map(|h| {
                let x = h.hour as f64;
                Rectangle::new([(x - 0.4, 0.0), (x + 0.4, h.records as f64)], LIGHT_CORAL.mix(0.8).filled())
            }))
            .map_err(AnalysisError::visualization)?;
        Ok(())
    }

    fn charge_by_hour(&self, area: &Panel<'_>, temporal: &TemporalStatistics) -> Result<()> {
        let points: Vec<(f64, f64)> = temporal
            .hourly
            .iter()
            .map(|h| (h.hour as f64, h.avg_charge))
            .collect();
        let lo = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let hi = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

        let mut chart = self.build(
            area,
            ["Battery Charge Pattern by Hour", "Hour of Day", "Average Battery Charge (%)"],
            hour_axis(points.iter().map(|p| p.0)),
            padded(lo, hi),
            None,
        )?;
        chart
            .draw_series(LineSeries::new(points.iter().copied(), DARK_GREEN.stroke_width(2)))
            .map_err(AnalysisError::visualization)?;
        chart
            .draw_series(points.iter().map(|&p| Circle::new(p, 4, DARK_GREEN.filled())))
            .map_err(AnalysisError::visualization)?;
        Ok(())
    }

    fn geographic_scatter(&self, area: &Panel<'_>, dataset: &Dataset) -> Result<()> {
        let points: Vec<(f64, f64, f64)> = dataset
            .records()
            .iter()
            .filter_map(|r| r.position().map(|(lat, lon)| (lon, lat, r.battery_charge)))
            .collect();

        let (x, y) = if points.is_empty() {
            (0.0..1.0, 0.0..1.0)
        } else {
            let fold = |f: fn(&(f64, f64, f64)) -> f64| {
                points.iter().map(f).fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                })
            };
            let (lon_lo, lon_hi) = fold(|p| p.0);
            let (lat_lo, lat_hi) = fold(|p| p.1);
            (padded(lon_lo, lon_hi), padded(lat_lo, lat_hi))
        };

        let mut chart = self.build(
            area,
            ["Geographic Distribution with Battery Levels", "Longitude", "Latitude"],
            x,
            y,
            None,
        )?;
        chart
            .draw_series(
                points
                    .iter()
                    .map(|&(lon, lat, charge)| Circle::new((lon, lat), 2, charge_color(charge).mix(0.6).filled())),
            )
            .map_err(AnalysisError::visualization)?;
        Ok(())
    }

    fn vehicle_activity(&self, area: &Panel<'_>, vehicles: &VehicleStatistics) -> Result<()> {
        let counts: Vec<f64> = vehicles.vehicles.iter().map(|v| v.records as f64).collect();
        let bins = histogram(&counts, HISTOGRAM_BINS);
        let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
            return Ok(());
        };
        let peak = bins.iter().map(|b| b.2).max().unwrap_or(0) as f64;

        let mut chart = self.build(
            area,
            ["Vehicle Activity Distribution", "Number of Records per Vehicle", "Number of Vehicles"],
            first.0..last.1,
            0.0..(peak * 1.1).max(1.0),
            None,
        )?;
        Self::draw_histogram(&mut chart, &bins, ORANGE)
    }

    fn charge_by_period(&self, area: &Panel<'_>, temporal: &TemporalStatistics) -> Result<()> {
        let bars: Vec<(f64, f64)> = temporal
            .periods
            .iter()
            .filter_map(|p| p.avg_charge.map(|avg| (p.period.index() as f64, avg)))
            .collect();
        let hi = bars.iter().map(|b| b.1).fold(0.0, f64::max);
        let lo = bars.iter().map(|b| b.1).fold(0.0, f64::min);

        let mut chart = self.build(
            area,
            ["Battery Charge by Time Period", "Time Period", "Average Battery Charge (%)"],
            -0.5..(TimePeriod::ALL.len() as f64 - 0.5),
            lo.min(0.0)..(hi * 1.1).max(1.0),
            Some(&period_tick),
        )?;
        chart
            .draw_series(bars.iter().map(|&(x, avg)| {
                Rectangle::new([(x - 0.35, 0.0), (x + 0.35, avg)], PURPLE.mix(0.8).filled())
            }))
            .map_err(AnalysisError::visualization)?;
        Ok(())
    }

    fn charge_vs_hour(&self, area: &Panel<'_>, dataset: &Dataset) -> Result<()> {
        let points: Vec<(f64, f64)> = dataset
            .records()
            .iter()
            .filter_map(|r| Some((r.hour? as f64, r.battery_charge)))
            .collect();
        let lo = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let hi = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

        let mut chart = self.build(
            area,
            ["Battery Charge vs Hour (Scatter)", "Hour", "Battery Charge (%)"],
            hour_axis(points.iter().map(|p| p.0)),
            padded(lo, hi),
            None,
        )?;
        chart
            .draw_series(points.iter().map(|&p| Circle::new(p, 2, STEEL_BLUE.mix(0.3).filled())))
            .map_err(AnalysisError::visualization)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::{TemporalAnalyzer, VehicleAnalyzer};
    use crate::models::RawRecord;
    use crate::processors::Preprocessor;
    use tempfile::TempDir;

    fn render(rows: Vec<RawRecord>) -> (TempDir, PathBuf) {
        let (dataset, _) = Preprocessor::new().process(rows).unwrap();
        let temporal = TemporalAnalyzer::new().analyze(&dataset).unwrap();
        let vehicles = VehicleAnalyzer::new().analyze(&dataset).unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("charts").join("dashboard.png");
        DashboardRenderer::new(900, 600)
            .render(&dataset, &temporal, &vehicles, &path)
            .unwrap();
        (dir, path)
    }

    #[test]
    fn test_render_dashboard() {
        let rows = (0..48)
            .map(|i| {
                RawRecord::new(
                    format!("V{}", i % 5),
                    2024,
                    3,
                    1 + (i % 28) as i32,
                    (i % 24) as i32,
                    Some(0.0),
                    Some(12.9 + i as f64 * 0.01),
                    Some(77.5 + i as f64 * 0.02),
                    Some((i * 2) as f64),
                )
            })
            .collect();

        let (_dir, path) = render(rows);
        let size = std::fs::metadata(&path).unwrap().len();
        assert!(size > 1000);
    }

    #[test]
    fn test_render_without_positions_or_periods() {
        // Hours past 24 carry no period label, so the last panel falls back to a scatter
        let rows = vec![
            RawRecord::new("V1", 2024, 2, 30, 25, None, None, None, Some(40.0)),
            RawRecord::new("V2", 2024, 2, 30, 30, None, None, None, Some(60.0)),
        ];
        let (_dir, path) = render(rows);
        assert!(path.exists());
    }

    #[test]
    fn test_charge_color_ramp() {
        assert_eq!(charge_color(0.0), RAMP_LOW);
        assert_eq!(charge_color(50.0), RAMP_MID);
        assert_eq!(charge_color(100.0), RAMP_HIGH);
        assert_eq!(charge_color(150.0), RAMP_HIGH);
    }

    #[test]
    fn test_font_lookup_per_configured_path() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.ttf");
        let second = dir.path().join("second.ttf");

        let system = prepare_font(None);
        assert_eq!(prepare_font(Some(first.as_path())), system);
        assert_eq!(prepare_font(Some(second.as_path())), system);

        let guard = FONTS.lock().unwrap();
        let fonts = guard.as_ref().unwrap();
        assert!(fonts.loaded.contains_key(&Some(first)));
        assert!(fonts.loaded.contains_key(&Some(second)));
    }

    #[test]
    fn test_hour_axis_covers_out_of_range_hours() {
        assert_eq!(hour_axis([3.0, 7.0].into_iter()), -0.5..23.5);
        assert_eq!(hour_axis([-2.0, 30.0].into_iter()), -2.5..30.5);
    }

    #[test]
    fn test_period_ticks() {
        assert_eq!(period_tick(&0.0), "Night");
        assert_eq!(period_tick(&3.0), "Evening");
        assert_eq!(period_tick(&0.5), "");
        assert_eq!(period_tick(&7.0), "");
    }
}
