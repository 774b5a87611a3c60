use crate::analyzers::InsightThresholds;
use crate::error::{AnalysisError, Result};
use crate::utils::constants::{
    BATTERY_STD_ALERT, DEFAULT_CHART_FILE, DEFAULT_CHART_HEIGHT, DEFAULT_CHART_WIDTH,
    DEFAULT_HOURLY_SUMMARY_FILE, DEFAULT_INPUT_FILE, DEFAULT_VEHICLE_SUMMARY_FILE,
    LOW_BATTERY_ALERT_FRACTION, LOW_BATTERY_THRESHOLD,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use validator::Validate;

/// Run settings. Every field has a default so a config file may set any subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AnalysisConfig {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,

    #[validate(length(min = 1))]
    pub chart_file: String,
    #[validate(length(min = 1))]
    pub vehicle_summary_file: String,
    #[validate(length(min = 1))]
    pub hourly_summary_file: String,

    #[validate(range(min = 0.0, max = 100.0))]
    pub low_battery_threshold: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub low_battery_alert_fraction: f64,
    #[validate(range(min = 0.0))]
    pub battery_std_alert: f64,

    #[validate(range(min = 300, max = 10000))]
    pub chart_width: u32,
    #[validate(range(min = 200, max = 10000))]
    pub chart_height: u32,
    /// TrueType font for chart text; discovered from system directories when unset
    pub font_path: Option<PathBuf>,
    pub render_charts: bool,

    pub summary_json: Option<PathBuf>,
    pub delimiter: char,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_FILE),
            output_dir: PathBuf::from("."),
            chart_file: DEFAULT_CHART_FILE.to_string(),
            vehicle_summary_file: DEFAULT_VEHICLE_SUMMARY_FILE.to_string(),
            hourly_summary_file: DEFAULT_HOURLY_SUMMARY_FILE.to_string(),
            low_battery_threshold: LOW_BATTERY_THRESHOLD,
            low_battery_alert_fraction: LOW_BATTERY_ALERT_FRACTION,
            battery_std_alert: BATTERY_STD_ALERT,
            chart_width: DEFAULT_CHART_WIDTH,
            chart_height: DEFAULT_CHART_HEIGHT,
            font_path: None,
            render_charts: true,
            summary_json: None,
            delimiter: ',',
        }
    }
}

impl AnalysisConfig {
    /// Load settings from a TOML, YAML or JSON file, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            debug!("No configuration file given, using defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            return Err(AnalysisError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        info!("Loading configuration from {}", path.display());
        let config = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize::<Self>()?;
        Ok(config)
    }

    /// Check field ranges after all overrides have been applied.
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        self.delimiter_byte()?;
        Ok(self)
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(|b| b.is_ascii() && !b.is_ascii_alphanumeric())
            .ok_or_else(|| {
                AnalysisError::Config(format!("Unsupported delimiter '{}'", self.delimiter))
            })
    }

    pub fn chart_path(&self) -> PathBuf {
        self.output_dir.join(&self.chart_file)
    }

    pub fn vehicle_summary_path(&self) -> PathBuf {
        self.output_dir.join(&self.vehicle_summary_file)
    }

    pub fn hourly_summary_path(&self) -> PathBuf {
        self.output_dir.join(&self.hourly_summary_file)
    }

    pub fn thresholds(&self) -> InsightThresholds {
        InsightThresholds {
            low_battery_threshold: self.low_battery_threshold,
            low_battery_alert_fraction: self.low_battery_alert_fraction,
            battery_std_alert: self.battery_std_alert,
        }
    }
}
