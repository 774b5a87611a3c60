/// Required input columns, in file order
pub const COL_VIN: &str = "vin";
pub const COL_YEAR: &str = "yearr";
pub const COL_MONTH: &str = "mmm";
pub const COL_DAY: &str = "ddd";
pub const COL_HOUR: &str = "hr";
pub const COL_HALF_HOUR: &str = "half_hour";
pub const COL_LAT: &str = "avg_lat";
pub const COL_LONG: &str = "avg_long";
pub const COL_BATTERY: &str = "avg_bat_charge";

pub const REQUIRED_COLUMNS: [&str; 9] = [
    COL_VIN,
    COL_YEAR,
    COL_MONTH,
    COL_DAY,
    COL_HOUR,
    COL_HALF_HOUR,
    COL_LAT,
    COL_LONG,
    COL_BATTERY,
];

/// Field values treated as missing
pub const NULL_MARKERS: [&str; 7] = ["NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// File names
pub const DEFAULT_INPUT_FILE: &str = "fleet_data.csv";
pub const DEFAULT_CHART_FILE: &str = "fleet_analysis_visualizations.png";
pub const DEFAULT_VEHICLE_SUMMARY_FILE: &str = "fleet_vehicle_summary.csv";
pub const DEFAULT_HOURLY_SUMMARY_FILE: &str = "fleet_hourly_summary.csv";

/// Insight thresholds
pub const LOW_BATTERY_THRESHOLD: f64 = 30.0;
pub const LOW_BATTERY_ALERT_FRACTION: f64 = 0.10;
pub const BATTERY_STD_ALERT: f64 = 25.0;

/// Bucketing
pub const GEO_BIN_COUNT: usize = 5;
pub const TOP_HOURS: usize = 3;
pub const TOP_REGIONS: usize = 5;

/// Chart defaults
pub const DEFAULT_CHART_WIDTH: u32 = 2000;
pub const DEFAULT_CHART_HEIGHT: u32 = 1500;
pub const HISTOGRAM_BINS: usize = 30;
pub const FONT_FAMILY: &str = "sans-serif";
pub const FONT_SEARCH_PATTERNS: [&str; 4] = [
    "/usr/share/fonts/**/DejaVuSans.ttf",
    "/usr/share/fonts/**/LiberationSans-Regular.ttf",
    "/usr/share/fonts/**/*.ttf",
    "/Library/Fonts/*.ttf",
];
