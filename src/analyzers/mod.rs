pub mod battery_analyzer;
pub mod fleet_analyzer;
pub mod geographic_analyzer;
pub mod insights;
pub mod temporal_analyzer;
pub mod vehicle_analyzer;

pub use battery_analyzer::{BatteryAnalyzer, BatteryDistribution, HourCharge, RangeCount};
pub use fleet_analyzer::{FleetAnalyzer, FleetStatistics, HourActivity};
pub use geographic_analyzer::{GeoCell, GeographicAnalyzer, GeographicStatistics};
pub use insights::{InsightGenerator, InsightSummary, InsightThresholds, Priority, Recommendation};
pub use temporal_analyzer::{HourlyStats, PeriodStats, TemporalAnalyzer, TemporalStatistics};
pub use vehicle_analyzer::{VehicleAnalyzer, VehicleHighlight, VehicleStatistics, VehicleStats};
