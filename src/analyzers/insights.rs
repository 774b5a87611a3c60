use crate::analyzers::fleet_analyzer::required_activity_extremes;
use crate::analyzers::vehicle_analyzer::{VehicleAnalyzer, VehicleHighlight};
use crate::error::{AnalysisError, Result};
use crate::models::Dataset;
use crate::utils::constants::{BATTERY_STD_ALERT, LOW_BATTERY_ALERT_FRACTION, LOW_BATTERY_THRESHOLD};
use crate::utils::stats::{mean, sample_std};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Priority {
    High,
    Medium,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => f.write_str("HIGH PRIORITY"),
            Self::Medium => f.write_str("MEDIUM PRIORITY"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub message: String,
}

/// Alert thresholds for recommendations
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InsightThresholds {
    /// Charges strictly below this count as low battery
    pub low_battery_threshold: f64,
    /// Low-battery share of records above which charging needs attention
    pub low_battery_alert_fraction: f64,
    /// Charge spread above which allocation needs review
    pub battery_std_alert: f64,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            low_battery_threshold: LOW_BATTERY_THRESHOLD,
            low_battery_alert_fraction: LOW_BATTERY_ALERT_FRACTION,
            battery_std_alert: BATTERY_STD_ALERT,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightSummary {
    pub avg_battery: f64,
    pub battery_std: Option<f64>,
    pub low_battery_threshold: f64,
    pub low_battery_records: usize,
    pub low_battery_percentage: f64,
    pub peak_hour: i32,
    pub unique_vehicles: usize,
    pub total_records: usize,
    pub recommendations: Vec<Recommendation>,
    pub operational_insights: Vec<String>,
    pub most_efficient_vehicle: VehicleHighlight,
    pub least_efficient_vehicle: VehicleHighlight,
}

const OPERATIONAL_INSIGHTS: [&str; 3] = [
    "Monitor battery levels during peak hours for optimal fleet management",
    "Use geographic data to optimize charging station placement",
    "Consider predictive maintenance based on battery degradation patterns",
];

pub struct InsightGenerator {
    thresholds: InsightThresholds,
}

impl InsightGenerator {
    pub fn new() -> Self {
        Self {
            thresholds: InsightThresholds::default(),
        }
    }

    pub fn with_thresholds(thresholds: InsightThresholds) -> Self {
        Self { thresholds }
    }

    pub fn generate(&self, dataset: &Dataset) -> Result<InsightSummary> {
        if dataset.is_empty() {
            return Err(AnalysisError::EmptyDataset);
        }

        let charges = dataset.battery_charges();
        let avg_battery = mean(&charges).ok_or(AnalysisError::EmptyDataset)?;
        let battery_std = sample_std(&charges);

        let total_records = dataset.len();
        let low_battery_records = dataset
            .records()
            .iter()
            .filter(|r| r.is_low_battery(self.thresholds.low_battery_threshold))
            .count();
        let low_battery_percentage = low_battery_records as f64 / total_records as f64 * 100.0;

        let (peak, _) = required_activity_extremes(dataset)?;

        let vehicles = VehicleAnalyzer::new().analyze(dataset)?;

        let mut recommendations = Vec::new();
        if low_battery_records as f64 > total_records as f64 * self.thresholds.low_battery_alert_fraction {
            recommendations.push(Recommendation {
                priority: Priority::High,
                message: "Implement proactive charging schedule - high percentage of low battery incidents".to_string(),
            });
            recommendations.push(Recommendation {
                priority: Priority::High,
                message: "Consider adding charging infrastructure in high-activity areas".to_string(),
            });
        }

        if battery_std.is_some_and(|std| std > self.thresholds.battery_std_alert) {
            recommendations.push(Recommendation {
                priority: Priority::Medium,
                message: "Battery usage patterns vary significantly across vehicles".to_string(),
            });
            recommendations.push(Recommendation {
                priority: Priority::Medium,
                message: "Review vehicle allocation and route optimization".to_string(),
            });
        }

        Ok(InsightSummary {
            avg_battery,
            battery_std,
            low_battery_threshold: self.thresholds.low_battery_threshold,
            low_battery_records,
            low_battery_percentage,
            peak_hour: peak.hour,
            unique_vehicles: dataset.unique_vehicles(),
            total_records,
            recommendations,
            operational_insights: OPERATIONAL_INSIGHTS.iter().map(|s| s.to_string()).collect(),
            most_efficient_vehicle: vehicles.highest_avg_charge,
            least_efficient_vehicle: vehicles.lowest_avg_charge,
        })
    }
}

impl Default for InsightGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightSummary {
    pub fn has_priority(&self, priority: Priority) -> bool {
        self.recommendations.iter().any(|r| r.priority == priority)
    }

    pub fn summary(&self) -> String {
        let spread = self
            .battery_std
            .map_or_else(String::new, |std| format!(" (±{:.1}%)", std));

        let mut summary = format!(
            "Key Findings:\n\
            - Fleet consists of {} unique vehicles\n\
            - Total {} data points collected\n\
            - Average battery charge across fleet: {:.1}%{}\n\
            - {} records ({:.1}%) show low battery (<{}%)\n\
            - Peak activity occurs at {}:00\n\n\
            Recommendations:\n",
            self.unique_vehicles,
            self.total_records,
            self.avg_battery,
            spread,
            self.low_battery_records,
            self.low_battery_percentage,
            self.low_battery_threshold,
            self.peak_hour,
        );

        for priority in [Priority::High, Priority::Medium] {
            let items: Vec<&Recommendation> = self
                .recommendations
                .iter()
                .filter(|r| r.priority == priority)
                .collect();
            if items.is_empty() {
                continue;
            }
            summary.push_str(&format!("{}:\n", priority));
            for item in items {
                summary.push_str(&format!("- {}\n", item.message));
            }
        }

        summary.push_str("Operational Insights:\n");
        for insight in &self.operational_insights {
            summary.push_str(&format!("- {}\n", insight));
        }

        summary.push_str(&format!(
            "\nFleet Performance:\n\
            - Most efficient vehicle (highest avg battery): {} ({:.1}%)\n\
            - Least efficient vehicle (lowest avg battery): {} ({:.1}%)",
            self.most_efficient_vehicle.vin,
            self.most_efficient_vehicle.value,
            self.least_efficient_vehicle.vin,
            self.least_efficient_vehicle.value,
        ));
        summary
    }
}
