use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse hour-of-day bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimePeriod {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl TimePeriod {
    pub const ALL: [TimePeriod; 4] = [
        TimePeriod::Night,
        TimePeriod::Morning,
        TimePeriod::Afternoon,
        TimePeriod::Evening,
    ];

    /// Bucket an hour using `[0,6) [6,12) [12,18) [18,24]`.
    ///
    /// Hours outside `[0, 24]` have no period.
    pub fn from_hour(hour: i32) -> Option<Self> {
        match hour {
            0..=5 => Some(Self::Night),
            6..=11 => Some(Self::Morning),
            12..=17 => Some(Self::Afternoon),
            18..=24 => Some(Self::Evening),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Night => "Night",
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed 20-point battery charge bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BatteryRange {
    Critical,
    Low,
    Medium,
    Good,
    Full,
}

impl BatteryRange {
    pub const ALL: [BatteryRange; 5] = [
        BatteryRange::Critical,
        BatteryRange::Low,
        BatteryRange::Medium,
        BatteryRange::Good,
        BatteryRange::Full,
    ];

    /// Bucket a charge using `[0,20] (20,40] (40,60] (60,80] (80,100]`.
    ///
    /// The lowest bin is closed on both ends; charges outside `[0, 100]` have no range.
    pub fn from_charge(charge: f64) -> Option<Self> {
        if charge.is_nan() || !(0.0..=100.0).contains(&charge) {
            return None;
        }
        let range = if charge <= 20.0 {
            Self::Critical
        } else if charge <= 40.0 {
            Self::Low
        } else if charge <= 60.0 {
            Self::Medium
        } else if charge <= 80.0 {
            Self::Good
        } else {
            Self::Full
        };
        Some(range)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Critical => "Critical (0-20%)",
            Self::Low => "Low (20-40%)",
            Self::Medium => "Medium (40-60%)",
            Self::Good => "Good (60-80%)",
            Self::Full => "Full (80-100%)",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for BatteryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Latitude band labels, south to north
pub const LATITUDE_BANDS: [&str; 5] = ["South", "South-Mid", "Central", "North-Mid", "North"];

/// Longitude band labels, west to east
pub const LONGITUDE_BANDS: [&str; 5] = ["West", "West-Mid", "Central", "East-Mid", "East"];
