//! Unit systems for human-readable output

use std::fmt;

const METERS_PER_MILE: f64 = 1609.344;
const METERS_PER_FOOT: f64 = 0.3048;
const MPS_TO_KMH: f64 = 3.6;
const MPS_TO_MPH: f64 = 3600.0 / METERS_PER_MILE;

/// Unit system used when formatting reports
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Long distance (km or mi) from meters
    pub fn distance(self, meters: f64) -> f64 {
        match self {
            Units::Metric => meters / 1000.0,
            Units::Imperial => meters / METERS_PER_MILE,
        }
    }

    pub fn distance_unit(self) -> &'static str {
        match self {
            Units::Metric => "km",
            Units::Imperial => "mi",
        }
    }

    /// Short length (m or ft) from meters
    pub fn length(self, meters: f64) -> f64 {
        match self {
            Units::Metric => meters,
            Units::Imperial => meters / METERS_PER_FOOT,
        }
    }

    pub fn length_unit(self) -> &'static str {
        match self {
            Units::Metric => "m",
            Units::Imperial => "ft",
        }
    }

    /// Speed (km/h or mph) from meters per second
    pub fn speed(self, mps: f64) -> f64 {
        match self {
            Units::Metric => mps * MPS_TO_KMH,
            Units::Imperial => mps * MPS_TO_MPH,
        }
    }

    pub fn speed_unit(self) -> &'static str {
        match self {
            Units::Metric => "km/h",
            Units::Imperial => "mph",
        }
    }
}

/// `h:mm:ss` rendering of a duration in seconds
pub(crate) struct Clock(pub f64);

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.0.max(0.0).round() as u64;
        write!(f, "{}:{:02}:{:02}", total / 3600, total / 60 % 60, total % 60)
    }
}
