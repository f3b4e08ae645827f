//! Guessing what kind of activity produced a track

use super::{Track, TrackSegment};
use crate::stats::{Median, Property, Statistic};
use std::fmt;

/// Below this a segment counts as standing still, m/s
const STOPPED_SPEED: f64 = 0.3;

/// Upper median moving speed per activity, m/s
const WALKING_MAX: f64 = 2.2;
const RUNNING_MAX: f64 = 4.5;
const CYCLING_MAX: f64 = 12.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActivityType {
    Walking,
    Running,
    Cycling,
    Driving,
    Unknown,
}

impl ActivityType {
    /// Classify by median moving speed in m/s
    pub fn from_speed(median_speed: f64) -> Self {
        match median_speed {
            s if !s.is_finite() || s <= 0.0 => ActivityType::Unknown,
            s if s < WALKING_MAX => ActivityType::Walking,
            s if s < RUNNING_MAX => ActivityType::Running,
            s if s < CYCLING_MAX => ActivityType::Cycling,
            _ => ActivityType::Driving,
        }
    }

    /// Classify a track from the median speed of its moving segments
    ///
    /// Tracks without timestamps are `Unknown`.
    pub fn of_track(track: &Track) -> Self {
        let mut median = Median::new(Property::Segment(moving_speed));
        median.of(&track.line);
        median
            .median()
            .map_or(ActivityType::Unknown, |m| Self::from_speed(m.value))
    }
}

fn moving_speed(segment: &TrackSegment) -> f64 {
    segment
        .speed
        .filter(|&s| s >= STOPPED_SPEED)
        .unwrap_or(f64::NAN)
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActivityType::Walking => "walking",
            ActivityType::Running => "running",
            ActivityType::Cycling => "cycling",
            ActivityType::Driving => "driving",
            ActivityType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}
