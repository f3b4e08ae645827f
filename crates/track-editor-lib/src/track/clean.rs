//! The full cleanup pipeline and its configuration

use super::{Track, cruft, smooth, split};
use crate::{Result, TrackError};
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Limits used by the cleanup passes
///
/// Distances in meters, durations in seconds, speeds and rates per second.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CleanConfig {
    /// A jump longer than this separates cruft from the activity
    pub cruft_trigger_distance: f64,
    /// A jump longer than this splits the track
    pub split_gap_distance: f64,
    /// A pause longer than this splits the track
    pub split_gap_duration: f64,
    pub max_speed: f64,
    /// Degrees per second
    pub max_angular_speed: f64,
    pub max_ascent_rate: f64,
    pub max_descent_rate: f64,
    /// Upper bound on smoothing passes per smoother
    pub max_passes: usize,
    /// Parts with fewer points are dropped after splitting
    pub min_track_points: usize,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            cruft_trigger_distance: 500.0,
            split_gap_distance: 250.0,
            split_gap_duration: 600.0,
            max_speed: 70.0,
            max_angular_speed: 120.0,
            max_ascent_rate: 10.0,
            max_descent_rate: 15.0,
            max_passes: 5,
            min_track_points: 2,
        }
    }
}

impl CleanConfig {
    /// Reject negative or non-finite limits
    pub fn validate(&self) -> Result<()> {
        let limits = [
            ("cruft_trigger_distance", self.cruft_trigger_distance),
            ("split_gap_distance", self.split_gap_distance),
            ("split_gap_duration", self.split_gap_duration),
            ("max_speed", self.max_speed),
            ("max_angular_speed", self.max_angular_speed),
            ("max_ascent_rate", self.max_ascent_rate),
            ("max_descent_rate", self.max_descent_rate),
        ];
        for (name, value) in limits {
            if !value.is_finite() || value < 0.0 {
                return Err(TrackError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// What one cleanup run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CleanSummary {
    pub input_points: usize,
    pub cruft_removed: usize,
    pub spikes_removed: usize,
    pub parts: usize,
    pub dropped_parts: usize,
}

/// Trim cruft, remove spikes, then split on gaps
///
/// Parts shorter than `min_track_points` are dropped.
pub fn clean_track(mut track: Track, config: &CleanConfig) -> Result<(Vec<Track>, CleanSummary)> {
    #[cfg(feature = "profiling")]
    profiling::scope!("track::clean_track");
    config.validate()?;
    if track.is_empty() {
        return Err(TrackError::EmptyTrack);
    }

    let mut summary = CleanSummary {
        input_points: track.len(),
        ..Default::default()
    };
    summary.cruft_removed = cruft::trim_cruft(&mut track, config.cruft_trigger_distance);
    summary.spikes_removed = smooth::smooth_speed(&mut track, config.max_speed, config.max_passes)
        + smooth::smooth_angular_speed(&mut track, config.max_angular_speed, config.max_passes)
        + smooth::smooth_elevation_rate(
            &mut track,
            config.max_ascent_rate,
            config.max_descent_rate,
            config.max_passes,
        );

    let name = track.name.clone();
    let parts = split::split_on_gaps(track, config.split_gap_distance, config.split_gap_duration);
    let before = parts.len();
    let parts: Vec<Track> = parts
        .into_iter()
        .filter(|part| part.len() >= config.min_track_points.max(1))
        .collect();
    summary.parts = parts.len();
    summary.dropped_parts = before - parts.len();

    tracing::info!(
        points = summary.input_points,
        cruft = summary.cruft_removed,
        spikes = summary.spikes_removed,
        parts = summary.parts,
        "cleaned {}",
        name.as_deref().unwrap_or("unnamed track")
    );
    Ok((parts, summary))
}

/// [`clean_track`] over many tracks in parallel, in input order
pub fn clean_tracks(
    tracks: Vec<Track>,
    config: &CleanConfig,
) -> Result<Vec<(Vec<Track>, CleanSummary)>> {
    #[cfg(feature = "profiling")]
    profiling::scope!("track::clean_tracks");
    config.validate()?;
    tracks
        .into_par_iter()
        .map(|track| clean_track(track, config))
        .collect()
}
